//! Binding of the Windows adapter to a window through the Input Method Manager.

use std::cell::Cell;
use std::io;
use std::ptr::null_mut;

use ime_bridge_core::attributes::ImeAttributes;
use ime_bridge_core::error::{ImeError, NotSupportedError};
use ime_bridge_core::geometry::ImeRect;
use ime_bridge_core::handler::TextInputHandler;
use ime_bridge_core::ime::{CandidateList, ImeString};
use ime_bridge_core::keyboard::KeyCode;
use ime_bridge_core::os_error;
use rwh_06::{HasWindowHandle, RawWindowHandle};
use tracing::{trace, warn};
use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows_sys::Win32::Globalization::HIMC;
use windows_sys::Win32::UI::Input::Ime::{
    ImmAssociateContextEx, ImmGetCandidateListW, ImmGetCompositionStringW, ImmGetContext,
    ImmReleaseContext, ImmSetCandidateWindow, CANDIDATEFORM, CFS_EXCLUDE, GCS_COMPSTR,
    GCS_CURSORPOS, GCS_RESULTSTR, IACE_CHILDREN, IACE_DEFAULT, IMN_CHANGECANDIDATE,
    IMN_CLOSECANDIDATE, IMN_OPENCANDIDATE, ISC_SHOWUIALLCANDIDATEWINDOW,
    ISC_SHOWUICANDIDATEWINDOW, ISC_SHOWUICOMPOSITIONWINDOW,
};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyboardLayout, VkKeyScanExW, VIRTUAL_KEY,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    DefWindowProcW, GetSystemMetrics, SM_IMMENABLED, WM_CHAR, WM_IME_COMPOSITION,
    WM_IME_ENDCOMPOSITION, WM_IME_NOTIFY, WM_IME_SETCONTEXT, WM_IME_STARTCOMPOSITION,
};

use crate::candidates::parse_candidate_list;
use crate::handler::{ImeContextHost, Win32ImeHandler};
use crate::keymap::vkey_to_key_code;

/// The input context of a window, released on drop.
struct ImeContext {
    hwnd: HWND,
    himc: HIMC,
}

impl ImeContext {
    unsafe fn current(hwnd: HWND) -> Option<Self> {
        let himc = unsafe { ImmGetContext(hwnd) };
        (!himc.is_null()).then_some(ImeContext { hwnd, himc })
    }

    /// The composition string and the cursor position in it, in chars.
    unsafe fn composition(&self) -> Option<(ImeString, usize)> {
        let text = unsafe { self.composition_string(GCS_COMPSTR) }?;
        let cursor =
            unsafe { ImmGetCompositionStringW(self.himc, GCS_CURSORPOS, null_mut(), 0) };
        let cursor = if cursor < 0 {
            text.char_count()
        } else {
            text.utf16_to_char_offset(cursor as usize)
        };
        Some((text, cursor))
    }

    unsafe fn result(&self) -> Option<ImeString> {
        unsafe { self.composition_string(GCS_RESULTSTR) }
    }

    unsafe fn composition_string(&self, gcs_mode: u32) -> Option<ImeString> {
        let size = match unsafe { ImmGetCompositionStringW(self.himc, gcs_mode, null_mut(), 0) } {
            0 => return Some(ImeString::new()),
            size if size < 0 => return None,
            size => size as u32,
        };

        let mut buf = vec![0u16; (size as usize).div_ceil(2)];
        let size = unsafe {
            ImmGetCompositionStringW(self.himc, gcs_mode, buf.as_mut_ptr().cast(), size)
        };
        if size < 0 {
            return None;
        }
        buf.truncate(size as usize / 2);
        Some(ImeString::from_utf16_lossy(&buf))
    }

    unsafe fn candidate_list(&self) -> Option<CandidateList> {
        let size = unsafe { ImmGetCandidateListW(self.himc, 0, null_mut(), 0) };
        if size == 0 {
            return None;
        }

        // `u32` storage keeps the buffer aligned for the `CANDIDATELIST` header.
        let mut buf = vec![0u32; (size as usize).div_ceil(4)];
        let size = unsafe { ImmGetCandidateListW(self.himc, 0, buf.as_mut_ptr().cast(), size) };
        if size == 0 {
            return None;
        }
        let bytes: Vec<u8> = buf.iter().flat_map(|word| word.to_ne_bytes()).collect();
        parse_candidate_list(&bytes[..size as usize])
    }

    unsafe fn set_candidate_area(&self, rect: ImeRect) -> bool {
        let candidate_form = CANDIDATEFORM {
            dwIndex: 0,
            dwStyle: CFS_EXCLUDE,
            ptCurrentPos: POINT { x: rect.left(), y: rect.top() },
            rcArea: RECT {
                left: rect.left(),
                top: rect.top(),
                right: rect.right(),
                bottom: rect.bottom(),
            },
        };
        unsafe { ImmSetCandidateWindow(self.himc, &candidate_form) != 0 }
    }
}

impl Drop for ImeContext {
    fn drop(&mut self) {
        unsafe { ImmReleaseContext(self.hwnd, self.himc) };
    }
}

fn system_has_ime() -> bool {
    unsafe { GetSystemMetrics(SM_IMMENABLED) != 0 }
}

/// [`ImeContextHost`] for a Win32 window.
#[derive(Debug)]
pub struct Win32ImeHost {
    hwnd: HWND,
    released: Cell<bool>,
}

impl Win32ImeHost {
    /// # Safety
    ///
    /// `hwnd` must be a valid window handle, owned by the calling thread, for as long as the
    /// host is used.
    pub unsafe fn from_hwnd(hwnd: HWND) -> Self {
        Self { hwnd, released: Cell::new(false) }
    }

    /// Bind to the window behind a raw window handle.
    ///
    /// The window must outlive the host and be used from the thread owning it.
    pub fn from_window(window: &impl HasWindowHandle) -> Result<Self, ImeError> {
        let handle = window.window_handle().map_err(|err| os_error!(err))?;
        match handle.as_raw() {
            RawWindowHandle::Win32(handle) => {
                Ok(unsafe { Self::from_hwnd(handle.hwnd.get() as HWND) })
            },
            _ => Err(NotSupportedError::new().into()),
        }
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }
}

impl ImeContextHost for Win32ImeHost {
    fn set_ime_enabled(&self, enabled: bool) -> Result<(), ImeError> {
        if self.released.get() {
            return Err(ImeError::Detached);
        }
        if !system_has_ime() {
            trace!("no input method installed");
            return Ok(());
        }

        let flags = if enabled { IACE_DEFAULT } else { IACE_CHILDREN };
        if unsafe { ImmAssociateContextEx(self.hwnd, null_mut(), flags) } == 0 {
            return Err(os_error!(io::Error::last_os_error()).into());
        }
        Ok(())
    }

    fn set_candidate_area(&self, rect: ImeRect) -> Result<(), ImeError> {
        if self.released.get() || !system_has_ime() {
            return Ok(());
        }
        let Some(context) = (unsafe { ImeContext::current(self.hwnd) }) else {
            return Err(os_error!("the window has no input context").into());
        };
        if !unsafe { context.set_candidate_area(rect) } {
            return Err(os_error!(io::Error::last_os_error()).into());
        }
        Ok(())
    }

    fn key_for(&self, c: char) -> Option<KeyCode> {
        let mut units = [0u16; 2];
        let [unit] = c.encode_utf16(&mut units) else {
            return None;
        };
        let scan = unsafe { VkKeyScanExW(*unit, GetKeyboardLayout(0)) };
        // -1 when no key produces the character.
        if scan == -1 {
            return None;
        }
        vkey_to_key_code((scan & 0xff) as VIRTUAL_KEY)
    }

    fn release(&self) {
        self.released.set(true);
    }
}

/// Create the adapter for a window.
pub fn new_handler(
    window: &impl HasWindowHandle,
    attributes: ImeAttributes,
) -> Result<Win32ImeHandler<Win32ImeHost>, ImeError> {
    Ok(Win32ImeHandler::new(Win32ImeHost::from_window(window)?, attributes))
}

/// Feed a window message to the adapter.
///
/// Returns `Some` with the result of the message when the adapter consumed it. Otherwise the
/// message must go on to `DefWindowProcW`.
///
/// # Safety
///
/// `hwnd` must be the window the adapter's host is bound to, and the message must come from
/// its window procedure.
pub unsafe fn process_message<C: ImeContextHost>(
    handler: &Win32ImeHandler<C>,
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> Option<LRESULT> {
    match msg {
        WM_IME_SETCONTEXT if !handler.show_os_ime_window() => {
            let hidden =
                ISC_SHOWUICOMPOSITIONWINDOW | ISC_SHOWUICANDIDATEWINDOW | ISC_SHOWUIALLCANDIDATEWINDOW;
            let lparam = lparam & !(hidden as LPARAM);
            Some(unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) })
        },

        WM_IME_STARTCOMPOSITION if handler.is_text_input_active() => {
            trace!("composition started");
            (!handler.show_os_ime_window()).then_some(0)
        },

        WM_IME_COMPOSITION if handler.is_text_input_active() => {
            let context = unsafe { ImeContext::current(hwnd) }?;
            let flags = lparam as u32;

            if lparam == 0 {
                handler.on_composition_end();
            }

            // Some IMEs set both flags: deliver the result before the next composition.
            if flags & GCS_RESULTSTR != 0 {
                match unsafe { context.result() } {
                    Some(text) => {
                        handler.on_composition_end();
                        handler.on_result(text.as_str());
                    },
                    None => warn!("failed to read the composition result"),
                }
            }

            if flags & GCS_COMPSTR != 0 {
                if let Some((text, cursor)) = unsafe { context.composition() } {
                    let candidates = unsafe { context.candidate_list() };
                    handler.on_composition(text, cursor, candidates);
                }
            }

            // The result was reported above, so the IME must not turn it into `WM_CHAR`s.
            Some(0)
        },

        WM_IME_ENDCOMPOSITION => {
            handler.on_composition_end();
            None
        },

        WM_IME_NOTIFY if handler.is_text_input_active() => {
            let command = wparam as u32;
            if matches!(command, IMN_OPENCANDIDATE | IMN_CHANGECANDIDATE | IMN_CLOSECANDIDATE) {
                let context = unsafe { ImeContext::current(hwnd) }?;
                let composition = unsafe { context.composition() };
                if let Some((text, cursor)) = composition.filter(|(text, _)| !text.is_empty()) {
                    let candidates = match command {
                        IMN_CLOSECANDIDATE => None,
                        _ => unsafe { context.candidate_list() },
                    };
                    handler.on_composition(text, cursor, candidates);
                }
            }
            None
        },

        WM_CHAR if handler.is_text_input_active() => {
            handler.on_char(wparam as u16);
            Some(0)
        },

        _ => None,
    }
}
