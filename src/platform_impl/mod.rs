//! The adapter type used on the platform being compiled for.

#[cfg(android_game_activity)]
mod android {
    use ime_bridge_android::activity::GameActivityHost;
    use ime_bridge_android::AndroidImeHandler;

    pub type PlatformImeHandler = AndroidImeHandler<GameActivityHost>;
}

#[cfg(windows_platform)]
mod windows {
    use ime_bridge_win32::imm::Win32ImeHost;
    use ime_bridge_win32::Win32ImeHandler;

    pub type PlatformImeHandler = Win32ImeHandler<Win32ImeHost>;
}

#[cfg(ios_platform)]
mod ios {
    #[cfg(ios_backward_field)]
    pub type PlatformImeHandler =
        ime_bridge_uikit::BackwardFieldImeHandler<ime_bridge_uikit::platform::UIKitBackwardField>;
    #[cfg(ios_confirm_bar)]
    pub type PlatformImeHandler =
        ime_bridge_uikit::ConfirmBarImeHandler<ime_bridge_uikit::platform::UIKitConfirmBar>;
}

#[cfg(android_game_activity)]
use self::android as platform;
#[cfg(ios_platform)]
use self::ios as platform;
#[cfg(windows_platform)]
use self::windows as platform;

#[cfg(any(android_game_activity, windows_platform, ios_platform))]
pub use self::platform::*;
