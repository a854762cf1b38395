//! Decoding of the `CANDIDATELIST` buffer returned by `ImmGetCandidateListW`.

use ime_bridge_core::ime::{CandidateList, ImeString};

const HEADER_LEN: usize = 24;

fn read_u32(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_wide_str(buf: &[u8], offset: usize) -> Option<ImeString> {
    let bytes = buf.get(offset..)?;
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    Some(ImeString::from_utf16_lossy(&units))
}

/// Parse a raw candidate list.
///
/// The buffer starts with the `CANDIDATELIST` header: size, style, count, selection, page start
/// and page size, followed by `count` byte offsets of NUL-terminated UTF-16 strings, relative to
/// the start of the buffer. Returns `None` if the buffer is truncated or an offset points
/// outside of it.
pub fn parse_candidate_list(buf: &[u8]) -> Option<CandidateList> {
    if buf.len() < HEADER_LEN {
        return None;
    }

    let count = read_u32(buf, 8)? as usize;
    let selection = read_u32(buf, 12)? as usize;
    let page_start = read_u32(buf, 16)? as usize;
    let page_size = read_u32(buf, 20)? as usize;

    let mut candidates = Vec::with_capacity(count.min(buf.len() / 4));
    for index in 0..count {
        let offset = read_u32(buf, HEADER_LEN + index * 4)? as usize;
        candidates.push(read_wide_str(buf, offset)?);
    }

    Some(CandidateList { candidates, page_start, page_size, selection })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a buffer laid out like the one `ImmGetCandidateListW` fills.
    pub(crate) fn candidate_buffer(
        candidates: &[&str],
        selection: u32,
        page_start: u32,
        page_size: u32,
    ) -> Vec<u8> {
        let strings_start = HEADER_LEN + candidates.len() * 4;
        let mut strings = Vec::new();
        let mut offsets = Vec::new();
        for candidate in candidates {
            offsets.push((strings_start + strings.len()) as u32);
            for unit in candidate.encode_utf16().chain([0]) {
                strings.extend_from_slice(&unit.to_ne_bytes());
            }
        }

        let size = (strings_start + strings.len()) as u32;
        let mut buf = Vec::new();
        for field in [size, 1, candidates.len() as u32, selection, page_start, page_size] {
            buf.extend_from_slice(&field.to_ne_bytes());
        }
        for offset in offsets {
            buf.extend_from_slice(&offset.to_ne_bytes());
        }
        buf.extend_from_slice(&strings);
        buf
    }

    #[test]
    fn parses_candidates_and_paging() {
        let buf = candidate_buffer(&["日本", "二本", "𠀋"], 1, 0, 9);
        let list = parse_candidate_list(&buf).unwrap();

        assert_eq!(list.candidates, ["日本", "二本", "𠀋"].map(ImeString::from));
        assert_eq!(list.selection, 1);
        assert_eq!(list.page_start, 0);
        assert_eq!(list.page_size, 9);
        assert_eq!(list.selected().unwrap(), "二本");
    }

    #[test]
    fn empty_list() {
        let list = parse_candidate_list(&candidate_buffer(&[], 0, 0, 0)).unwrap();
        assert!(list.candidates.is_empty());
    }

    #[test]
    fn rejects_truncated_buffers() {
        let buf = candidate_buffer(&["候补"], 0, 0, 9);
        assert!(parse_candidate_list(&buf[..HEADER_LEN - 1]).is_none());
        // Offset table cut off.
        assert!(parse_candidate_list(&buf[..HEADER_LEN + 2]).is_none());

        let mut bad_offset = buf.clone();
        bad_offset[HEADER_LEN..HEADER_LEN + 4].copy_from_slice(&9999u32.to_ne_bytes());
        assert!(parse_candidate_list(&bad_offset).is_none());
    }
}
