//! ABOUTME: Fixed-size sliding-window chunking by UTF-8 character, with overlap (spec §4.D)

use docbro_core::chunk::CharSpan;

const PARAGRAPH_SEARCH_WINDOW: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    pub text: String,
    pub char_span: CharSpan,
}

/// Splits `text` by `char`, honoring `chunk_size`/`chunk_overlap`. When a
/// planned split point falls within [`PARAGRAPH_SEARCH_WINDOW`] characters of
/// a `"\n\n"`, the split is pulled back to just after that boundary instead.
#[must_use]
pub fn character_chunk(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<RawChunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut spans = Vec::new();
    let mut start = 0usize;

    while start < len {
        let mut end = (start + chunk_size).min(len);

        if end < len {
            let window_start = end.saturating_sub(PARAGRAPH_SEARCH_WINDOW).max(start);
            if let Some(boundary) = find_paragraph_boundary(&chars[window_start..end]) {
                let candidate = window_start + boundary;
                if candidate > start {
                    end = candidate;
                }
            }
        }

        let slice: String = chars[start..end].iter().collect();
        spans.push(RawChunk { text: slice, char_span: CharSpan { start, end } });

        if end >= len {
            break;
        }

        let next_start = end.saturating_sub(chunk_overlap);
        start = if next_start > start { next_start } else { end };
    }

    spans
}

/// Finds the last `"\n\n"` in `window`, returning the character index just
/// past it (i.e. where the next chunk should begin).
fn find_paragraph_boundary(window: &[char]) -> Option<usize> {
    if window.len() < 2 {
        return None;
    }
    for i in (0..window.len() - 1).rev() {
        if window[i] == '\n' && window[i + 1] == '\n' {
            return Some(i + 2);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_zero_chunks() {
        assert!(character_chunk("", 100, 10).is_empty());
    }

    #[test]
    fn short_document_yields_single_chunk() {
        let chunks = character_chunk("hello world", 100, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].char_span, CharSpan { start: 0, end: 11 });
    }

    #[test]
    fn overlapping_windows_cover_the_whole_document() {
        let text = "a".repeat(250);
        let chunks = character_chunk(&text, 100, 20);
        assert!(chunks.len() >= 3);
        assert_eq!(chunks.last().unwrap().char_span.end, 250);
        for window in chunks.windows(2) {
            assert!(window[1].char_span.start < window[0].char_span.end);
        }
    }

    #[test]
    fn splits_pull_back_to_paragraph_boundary() {
        let text = format!("{}\n\n{}", "a".repeat(45), "b".repeat(60));
        // chunk_size lands mid-second-paragraph, but within 50 chars of the
        // "\n\n" at position 45, so the split should land at 47 instead.
        let chunks = character_chunk(&text, 60, 0);
        assert_eq!(chunks[0].char_span.end, 47);
        assert!(chunks[0].text.ends_with("\n\n"));
    }

    #[test]
    fn respects_utf8_character_boundaries() {
        let text = "héllo wörld ".repeat(10);
        let chunks = character_chunk(&text, 15, 3);
        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
        }
    }
}
