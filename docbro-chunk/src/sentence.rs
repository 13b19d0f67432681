//! ABOUTME: Naive sentence segmentation feeding the semantic chunker

/// Splits `text` on `.`/`!`/`?` followed by whitespace or end-of-text.
/// Intentionally simple (no abbreviation/quote handling) — good enough to
/// feed the semantic chunker's sentence-similarity grouping.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    split_sentences_with_byte_offsets(text).into_iter().map(|(s, _, _)| s).collect()
}

/// Like [`split_sentences`] but also returns each sentence's `[start, end)`
/// byte offset into `text`, post-trim.
#[must_use]
pub fn split_sentences_with_byte_offsets(text: &str) -> Vec<(&str, usize, usize)> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let ch = bytes[i];
        if matches!(ch, b'.' | b'!' | b'?') {
            let next = i + 1;
            if next >= bytes.len() || bytes[next].is_ascii_whitespace() {
                push_trimmed(text, start, next, &mut sentences);
                start = next;
            }
        }
        i += 1;
    }

    push_trimmed(text, start, bytes.len(), &mut sentences);
    sentences
}

fn push_trimmed<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<(&'a str, usize, usize)>) {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let leading = raw.len() - raw.trim_start().len();
    let trimmed_start = start + leading;
    let trimmed_end = trimmed_start + trimmed.len();
    out.push((trimmed, trimmed_start, trimmed_end));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_sentences() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn single_sentence_document_yields_one_sentence() {
        assert_eq!(split_sentences("Just one sentence."), vec!["Just one sentence."]);
    }

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = split_sentences("One. Two! Three?");
        assert_eq!(sentences, vec!["One.", "Two!", "Three?"]);
    }

    #[test]
    fn trailing_fragment_without_terminator_is_kept() {
        let sentences = split_sentences("Complete sentence. trailing fragment");
        assert_eq!(sentences, vec!["Complete sentence.", "trailing fragment"]);
    }

    #[test]
    fn offsets_round_trip_into_the_original_text() {
        let text = "One. Two!";
        let offsets = split_sentences_with_byte_offsets(text);
        for (sentence, start, end) in offsets {
            assert_eq!(&text[start..end], sentence);
        }
    }
}
