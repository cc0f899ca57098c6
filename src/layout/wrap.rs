use crate::units::Pt;

/// Greedily wrap a block of text into lines no wider than `max_width`.
///
/// The text is split on newlines into paragraphs first; a blank paragraph
/// maps to exactly one empty output line, so intentional paragraph spacing
/// survives wrapping. Within a paragraph, words are accumulated onto a
/// candidate line until appending one more word would exceed `max_width`
/// (as reported by `measure`), at which point the candidate is flushed and
/// the word starts the next line.
///
/// A single word wider than `max_width` is never split: it is emitted on a
/// line of its own, overflowing the column.
///
/// `measure` maps a candidate line to its rendered width; it must be
/// consistent with whatever units `max_width` is expressed in.
pub fn wrap_text<F>(text: &str, max_width: Pt, measure: F) -> Vec<String>
where
    F: Fn(&str) -> Pt,
{
    let mut lines: Vec<String> = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if measure(&candidate) > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            } else {
                current = candidate;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod test {
    use super::*;

    // a character-counting ruler keeps the expected line breaks obvious
    fn by_chars(text: &str) -> Pt {
        Pt(text.chars().count() as f32)
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = wrap_text("the quick brown fox jumps", Pt(10.0), by_chars);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn every_line_fits_except_single_overlong_words() {
        let text = "a few words and one extraordinarily-long-word more text here";
        let max = Pt(12.0);
        for line in wrap_text(text, max, by_chars) {
            let fits = by_chars(&line) <= max;
            let is_lone_overlong_word = !line.contains(' ') && by_chars(&line) > max;
            assert!(
                fits || is_lone_overlong_word,
                "line {line:?} exceeds the column and is not a lone overlong word"
            );
        }
    }

    #[test]
    fn overlong_word_is_emitted_alone() {
        let lines = wrap_text("tiny extraordinarily-long-word end", Pt(8.0), by_chars);
        assert_eq!(lines, vec!["tiny", "extraordinarily-long-word", "end"]);
    }

    #[test]
    fn blank_lines_are_preserved_one_to_one() {
        let lines = wrap_text("first paragraph\n\nsecond paragraph", Pt(30.0), by_chars);
        assert_eq!(lines, vec!["first paragraph", "", "second paragraph"]);
    }

    #[test]
    fn whitespace_only_paragraph_counts_as_blank() {
        let lines = wrap_text("one\n   \ntwo", Pt(30.0), by_chars);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn no_spurious_trailing_line_at_exact_boundary() {
        // paragraph ends exactly when the candidate fills the column
        let lines = wrap_text("abcd efgh", Pt(4.0), by_chars);
        assert_eq!(lines, vec!["abcd", "efgh"]);
    }

    #[test]
    fn rewrapping_own_output_is_idempotent() {
        let text = "pack my box with five dozen liquor jugs\n\nthe quick brown fox jumps over the lazy dog";
        let first = wrap_text(text, Pt(14.0), by_chars);
        let second = wrap_text(&first.join("\n"), Pt(14.0), by_chars);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_produces_a_single_blank_line() {
        assert_eq!(wrap_text("", Pt(10.0), by_chars), vec![String::new()]);
    }
}
