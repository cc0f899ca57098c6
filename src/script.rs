//! Extraction of the typeset portion of a page's scenario file.
//!
//! Scenario files are small markdown-ish documents split into sections by
//! `##`-prefixed header lines. Only one named section is typeset per page;
//! everything else (prompts, notes, right-page dialogue) is ignored.

use std::path::Path;

/// Shown in the text column when a page has no scenario file at all
pub const MISSING_FILE: &str = "Текст не найден.";
/// Shown when the scenario file exists but lacks the wanted section
pub const MISSING_SECTION: &str = "Секция текста не найдена.";

/// The `##` prefix that starts a section header line
const HEADER_PREFIX: &str = "##";

/// Find the first line exactly matching `header` and return everything up
/// to the next header line (or end of document), trimmed. Returns [None]
/// if the header never occurs.
pub fn extract_section(content: &str, header: &str) -> Option<String> {
    let mut lines = content.lines();

    loop {
        match lines.next() {
            Some(line) if line.trim_end() == header => break,
            Some(_) => continue,
            None => return None,
        }
    }

    let mut body: Vec<&str> = Vec::new();
    for line in lines {
        if line.starts_with(HEADER_PREFIX) {
            break;
        }
        body.push(line);
    }

    Some(body.join("\n").trim().to_string())
}

/// Read a scenario file and extract the named section, degrading to the
/// sentinel strings when the file or the section is missing so a page is
/// never blocked on its text.
pub fn read_section(path: &Path, header: &str) -> std::io::Result<String> {
    if !path.exists() {
        return Ok(MISSING_FILE.to_string());
    }

    let content = std::fs::read_to_string(path)?;
    Ok(extract_section(&content, header).unwrap_or_else(|| MISSING_SECTION.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    const HEADER: &str = "## Текст (Левая страница)";

    #[test]
    fn extracts_the_named_section() {
        let content = "## Текст (Левая страница)\nHello\n## Next";
        assert_eq!(extract_section(content, HEADER), Some("Hello".to_string()));
    }

    #[test]
    fn section_runs_to_end_of_document_without_next_header() {
        let content = "## Описание\nnope\n## Текст (Левая страница)\nline one\n\nline two\n";
        assert_eq!(
            extract_section(content, HEADER),
            Some("line one\n\nline two".to_string())
        );
    }

    #[test]
    fn missing_header_yields_none() {
        assert_eq!(extract_section("## Что-то другое\ntext", HEADER), None);
    }

    #[test]
    fn first_match_wins() {
        let content = "## Текст (Левая страница)\nfirst\n## Текст (Левая страница)\nsecond";
        assert_eq!(extract_section(content, HEADER), Some("first".to_string()));
    }

    #[test]
    fn header_must_be_its_own_line() {
        let content = "prose mentioning ## Текст (Левая страница) inline\nmore";
        assert_eq!(extract_section(content, HEADER), None);
    }

    #[test]
    fn missing_file_degrades_to_sentinel() {
        let text = read_section(Path::new("/nonexistent/сценарий.md"), HEADER)
            .expect("missing file is not an error");
        assert_eq!(text, MISSING_FILE);
    }

    #[test]
    fn missing_section_degrades_to_sentinel() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let path = dir.path().join("сценарий.md");
        std::fs::write(&path, "## Промпт\nnot the typeset section\n").expect("can write scenario");

        let text = read_section(&path, HEADER).expect("readable file is not an error");
        assert_eq!(text, MISSING_SECTION);
    }

    #[test]
    fn empty_section_extracts_as_empty() {
        let content = "## Текст (Левая страница)\n\n## Next";
        assert_eq!(extract_section(content, HEADER), Some(String::new()));
    }
}
