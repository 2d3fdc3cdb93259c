// src/extractors/section.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// A table region opens with a line containing a long run of dashes.
static DELIMITER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-{20,}").expect("Failed to compile DELIMITER_RE")
});

/// Sentinel strings marking the end of a listing or page furniture inside a table region.
pub const TERMINATOR_PHRASES: &[&str] = &[
    "FIN DE LA LISTE",
    "**************************",
    "-----------------------",
];

// --- State Machine ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Searching,
    InTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    EnterTable,
    Emit,
    Skip,
}

impl LineAction {
    /// Fixed-width tag used in extraction traces.
    pub fn tag(self) -> &'static str {
        match self {
            LineAction::EnterTable => "[enter]",
            LineAction::Emit => "[emit ]",
            LineAction::Skip => "[skip ]",
        }
    }
}

/// Pure transition over one line of page text.
///
/// Once `InTable` is reached it is never left on the same page: terminator
/// phrases and blank lines are skipped but capture resumes on the next line.
pub fn transition(state: ScanState, line: &str, terminators: &[String]) -> (ScanState, LineAction) {
    match state {
        ScanState::Searching if DELIMITER_RE.is_match(line) => (ScanState::InTable, LineAction::EnterTable),
        ScanState::Searching => (ScanState::Searching, LineAction::Skip),
        ScanState::InTable => {
            if line.trim().is_empty() || terminators.iter().any(|t| line.contains(t.as_str())) {
                (ScanState::InTable, LineAction::Skip)
            } else {
                (ScanState::InTable, LineAction::Emit)
            }
        }
    }
}

// --- Page Text Capability ---
/// Anything that can hand out the raw text of its pages, in order.
pub trait PageTextSource {
    fn page_count(&self) -> usize;
    fn page_text(&mut self, index: usize) -> Result<String, ExtractError>;
}

// --- Data Structures ---
#[derive(Debug, Clone, PartialEq)]
pub struct TracedLine {
    pub action: LineAction,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageTrace {
    pub page: usize, // 1-based
    pub lines: Vec<TracedLine>,
    pub error: Option<String>,
}

impl PageTrace {
    pub fn captured(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|l| l.action == LineAction::Emit)
            .map(|l| l.text.as_str())
    }
}

// --- Main Extractor Structure ---
pub struct SectionExtractor {
    terminators: Vec<String>,
}

impl SectionExtractor {
    pub fn new() -> Self {
        Self {
            terminators: TERMINATOR_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Runs the state machine over a single page, starting from `Searching`.
    pub fn trace_page(&self, page: usize, text: &str) -> PageTrace {
        let mut state = ScanState::Searching;
        let mut lines = Vec::new();

        for line in text.lines() {
            let (next, action) = transition(state, line, &self.terminators);
            tracing::trace!("page {} {} {:?}", page, action.tag(), line);
            state = next;
            lines.push(TracedLine { action, text: line.to_string() });
        }

        PageTrace { page, lines, error: None }
    }

    /// Traces every page of a document. Unreadable pages produce an empty trace carrying the error.
    pub fn trace<S: PageTextSource>(&self, source: &mut S, label: &str) -> Vec<PageTrace> {
        let mut pages = Vec::with_capacity(source.page_count());

        for index in 0..source.page_count() {
            match source.page_text(index) {
                Ok(text) => pages.push(self.trace_page(index + 1, &text)),
                Err(e) => {
                    tracing::warn!("Error reading page {} of {}: {}", index + 1, label, e);
                    pages.push(PageTrace { page: index + 1, lines: Vec::new(), error: Some(e.to_string()) });
                }
            }
        }

        pages
    }

    /// Captured table lines of a whole document, in page order.
    pub fn extract<S: PageTextSource>(&self, source: &mut S, label: &str) -> Vec<String> {
        collect_captured(&self.trace(source, label))
    }
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Flattens page traces into the emitted lines.
pub fn collect_captured(pages: &[PageTrace]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| p.captured().map(str::to_string))
        .collect()
}

// --- Tests ---
#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const DELIMITER: &str = "--------------------";

    /// In-memory page source; `None` pages fail to read.
    pub(crate) struct FakePages(pub Vec<Option<String>>);

    impl FakePages {
        pub(crate) fn of(pages: &[&str]) -> Self {
            FakePages(pages.iter().map(|p| Some(p.to_string())).collect())
        }
    }

    impl PageTextSource for FakePages {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_text(&mut self, index: usize) -> Result<String, ExtractError> {
            self.0[index].clone().ok_or(ExtractError::PageUnreadable {
                page: index + 1,
                reason: "damaged content stream".to_string(),
            })
        }
    }

    fn terminators() -> Vec<String> {
        TERMINATOR_PHRASES.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_transition_table() {
        let t = terminators();
        assert_eq!(transition(ScanState::Searching, "header text", &t), (ScanState::Searching, LineAction::Skip));
        assert_eq!(transition(ScanState::Searching, DELIMITER, &t), (ScanState::InTable, LineAction::EnterTable));
        assert_eq!(transition(ScanState::Searching, "19 dashes -------------------", &t), (ScanState::Searching, LineAction::Skip));
        assert_eq!(transition(ScanState::InTable, "1  A", &t), (ScanState::InTable, LineAction::Emit));
        assert_eq!(transition(ScanState::InTable, "   \t ", &t), (ScanState::InTable, LineAction::Skip));
        assert_eq!(transition(ScanState::InTable, "*** FIN DE LA LISTE ***", &t), (ScanState::InTable, LineAction::Skip));
    }

    #[test]
    fn test_terminator_does_not_end_table() {
        let extractor = SectionExtractor::new();
        let text = [DELIMITER, "A  1", "FIN DE LA LISTE", "", "B  2"].join("\n");
        let trace = extractor.trace_page(1, &text);
        let captured: Vec<&str> = trace.captured().collect();
        assert_eq!(captured, vec!["A  1", "B  2"]);
    }

    #[test]
    fn test_lines_before_delimiter_are_ignored() {
        let extractor = SectionExtractor::new();
        let text = "BANK STATEMENT\nAccount 0001\n----------------------------------------\n100   X   1,00\n";
        let trace = extractor.trace_page(1, text);
        assert_eq!(trace.captured().collect::<Vec<_>>(), vec!["100   X   1,00"]);
        assert_eq!(trace.lines[2].action, LineAction::EnterTable);
    }

    #[test]
    fn test_state_resets_on_every_page() {
        let extractor = SectionExtractor::new();
        let mut pages = FakePages::of(&[
            format!("{}\n1   A\n2   B", DELIMITER).as_str(),
            "3   C\n4   D",
            format!("title\n{}\n5   E", DELIMITER).as_str(),
        ]);
        let lines = extractor.extract(&mut pages, "statement.pdf");
        assert_eq!(lines, vec!["1   A", "2   B", "5   E"]);
    }

    #[test]
    fn test_unreadable_page_contributes_nothing() {
        let extractor = SectionExtractor::new();
        let mut pages = FakePages(vec![
            Some(format!("{}\n1   A", DELIMITER)),
            None,
            Some(format!("{}\n2   B", DELIMITER)),
        ]);
        let trace = extractor.trace(&mut pages, "statement.pdf");
        assert_eq!(trace.len(), 3);
        assert!(trace[1].error.is_some());
        assert_eq!(collect_captured(&trace), vec!["1   A", "2   B"]);
    }

    #[test]
    fn test_no_captured_line_contains_terminator() {
        let extractor = SectionExtractor::new();
        let mut pages = FakePages::of(&[
            format!(
                "{d}\n1   A\n**************************\n2   B   FIN DE LA LISTE\n{d}-----\n3   C",
                d = DELIMITER
            )
            .as_str(),
            format!("{}\n-----------------------\n4   D", DELIMITER).as_str(),
        ]);
        let lines = extractor.extract(&mut pages, "statement.pdf");
        assert_eq!(lines, vec!["1   A", "3   C", "4   D"]);
        for line in &lines {
            for phrase in TERMINATOR_PHRASES {
                assert!(!line.contains(phrase), "{:?} leaked terminator {:?}", line, phrase);
            }
        }
    }

    #[test]
    fn test_short_dash_run_inside_table_is_kept() {
        // 20..22 dashes open a table but are not a terminator once inside one.
        let extractor = SectionExtractor::new();
        let text = format!("{d}\n{d}\n1   A", d = DELIMITER);
        let trace = extractor.trace_page(1, &text);
        assert_eq!(trace.captured().collect::<Vec<_>>(), vec![DELIMITER, "1   A"]);
    }
}
