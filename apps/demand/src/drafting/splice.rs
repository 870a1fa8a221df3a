//! Section splicing for markdown letters.
//!
//! Letters are plain strings split by `## ` headings; there is no structural
//! parser. Splicing resolves one of three targets, in this order:
//!
//! 1. `PlaceholderFound`: the placeholder section exists, so its body is replaced.
//! 2. `TerminalFound`: no placeholder, but the terminal section exists, so
//!    new content is inserted right before it.
//! 3. `AppendOnly`: neither exists, so new content goes at the end.
//!
//! Headings are matched as literal substrings, first occurrence wins. A `### `
//! subheading contains `## ` and so bounds the placeholder body too.
//! Splicing is not idempotent: once a placeholder is replaced, a second splice
//! falls through to the terminal or append tier.

/// Section the drafting prompt asks the model to leave for precedent research.
pub const PLACEHOLDER_HEADING: &str = "## Similar Case Verdicts\n";
/// Closing section; augmented content must precede it.
pub const TERMINAL_HEADING: &str = "## ASK";
pub const PRECEDENT_HEADING: &str = "## Comparable Case Precedent";
pub const SETTLEMENT_HEADING: &str = "## Settlement Demand";

const SECTION_MARKER: &str = "## ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceTarget {
    /// Placeholder heading starts at `start`; its old body runs to `body_end`
    /// (the next heading), or to the end of the document when `None`.
    PlaceholderFound {
        start: usize,
        body_end: Option<usize>,
    },
    /// Terminal heading starts at `at`.
    TerminalFound { at: usize },
    AppendOnly,
}

#[derive(Debug, Clone)]
pub struct SectionSplicer {
    placeholder: String,
    terminal: String,
}

impl Default for SectionSplicer {
    fn default() -> Self {
        Self::new(PLACEHOLDER_HEADING, TERMINAL_HEADING)
    }
}

impl SectionSplicer {
    pub fn new(placeholder: &str, terminal: &str) -> Self {
        Self {
            placeholder: placeholder.to_string(),
            terminal: terminal.to_string(),
        }
    }

    pub fn locate(&self, letter: &str) -> SpliceTarget {
        if let Some(start) = find_heading(letter, &self.placeholder) {
            let body_start = start + self.placeholder.len();
            let body_end = find_heading(&letter[body_start..], SECTION_MARKER).map(|i| body_start + i);
            return SpliceTarget::PlaceholderFound { start, body_end };
        }
        if let Some(at) = find_heading(letter, &self.terminal) {
            return SpliceTarget::TerminalFound { at };
        }
        SpliceTarget::AppendOnly
    }

    /// Everything before the section new content would land in front of.
    pub fn prefix<'a>(&self, letter: &'a str) -> &'a str {
        match self.locate(letter) {
            SpliceTarget::PlaceholderFound { start, .. } => &letter[..start],
            SpliceTarget::TerminalFound { at } => &letter[..at],
            SpliceTarget::AppendOnly => letter,
        }
    }

    /// Returns a new letter with `content` spliced in. `content` carries its own headings.
    pub fn splice(&self, letter: &str, content: &str) -> String {
        let block = content.trim();

        match self.locate(letter) {
            SpliceTarget::PlaceholderFound {
                start,
                body_end: Some(end),
            } => format!("{}{block}\n\n{}", &letter[..start], &letter[end..]),
            SpliceTarget::PlaceholderFound {
                start,
                body_end: None,
            } => {
                // No later heading bounds the old body, so it is kept after the new block.
                let remainder = &letter[start + self.placeholder.len()..];
                format!("{}{block}\n\n{remainder}", &letter[..start])
            }
            SpliceTarget::TerminalFound { at } => {
                format!("{}{block}\n\n{}", &letter[..at], &letter[at..])
            }
            SpliceTarget::AppendOnly => {
                let head = letter.trim_end();
                if head.is_empty() {
                    format!("{block}\n")
                } else {
                    format!("{head}\n\n{block}\n")
                }
            }
        }
    }
}

/// Byte offset of the first occurrence of `heading`, wherever it appears.
fn find_heading(text: &str, heading: &str) -> Option<usize> {
    text.find(heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NEW_SECTIONS: &str = "## Comparable Case Precedent\nSmith v. Jones, $500,000, 2019.\n\n## Settlement Demand\nWe demand $250,000.\n";

    const WITH_PLACEHOLDER: &str = "\
# Demand Letter

## Facts
Rear-end collision.

## Similar Case Verdicts
[to be researched]

## ASK
Please respond within 30 days.
";

    const WITHOUT_PLACEHOLDER: &str = "\
# Demand Letter

## Facts
Rear-end collision.

## ASK
Please respond within 30 days.
";

    const NEITHER: &str = "# Demand Letter\n\n## Facts\nRear-end collision.\n";

    #[test]
    fn test_placeholder_section_is_replaced() {
        let splicer = SectionSplicer::default();
        assert!(matches!(
            splicer.locate(WITH_PLACEHOLDER),
            SpliceTarget::PlaceholderFound {
                body_end: Some(_),
                ..
            }
        ));

        let out = splicer.splice(WITH_PLACEHOLDER, NEW_SECTIONS);
        assert_eq!(
            out,
            "\
# Demand Letter

## Facts
Rear-end collision.

## Comparable Case Precedent
Smith v. Jones, $500,000, 2019.

## Settlement Demand
We demand $250,000.

## ASK
Please respond within 30 days.
"
        );
    }

    #[test]
    fn test_missing_placeholder_inserts_before_terminal() {
        let splicer = SectionSplicer::default();
        let at = WITHOUT_PLACEHOLDER.find("## ASK").unwrap();
        assert_eq!(splicer.locate(WITHOUT_PLACEHOLDER), SpliceTarget::TerminalFound { at });

        let out = splicer.splice(WITHOUT_PLACEHOLDER, NEW_SECTIONS);
        assert!(out.starts_with("# Demand Letter\n\n## Facts\nRear-end collision.\n\n## Comparable Case Precedent\n"));
        assert!(out.ends_with("We demand $250,000.\n\n## ASK\nPlease respond within 30 days.\n"));
        assert!(out.find(SETTLEMENT_HEADING).unwrap() < out.find(TERMINAL_HEADING).unwrap());
    }

    #[test]
    fn test_no_headings_appends() {
        let splicer = SectionSplicer::default();
        assert_eq!(splicer.locate(NEITHER), SpliceTarget::AppendOnly);

        let out = splicer.splice(NEITHER, NEW_SECTIONS);
        assert_eq!(
            out,
            "# Demand Letter\n\n## Facts\nRear-end collision.\n\n## Comparable Case Precedent\nSmith v. Jones, $500,000, 2019.\n\n## Settlement Demand\nWe demand $250,000.\n"
        );
        assert_eq!(splicer.splice("", "## X\nbody"), "## X\nbody\n");
    }

    #[test]
    fn test_placeholder_as_last_section_keeps_old_body() {
        let letter = "## Facts\nA.\n\n## Similar Case Verdicts\nold notes\n";
        let splicer = SectionSplicer::default();
        assert_eq!(
            splicer.locate(letter),
            SpliceTarget::PlaceholderFound {
                start: 13,
                body_end: None
            }
        );
        assert_eq!(
            splicer.splice(letter, "## New\nbody"),
            "## Facts\nA.\n\n## New\nbody\n\nold notes\n"
        );
    }

    #[test]
    fn test_subheading_bounds_placeholder_body() {
        let letter = "## Similar Case Verdicts\nold\n### Note\nkeep\n";
        let splicer = SectionSplicer::default();
        assert_eq!(
            splicer.locate(letter),
            SpliceTarget::PlaceholderFound {
                start: 0,
                body_end: Some(30)
            }
        );
        assert_eq!(splicer.splice(letter, "## New\nbody"), "## New\nbody\n\n## Note\nkeep\n");
    }

    #[test]
    fn test_second_splice_falls_through_to_terminal() {
        let splicer = SectionSplicer::default();
        let once = splicer.splice(WITH_PLACEHOLDER, NEW_SECTIONS);
        let twice = splicer.splice(&once, NEW_SECTIONS);

        assert_eq!(once.matches(PRECEDENT_HEADING).count(), 1);
        assert_eq!(twice.matches(PRECEDENT_HEADING).count(), 2);
        assert!(!twice.contains("## Similar Case Verdicts"));
    }

    #[test]
    fn test_duplicate_placeholder_uses_first() {
        let letter = "## Similar Case Verdicts\nfirst\n\n## Similar Case Verdicts\nsecond\n";
        let out = SectionSplicer::default().splice(letter, "## New\nbody");
        assert_eq!(out, "## New\nbody\n\n## Similar Case Verdicts\nsecond\n");
    }

    #[test]
    fn test_prefix_stops_before_target() {
        let splicer = SectionSplicer::default();
        assert_eq!(
            splicer.prefix(WITH_PLACEHOLDER),
            "# Demand Letter\n\n## Facts\nRear-end collision.\n\n"
        );
        assert_eq!(
            splicer.prefix(WITHOUT_PLACEHOLDER),
            "# Demand Letter\n\n## Facts\nRear-end collision.\n\n"
        );
        assert_eq!(splicer.prefix(NEITHER), NEITHER);
    }

    #[test]
    fn test_inline_terminal_heading_is_found() {
        let letter = "Intro.\nWe now turn to the ## ASK\nPay.\n";
        let splicer = SectionSplicer::default();
        assert_eq!(splicer.locate(letter), SpliceTarget::TerminalFound { at: 26 });
        assert_eq!(
            splicer.splice(letter, "## New\nbody"),
            "Intro.\nWe now turn to the ## New\nbody\n\n## ASK\nPay.\n"
        );
    }
}
