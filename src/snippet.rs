//! Snippet extractor — pulls labeled spans of raw source text delimited by
//! `parse-SNIP` / `parse-SNAP` marker comments.
//!
//! Runs independently of comment parsing: markers inside strings or odd
//! places are taken at face value. The extraction is a lazy, finite,
//! file-ordered sequence; re-running it over the same text yields identical
//! spans.

use crate::model::{Snippet, Warning, WarningKind};
use regex::Regex;
use std::sync::LazyLock;

static RE_SNIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/\*+\s*parse-SNIP:\s*([a-zA-Z0-9_-]*)\s*\*/+\s*$").unwrap());

static RE_SNAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/\*+\s*parse-SNAP:\s*([a-zA-Z0-9_-]*)\s*\*/+\s*$").unwrap());

struct Pending {
    label: String,
    /// line the first recorded row would get
    start: usize,
    lines: Vec<String>,
}

/// Lazy iterator over the snippets of one source text. Warnings accumulate
/// while iterating and are drained afterwards with [`Snippets::warnings`].
pub struct Snippets<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    pending: Option<Pending>,
    warnings: Vec<Warning>,
}

/// Scan `text` for snippet markers.
pub fn snippets(text: &str) -> Snippets<'_> {
    Snippets {
        lines: text.lines().enumerate(),
        pending: None,
        warnings: Vec::new(),
    }
}

impl Snippets<'_> {
    /// Warnings collected so far. Complete once the iterator is exhausted.
    pub fn warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    fn finish(&mut self, pending: Pending, end_line: usize) -> Option<Snippet> {
        let mut start = pending.start;
        let mut end = end_line;
        let mut lines = pending.lines;
        while lines.first().is_some_and(|l| l.trim().is_empty()) {
            lines.remove(0);
            start += 1;
        }
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
            end -= 1;
        }
        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        Some(Snippet {
            label: pending.label,
            start_line: start,
            end_line: end,
            text,
        })
    }
}

impl Iterator for Snippets<'_> {
    type Item = Snippet;

    fn next(&mut self) -> Option<Self::Item> {
        for (idx, line) in self.lines.by_ref() {
            let line_no = idx + 1;

            if let Some(caps) = RE_SNIP.captures(line.trim_end()) {
                let label = caps[1].to_string();
                if label.is_empty() {
                    // an unlabeled opener just closes whatever is recording
                    if let Some(pending) = self.pending.take() {
                        return self.finish(pending, line_no - 1);
                    }
                    continue;
                }
                if let Some(old) = self.pending.replace(Pending {
                    label: label.clone(),
                    start: line_no + 1,
                    lines: Vec::new(),
                }) {
                    self.warnings.push(Warning::new(
                        WarningKind::SnippetReplaced,
                        line_no,
                        format!(
                            "snippet '{}' replaced by '{}' before it was closed",
                            old.label, label
                        ),
                    ));
                }
                continue;
            }

            if let Some(caps) = RE_SNAP.captures(line.trim_end()) {
                let label = &caps[1];
                match self.pending.take() {
                    Some(pending) => {
                        if !label.is_empty() && label != pending.label {
                            self.warnings.push(Warning::new(
                                WarningKind::SnippetLabelMismatch,
                                line_no,
                                format!(
                                    "snippet closed as '{}' but opened as '{}'",
                                    label, pending.label
                                ),
                            ));
                        }
                        return self.finish(pending, line_no - 1);
                    }
                    None => self.warnings.push(Warning::new(
                        WarningKind::SnippetLabelMismatch,
                        line_no,
                        "closing snippet marker without an open snippet",
                    )),
                }
                continue;
            }

            if let Some(pending) = self.pending.as_mut() {
                pending.lines.push(line.to_string());
            }
        }

        // a snippet left open runs to the end of the file
        if let Some(pending) = self.pending.take() {
            let end = pending.start + pending.lines.len();
            return self.finish(pending, end.saturating_sub(1));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> (Vec<Snippet>, Vec<Warning>) {
        let mut iter = snippets(text);
        let snips: Vec<Snippet> = iter.by_ref().collect();
        (snips, iter.warnings())
    }

    #[test]
    fn simple_span() {
        let text = "before\n/* parse-SNIP: hello */\nint a;\nint b;\n/* parse-SNAP: */\nafter\n";
        let (snips, warnings) = collect(text);
        assert!(warnings.is_empty());
        assert_eq!(snips.len(), 1);
        assert_eq!(snips[0].label, "hello");
        assert_eq!(snips[0].start_line, 3);
        assert_eq!(snips[0].end_line, 4);
        assert_eq!(snips[0].text, "int a;\nint b;\n");
    }

    #[test]
    fn matching_close_label() {
        let text = "/* parse-SNIP: x */\ncode\n/* parse-SNAP: x */\n";
        let (snips, warnings) = collect(text);
        assert!(warnings.is_empty());
        assert_eq!(snips[0].text, "code\n");
    }

    #[test]
    fn mismatched_close_label_warns_but_extracts() {
        let text = "/* parse-SNIP: foo */\ncode\n/* parse-SNAP: bar */\n";
        let (snips, warnings) = collect(text);
        assert_eq!(snips.len(), 1);
        assert_eq!(snips[0].label, "foo");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::SnippetLabelMismatch);
    }

    #[test]
    fn second_snip_replaces_pending() {
        let text = "/* parse-SNIP: one */\nlost\n/* parse-SNIP: two */\nkept\n/* parse-SNAP: */\n";
        let (snips, warnings) = collect(text);
        assert_eq!(snips.len(), 1);
        assert_eq!(snips[0].label, "two");
        assert_eq!(snips[0].text, "kept\n");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::SnippetReplaced);
    }

    #[test]
    fn open_snippet_runs_to_eof() {
        let text = "/* parse-SNIP: tail */\nlast line\n";
        let (snips, warnings) = collect(text);
        assert!(warnings.is_empty());
        assert_eq!(snips[0].label, "tail");
        assert_eq!(snips[0].text, "last line\n");
    }

    #[test]
    fn snap_without_snip_warns() {
        let (snips, warnings) = collect("/* parse-SNAP: */\n");
        assert!(snips.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn surrounding_blank_lines_are_trimmed() {
        let text = "/* parse-SNIP: x */\n\ncode\n\n/* parse-SNAP: */\n";
        let (snips, _) = collect(text);
        assert_eq!(snips[0].start_line, 3);
        assert_eq!(snips[0].end_line, 3);
        assert_eq!(snips[0].text, "code\n");
    }

    #[test]
    fn line_range_matches_the_trimmed_text() {
        let text = "/* parse-SNIP: x */\ncode\n\n/* parse-SNAP: */\n";
        let (snips, _) = collect(text);
        assert_eq!(snips[0].text, "code\n");
        assert_eq!(snips[0].start_line, 2);
        assert_eq!(snips[0].end_line, 2);
    }

    #[test]
    fn multiple_snippets_in_order() {
        let text = "/* parse-SNIP: a */\none\n/* parse-SNAP: */\n/* parse-SNIP: b */\ntwo\n/* parse-SNAP: */\n";
        let (snips, _) = collect(text);
        assert_eq!(snips.len(), 2);
        assert_eq!(snips[0].label, "a");
        assert_eq!(snips[1].label, "b");
    }

    #[test]
    fn extraction_is_idempotent() {
        let text = "/* parse-SNIP: x */\ncode\n/* parse-SNAP: */\n";
        let (first, _) = collect(text);
        let (second, _) = collect(text);
        assert_eq!(first, second);
    }
}
