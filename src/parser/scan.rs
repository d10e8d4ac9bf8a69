//! Comment scanner — locates documentation comment blocks and tracks the
//! active markup dialect.
//!
//! A documentation block opens with a line consisting of `/**` only and runs
//! to the closing `*/`. A `/* parse-markup: <dialect> */` line is not a
//! documentation block; it switches the dialect for all following blocks in
//! the same unit.

use crate::model::{CommentBlock, Dialect, Warning, WarningKind};
use anyhow::{bail, Result};
use regex::Regex;
use std::sync::LazyLock;

static RE_DOC_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/\*\*\s*$").unwrap());

static RE_DOC_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*+/").unwrap());

static RE_DOC_COM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\*\s?").unwrap());

// In-text parse options share one comment shape: /* parse-<name>: <value> */
static RE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/\*+\s*parse-(markup|SNIP|SNAP):\s*([a-zA-Z0-9_-]*)\s*\*/+\s*$").unwrap()
});

/// Result of scanning one unit for documentation comments.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub blocks: Vec<CommentBlock>,
    pub warnings: Vec<Warning>,
}

/// True for any in-text parse option line (markup switch or snippet marker).
pub fn is_directive(line: &str) -> bool {
    RE_DIRECTIVE.is_match(line)
}

/// Expand tabs to the next 8-column stop, as the original sources assume.
pub fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len());
    let mut col = 0usize;
    for c in line.chars() {
        if c == '\t' {
            let pad = 8 - col % 8;
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(c);
            col += 1;
        }
    }
    out
}

/// Scan `input` for documentation comment blocks, in source order.
///
/// Fails on an unterminated block; `dialect` is the unit's initial dialect
/// and is updated in place by `parse-markup` directives.
pub fn scan(input: &str, dialect: &mut Dialect) -> Result<ScanResult> {
    let mut result = ScanResult::default();
    let mut block: Option<CommentBlock> = None;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = expand_tabs(raw);

        if let Some(ref mut b) = block {
            if let Some(m) = RE_DOC_END.find(&line) {
                let before = &line[..m.start()];
                let content = RE_DOC_COM.replace(before, "");
                if !content.trim().is_empty() {
                    result.warnings.push(Warning::new(
                        WarningKind::BadLine,
                        line_no,
                        "suspicious ending line",
                    ));
                }
                b.end_line = line_no;
                result.blocks.push(block.take().unwrap());
            } else {
                b.lines.push(line);
            }
            continue;
        }

        if let Some(caps) = RE_DIRECTIVE.captures(line.trim_end()) {
            if &caps[1] == "markup" {
                match Dialect::from_name(&caps[2]) {
                    Some(d) => *dialect = d,
                    None => result.warnings.push(Warning::new(
                        WarningKind::UnknownDirective,
                        line_no,
                        format!("unknown parse-markup value: '{}'", &caps[2]),
                    )),
                }
            }
            // SNIP/SNAP markers belong to the snippet extractor
            continue;
        }

        if RE_DOC_START.is_match(&line) {
            block = Some(CommentBlock {
                lines: Vec::new(),
                dialect: *dialect,
                start_line: line_no,
                end_line: line_no,
            });
        }
    }

    if let Some(b) = block {
        bail!("unterminated comment block starting at line {}", b.start_line);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_single_block() {
        let src = "int x;\n/**\n * foo() - does X\n * @a: first\n */\nint foo(int a);\n";
        let mut dialect = Dialect::Rest;
        let res = scan(src, &mut dialect).unwrap();
        assert_eq!(res.blocks.len(), 1);
        assert_eq!(res.blocks[0].start_line, 2);
        assert_eq!(res.blocks[0].end_line, 5);
        assert_eq!(res.blocks[0].lines.len(), 2);
        assert!(res.warnings.is_empty());
    }

    #[test]
    fn directive_switches_dialect_for_following_blocks() {
        let src = "\
/**\n * a() - first\n */\n\
/* parse-markup: kernel-doc */\n\
/**\n * b() - second\n */\n";
        let mut dialect = Dialect::Rest;
        let res = scan(src, &mut dialect).unwrap();
        assert_eq!(res.blocks.len(), 2);
        assert_eq!(res.blocks[0].dialect, Dialect::Rest);
        assert_eq!(res.blocks[1].dialect, Dialect::KernelDoc);
        assert_eq!(dialect, Dialect::KernelDoc);
    }

    #[test]
    fn unknown_markup_value_warns() {
        let src = "/* parse-markup: asciidoc */\n";
        let mut dialect = Dialect::Rest;
        let res = scan(src, &mut dialect).unwrap();
        assert_eq!(res.warnings.len(), 1);
        assert_eq!(res.warnings[0].kind, WarningKind::UnknownDirective);
        assert_eq!(dialect, Dialect::Rest);
    }

    #[test]
    fn unterminated_block_is_fatal() {
        let src = "/**\n * foo() - broken\n";
        let mut dialect = Dialect::Rest;
        let err = scan(src, &mut dialect).unwrap_err();
        assert!(err.to_string().contains("unterminated comment block"));
    }

    #[test]
    fn plain_comments_are_ignored() {
        let src = "/* not a doc comment */\n// neither\nint x;\n";
        let mut dialect = Dialect::Rest;
        let res = scan(src, &mut dialect).unwrap();
        assert!(res.blocks.is_empty());
    }

    #[test]
    fn indented_doc_comment_is_not_a_block() {
        // inline member comments inside aggregates are handled elsewhere
        let src = "struct s {\n\t/** @a: inline */\n\tint a;\n};\n";
        let mut dialect = Dialect::Rest;
        let res = scan(src, &mut dialect).unwrap();
        assert!(res.blocks.is_empty());
    }

    #[test]
    fn content_on_closing_line_warns() {
        let src = "/**\n * foo() - does X\n * trailing */\nint foo(void);\n";
        let mut dialect = Dialect::Rest;
        let res = scan(src, &mut dialect).unwrap();
        assert_eq!(res.blocks.len(), 1);
        assert_eq!(res.warnings.len(), 1);
        assert_eq!(res.warnings[0].kind, WarningKind::BadLine);
    }

    #[test]
    fn expand_tabs_stops() {
        assert_eq!(expand_tabs("\tint a;"), "        int a;");
        assert_eq!(expand_tabs("ab\tc"), "ab      c");
    }
}
