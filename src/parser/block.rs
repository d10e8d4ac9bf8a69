//! Block parser — turns one comment block into partial documentation
//! records.
//!
//! The first content line names the subject (`struct foo - short`,
//! `name() - short`, or `DOC: title`). The remaining lines are walked by a
//! small state machine that collects the purpose continuation, `@name:`
//! entries, and named sections. A single `DOC:` block may carry several
//! titles and then yields one record per title.

use crate::model::{
    CommentBlock, Dialect, DocItem, DocRecord, RecordKind, Section, Warning, WarningKind,
};
use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

static RE_DOC_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*?\s*DOC:\s*(.*?)\s*$").unwrap());

static RE_DECL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\*\s*(\w+)").unwrap());

static RE_DECL_IDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\*\s*(struct|union|enum|typedef|function)\b\s*(\w+)(\(\))?").unwrap()
});

static RE_DECL_PURPOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-:](.*)$").unwrap());

// lines like " * http://example.org" must not open a section
static RE_SECT_EXCEPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*\s*[^\s@](.*)?:[^\s]").unwrap());

// more than 8 spaces (one tab) of prefix is indented content, not a header
static RE_SECT_REST: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(
        r"^\s*\*\s{1,8}(@\w[^:]*|@\.\.\.|description|context|returns?|notes?|examples?|introduction|intro):(.*?)\s*$",
    )
    .case_insensitive(true)
    .build()
    .unwrap()
});

static RE_SECT_VINTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*\s{1,8}(@\w[^:]*|@\.\.\.|\w[\w\s]+\w):(.*?)\s*$").unwrap());

// bare "Lorem ipsum:" header line, no content after the colon
static RE_SECT_TITLE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*\s{1,8}(\w[\w\s]+\w):\s*$").unwrap());

static RE_CONTENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\* ?(.*)$").unwrap());

static RE_PARAM_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^@(\w[.\w]*)").unwrap());

pub const SECTION_DESCRIPTION: &str = "Description";
pub const SECTION_CONTEXT: &str = "Context";
pub const SECTION_RETURN: &str = "Return";
pub const SECTION_INTRO: &str = "Introduction";

// section names that may interrupt an `@name:` entry
const SPECIAL_SECTIONS: [&str; 6] = [
    SECTION_DESCRIPTION,
    "Definition",
    "Members",
    "Constants",
    SECTION_CONTEXT,
    SECTION_RETURN,
];

/// Normalize the spelling of well-known section titles.
fn sect_title(title: &str) -> String {
    match title.to_lowercase().as_str() {
        "description" => SECTION_DESCRIPTION.to_string(),
        "intro" | "introduction" => SECTION_INTRO.to_string(),
        "context" => SECTION_CONTEXT.to_string(),
        "return" | "returns" => SECTION_RETURN.to_string(),
        _ => title.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct ParsedBlock {
    pub records: Vec<DocRecord>,
    pub warnings: Vec<Warning>,
}

struct BlockState<'a> {
    block: &'a CommentBlock,
    out: ParsedBlock,
    record: DocRecord,
    section: String,
    contents: String,
    /// file line where the open section started
    section_line: usize,
    /// the section header carried content after its colon
    section_inline: bool,
    in_doc_sect: bool,
    in_purpose: bool,
}

/// Parse one comment block. The returned records still lack the declaration
/// side (kind confirmation, parameter list, member tree).
pub fn parse_block(block: &CommentBlock) -> ParsedBlock {
    let mut state = BlockState {
        block,
        out: ParsedBlock::default(),
        record: DocRecord {
            dialect: block.dialect,
            line: block.start_line,
            ..DocRecord::default()
        },
        section: SECTION_DESCRIPTION.to_string(),
        contents: String::new(),
        section_line: block.start_line,
        section_inline: false,
        in_doc_sect: false,
        in_purpose: false,
    };

    let Some(first) = block.lines.first() else {
        return state.out;
    };

    if let Some(caps) = RE_DOC_BLOCK.captures(first) {
        state.parse_doc_block(&caps[1]);
        return state.out;
    }

    if !state.parse_title(first) {
        return state.out;
    }
    for (i, line) in block.lines.iter().enumerate().skip(1) {
        state.body_line(line, block.start_line + 1 + i);
    }
    state.finish_named();
    state.out
}

impl BlockState<'_> {
    fn line_of(&self, idx: usize) -> usize {
        self.block.start_line + 1 + idx
    }

    fn warn(&mut self, kind: WarningKind, line: usize, message: impl Into<String>) {
        self.out.warnings.push(Warning::new(kind, line, message));
    }

    // -- named records (functions, aggregates, typedefs) ----------------------

    /// First content line of a non-DOC block. Returns false when the line is
    /// not recognizable as a subject.
    fn parse_title(&mut self, line: &str) -> bool {
        let title_line = self.line_of(0);

        let name = if let Some(caps) = RE_DECL_IDENT.captures(line) {
            self.record.kind = match &caps[1] {
                "struct" => RecordKind::Struct,
                "union" => RecordKind::Union,
                "enum" => RecordKind::Enum,
                "typedef" => RecordKind::Typedef,
                _ => RecordKind::Function,
            };
            caps[2].to_string()
        } else if let Some(caps) = RE_DECL.captures(line) {
            self.record.kind = RecordKind::Function;
            caps[1].to_string()
        } else {
            self.warn(
                WarningKind::BadLine,
                title_line,
                format!("cannot understand doc line: '{}'", line.trim()),
            );
            return false;
        };
        self.record.name = name;
        self.record.line = title_line;
        self.in_purpose = true;

        let purpose = RE_DECL_PURPOSE
            .captures(line)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default();
        if purpose.is_empty() {
            self.warn(
                WarningKind::MissingShortDescription,
                title_line,
                format!("missing initial short description of '{}'", self.record.name),
            );
        } else {
            self.record.short = Some(purpose);
        }
        true
    }

    fn body_line(&mut self, line: &str, line_no: usize) {
        let mut new_sect = String::new();
        let mut new_cont = String::new();

        if !RE_SECT_EXCEPT.is_match(line) {
            match self.record.dialect {
                Dialect::Rest => {
                    if let Some(caps) = RE_SECT_REST.captures(line) {
                        new_sect = sect_title(caps[1].trim());
                        new_cont = caps[2].trim().to_string();
                    } else if let Some(caps) = RE_SECT_TITLE_ONLY.captures(line) {
                        new_sect = sect_title(caps[1].trim());
                    }
                    // inside an `@name:` entry only the special section names
                    // may open a new section; anything else stays content
                    if !new_sect.is_empty()
                        && self.section.starts_with('@')
                        && !new_sect.starts_with('@')
                        && !SPECIAL_SECTIONS.contains(&new_sect.as_str())
                    {
                        new_sect.clear();
                        new_cont.clear();
                    }
                }
                Dialect::KernelDoc => {
                    if let Some(caps) = RE_SECT_VINTAGE.captures(line) {
                        new_sect = sect_title(caps[1].trim());
                        new_cont = caps[2].trim().to_string();
                    }
                }
            }
        }

        if !new_sect.is_empty() {
            if !self.contents.trim().is_empty() {
                if !self.in_doc_sect {
                    self.warn(
                        WarningKind::BadLine,
                        line_no,
                        format!("contents before sections '{}'", self.contents.trim()),
                    );
                }
                self.dump_section();
            }
            self.in_doc_sect = true;
            self.in_purpose = false;
            self.section = new_sect;
            self.section_line = line_no;
            self.section_inline = !new_cont.is_empty();
            self.contents.clear();
            if !new_cont.is_empty() {
                self.contents = new_cont + "\n";
            }
            return;
        }

        let Some(caps) = RE_CONTENT.captures(line) else {
            self.warn(
                WarningKind::BadLine,
                line_no,
                format!("bad line: '{}'", line.trim()),
            );
            return;
        };
        let cont = caps[1].to_string();

        if cont.trim().is_empty() {
            if self.in_purpose {
                // blank line after the short description opens the
                // description section
                if !self.contents.trim().is_empty() {
                    self.dump_section();
                }
                self.section = SECTION_DESCRIPTION.to_string();
                self.section_line = line_no;
                self.section_inline = false;
                self.contents.clear();
                self.in_doc_sect = true;
                self.in_purpose = false;
            } else if self.section.starts_with('@') || self.section == SECTION_CONTEXT {
                // a blank line after an `@name:` entry switches back to the
                // description
                self.dump_section();
                self.section = SECTION_DESCRIPTION.to_string();
                self.section_line = line_no;
                self.section_inline = false;
                self.contents.clear();
                self.in_doc_sect = true;
            } else {
                self.contents.push('\n');
            }
            return;
        }

        if self.in_purpose {
            let cont = cont.trim();
            match self.record.short {
                Some(ref mut short) => {
                    short.push(' ');
                    short.push_str(cont);
                }
                None => self.record.short = Some(cont.to_string()),
            }
            return;
        }

        let mut cont = cont;
        if self.record.dialect == Dialect::Rest && self.section.starts_with('@') {
            cont = cont.trim().to_string();
            // a "lorem:" line inside a parameter entry starts a paragraph
            if RE_SECT_TITLE_ONLY.is_match(line) && !RE_SECT_EXCEPT.is_match(line) {
                cont = format!("\n{cont}\n");
            }
        }
        self.contents.push_str(&cont);
        self.contents.push('\n');
    }

    /// Store the open section on the record under its name.
    fn dump_section(&mut self) {
        let name = self.section.clone();
        let cont = self.contents.trim_end().to_string();
        // content starts on the header line itself or the one after it
        let line = if self.section_inline {
            self.section_line
        } else {
            self.section_line + 1
        };

        if let Some(caps) = RE_PARAM_NAME.captures(&name) {
            let pname = caps[1].to_string();
            self.push_item(pname, cont, line);
        } else if name == "@..." {
            self.push_item("...".to_string(), cont, line);
        } else if name == SECTION_DESCRIPTION {
            if self.record.description.is_empty() {
                self.record.description_line = line;
            } else {
                self.record.description.push(String::new());
            }
            self.record.description.extend(cont.lines().map(String::from));
        } else if let Some(sect) = self.record.sections.iter_mut().find(|s| s.name == name) {
            self.out.warnings.push(Warning::new(
                WarningKind::DuplicateDescription,
                self.section_line,
                format!("duplicate section name '{name}'"),
            ));
            sect.text.push_str("\n\n");
            sect.text.push_str(&cont);
        } else {
            self.record.sections.push(Section { name, text: cont, line });
        }
        self.contents.clear();
    }

    fn push_item(&mut self, name: String, text: String, line: usize) {
        if self.record.items.iter().any(|i| i.name == name) {
            self.out.warnings.push(Warning::new(
                WarningKind::DuplicateDescription,
                line,
                format!("duplicate parameter definition '{name}'"),
            ));
            return;
        }
        self.record.items.push(DocItem { name, text, line });
    }

    fn finish_named(&mut self) {
        if !self.contents.trim().is_empty() {
            self.dump_section();
        }
        let record = std::mem::take(&mut self.record);
        self.out.records.push(record);
    }

    // -- DOC blocks -----------------------------------------------------------

    fn parse_doc_block(&mut self, title: &str) {
        let mut title = if title.is_empty() {
            SECTION_INTRO.to_string()
        } else {
            sect_title(title)
        };
        let mut contents = String::new();
        let mut start = self.block.start_line + 1;
        let mut content_start = start + 1;

        let lines: Vec<String> = self.block.lines.iter().skip(1).cloned().collect();
        for (i, line) in lines.iter().enumerate() {
            if let Some(caps) = RE_DOC_BLOCK.captures(line) {
                self.push_doc_record(&title, &contents, start, content_start);
                title = if caps[1].is_empty() {
                    SECTION_INTRO.to_string()
                } else {
                    sect_title(&caps[1])
                };
                contents.clear();
                start = self.line_of(i + 1);
                content_start = start + 1;
                continue;
            }
            if let Some(caps) = RE_CONTENT.captures(line) {
                let cont = &caps[1];
                if cont.trim().is_empty() && contents.is_empty() {
                    continue;
                }
                if contents.is_empty() {
                    content_start = self.line_of(i + 1);
                }
                contents.push_str(cont);
                contents.push('\n');
            }
        }
        self.push_doc_record(&title, &contents, start, content_start);
    }

    fn push_doc_record(&mut self, title: &str, contents: &str, line: usize, content_line: usize) {
        self.out.records.push(DocRecord {
            kind: RecordKind::Doc,
            name: title.to_string(),
            dialect: self.block.dialect,
            sections: vec![Section {
                name: title.to_string(),
                text: contents.trim_end().to_string(),
                line: content_line,
            }],
            line,
            ..DocRecord::default()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(lines: &[&str]) -> CommentBlock {
        CommentBlock {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            dialect: Dialect::Rest,
            start_line: 10,
            end_line: 10 + lines.len() + 1,
        }
    }

    fn one_record(lines: &[&str]) -> DocRecord {
        let parsed = parse_block(&block(lines));
        assert_eq!(parsed.records.len(), 1, "expected one record");
        parsed.records.into_iter().next().unwrap()
    }

    #[test]
    fn function_title_and_short() {
        let r = one_record(&[" * user_function() - function that can do wonders"]);
        assert_eq!(r.kind, RecordKind::Function);
        assert_eq!(r.name, "user_function");
        assert_eq!(r.short.as_deref(), Some("function that can do wonders"));
    }

    #[test]
    fn struct_title() {
        let r = one_record(&[" * struct my_struct - short description"]);
        assert_eq!(r.kind, RecordKind::Struct);
        assert_eq!(r.name, "my_struct");
    }

    #[test]
    fn missing_short_warns() {
        let parsed = parse_block(&block(&[" * my_func"]));
        assert!(parsed
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::MissingShortDescription));
        assert!(parsed.records[0].short.is_none());
    }

    #[test]
    fn purpose_continuation_joins_lines() {
        let r = one_record(&[
            " * frob() - initialize the frobnicator and",
            " * bring it online",
        ]);
        assert_eq!(
            r.short.as_deref(),
            Some("initialize the frobnicator and bring it online")
        );
    }

    #[test]
    fn blank_after_purpose_starts_description() {
        let r = one_record(&[
            " * frob() - short",
            " *",
            " * First description line.",
            " * Second description line.",
        ]);
        assert_eq!(
            r.description,
            vec!["First description line.", "Second description line."]
        );
    }

    #[test]
    fn paragraph_break_is_an_empty_entry() {
        let r = one_record(&[
            " * frob() - short",
            " *",
            " * first paragraph.",
            " *",
            " * second paragraph.",
        ]);
        assert_eq!(
            r.description,
            vec!["first paragraph.", "", "second paragraph."]
        );
    }

    #[test]
    fn param_entries_with_continuation() {
        let r = one_record(&[
            " * frob() - short",
            " * @a: first argument",
            " * @b: second argument,",
            " *     continued on the next line",
        ]);
        assert_eq!(r.items.len(), 2);
        assert_eq!(r.items[0].name, "a");
        assert_eq!(r.items[0].text, "first argument");
        assert_eq!(r.items[1].name, "b");
        assert_eq!(
            r.items[1].text,
            "second argument,\ncontinued on the next line"
        );
    }

    #[test]
    fn dotted_and_ellipsis_entries() {
        let r = one_record(&[
            " * struct s - short",
            " * @nested.member: dotted path",
            " * @...: variadic",
        ]);
        assert_eq!(r.items[0].name, "nested.member");
        assert_eq!(r.items[1].name, "...");
    }

    #[test]
    fn duplicate_param_warns_and_keeps_first() {
        let parsed = parse_block(&block(&[
            " * frob() - short",
            " * @a: first",
            " * @a: again",
        ]));
        assert!(parsed
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::DuplicateDescription));
        let r = &parsed.records[0];
        assert_eq!(r.items.len(), 1);
        assert_eq!(r.items[0].text, "first");
    }

    #[test]
    fn normalized_section_headers() {
        let r = one_record(&[
            " * frob() - short",
            " *",
            " * returns: zero on success",
            " * context: may sleep",
        ]);
        assert_eq!(r.section("Return"), Some("zero on success"));
        assert_eq!(r.section("Context"), Some("may sleep"));
    }

    #[test]
    fn custom_section_title_only_line() {
        let r = one_record(&[
            " * frob() - short",
            " *",
            " * Some Chapter:",
            " * chapter body",
        ]);
        assert_eq!(r.section("Some Chapter"), Some("chapter body"));
    }

    #[test]
    fn url_does_not_open_section() {
        let r = one_record(&[
            " * frob() - short",
            " *",
            " * see http://example.org/doc for details",
        ]);
        assert!(r.sections.is_empty());
        assert_eq!(r.description[0], "see http://example.org/doc for details");
    }

    #[test]
    fn blank_line_ends_param_entry() {
        let r = one_record(&[
            " * frob() - short",
            " * @a: first argument",
            " *",
            " * Trailing description.",
        ]);
        assert_eq!(r.items[0].text, "first argument");
        assert_eq!(r.description, vec!["Trailing description."]);
    }

    #[test]
    fn vintage_dialect_accepts_any_section_header() {
        let mut b = block(&[
            " * frob() - short",
            " *",
            " * Whatever Header: body text",
        ]);
        b.dialect = Dialect::KernelDoc;
        let parsed = parse_block(&b);
        assert_eq!(parsed.records[0].section("Whatever Header"), Some("body text"));
    }

    #[test]
    fn duplicate_section_appends_and_warns() {
        let parsed = parse_block(&block(&[
            " * frob() - short",
            " *",
            " * Return: zero",
            " *",
            " * Return: or minus one",
        ]));
        assert!(parsed
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::DuplicateDescription));
        assert_eq!(
            parsed.records[0].section("Return"),
            Some("zero\n\nor minus one")
        );
    }

    #[test]
    fn doc_block_single() {
        let parsed = parse_block(&block(&[
            " * DOC: Theory of Operation",
            " *",
            " * The whole idea is based on nonsense.",
        ]));
        let r = &parsed.records[0];
        assert_eq!(r.kind, RecordKind::Doc);
        assert_eq!(r.name, "Theory of Operation");
        assert_eq!(
            r.sections[0].text,
            "The whole idea is based on nonsense."
        );
    }

    #[test]
    fn doc_block_multiple_titles() {
        let parsed = parse_block(&block(&[
            " * DOC: first chapter",
            " *",
            " * body one",
            " *",
            " * DOC: second chapter",
            " *",
            " * body two",
        ]));
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].name, "first chapter");
        assert_eq!(parsed.records[0].sections[0].text, "body one");
        assert_eq!(parsed.records[1].name, "second chapter");
        assert_eq!(parsed.records[1].sections[0].text, "body two");
    }

    #[test]
    fn doc_block_without_title_is_introduction() {
        let parsed = parse_block(&block(&[" * DOC:", " *", " * intro text"]));
        assert_eq!(parsed.records[0].name, "Introduction");
    }

    #[test]
    fn unrecognized_title_is_dropped() {
        let parsed = parse_block(&block(&[" * - nothing here"]));
        assert!(parsed.records.is_empty());
        assert!(parsed
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::BadLine));
    }
}
