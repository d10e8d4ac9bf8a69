//! Parsing pipeline for one source unit.
//!
//! A unit is parsed in a single forward pass: the scanner finds comment
//! blocks and tracks the dialect, each block is parsed into partial records,
//! and the associator pairs the block with the next declaration. Structs and
//! unions are then enriched with their resolved member tree. Each unit is
//! independent; nothing is shared between calls.

pub mod block;
pub mod members;
pub mod scan;
pub mod signature;

use crate::markup;
use crate::model::{
    Declaration, Dialect, DocItem, DocRecord, Document, RecordKind, Warning, WarningKind,
};
use anyhow::Result;

/// Parse one unit. `dialect` is the initial markup dialect; in-text
/// `parse-markup` directives override it from that point on.
///
/// Fatal structure errors (unterminated comment or aggregate body) abort
/// the unit and discard its partial results.
pub fn parse_unit(file: &str, text: &str, dialect: Dialect) -> Result<Document> {
    let mut doc = Document {
        file: file.to_string(),
        ..Document::default()
    };
    let lines: Vec<String> = text.lines().map(|l| scan::expand_tabs(l)).collect();

    let mut dialect = dialect;
    let scanned = scan::scan(text, &mut dialect)?;
    doc.warnings.extend(scanned.warnings);

    for comment in scanned.blocks {
        let parsed = block::parse_block(&comment);
        doc.warnings.extend(parsed.warnings);

        let mut named = Vec::new();
        for record in parsed.records {
            if record.kind == RecordKind::Doc {
                doc.records.push(record);
            } else {
                named.push(record);
            }
        }
        if named.is_empty() {
            continue;
        }

        // the declaration follows the closing line of the comment
        let assoc = signature::associate(&lines, comment.end_line)?;
        doc.warnings.extend(assoc.warnings);

        for record in named {
            match assoc.decl {
                Some(ref decl) => {
                    let record = finish_record(record, decl, &assoc.inline_docs, &mut doc.warnings);
                    check_markup(&record, &mut doc.warnings);
                    doc.records.push(record);
                }
                None => doc.warnings.push(Warning::new(
                    WarningKind::MissingSubject,
                    record.line,
                    format!("no declaration found for comment '{}'", record.name),
                )),
            }
        }
    }

    Ok(doc)
}

/// Merge the declaration side into a partial record and run the
/// documentation checks.
fn finish_record(
    mut record: DocRecord,
    decl: &Declaration,
    inline_docs: &[DocItem],
    warnings: &mut Vec<Warning>,
) -> DocRecord {
    if decl.name != record.name
        && decl.name != format!("sys_{}", record.name)
        && decl.name != format!("trace_{}", record.name)
    {
        warnings.push(Warning::new(
            WarningKind::NameMismatch,
            record.line,
            format!(
                "expecting prototype for '{}', prototype was for '{}' instead",
                record.name, decl.name
            ),
        ));
    }
    record.name = decl.name.clone();
    record.kind = decl.kind;
    record.params = decl.params.clone();

    for item in inline_docs {
        if record.items.iter().any(|i| i.name == item.name) {
            warnings.push(Warning::new(
                WarningKind::DuplicateDescription,
                item.line,
                format!("duplicate parameter definition '{}'", item.name),
            ));
        } else {
            record.items.push(DocItem {
                name: item.name.clone(),
                text: item.text.clone(),
                line: item.line,
            });
        }
    }

    match decl.kind {
        RecordKind::Struct | RecordKind::Union => {
            let res = members::resolve_members(decl, &record.items);
            record.members = res.members;
            warnings.extend(res.warnings);
        }
        RecordKind::Function | RecordKind::Enum => {
            warnings.extend(members::check_parameters(decl, &record.items));
        }
        RecordKind::Typedef => {
            // only a function typedef carries parameters to check
            if !decl.params.is_empty() {
                warnings.extend(members::check_parameters(decl, &record.items));
            }
        }
        RecordKind::Doc => {}
    }

    record
}

fn check_markup(record: &DocRecord, warnings: &mut Vec<Warning>) {
    if !record.description.is_empty() {
        warnings.extend(markup::check(
            &record.description.join("\n"),
            record.description_line,
        ));
    }
    for item in &record.items {
        warnings.extend(markup::check(&item.text, item.line));
    }
    for section in &record.sections {
        warnings.extend(markup::check(&section.text, section.line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Document {
        parse_unit("test.c", src, Dialect::Rest).unwrap()
    }

    #[test]
    fn function_record_end_to_end() {
        let src = "\
/**
 * foo() - does X
 * @a: first
 */
int foo(int a, ...)
{
}
";
        let doc = parse(src);
        assert!(doc.warnings.is_empty(), "warnings: {:?}", doc.warnings);
        assert_eq!(doc.records.len(), 1);
        let r = &doc.records[0];
        assert_eq!(r.kind, RecordKind::Function);
        assert_eq!(r.name, "foo");
        assert_eq!(r.short.as_deref(), Some("does X"));
        assert_eq!(r.params, vec!["a", "..."]);
        assert_eq!(r.item("a"), Some("first"));
    }

    #[test]
    fn struct_record_with_member_tree() {
        let src = "\
/**
 * struct point - a point
 * @x: abscissa
 * @y: ordinate
 */
struct point {
\tint x;
\tint y;
};
";
        let doc = parse(src);
        assert!(doc.warnings.is_empty(), "warnings: {:?}", doc.warnings);
        let r = &doc.records[0];
        assert_eq!(r.kind, RecordKind::Struct);
        assert_eq!(r.members.len(), 2);
        assert!(r.members.iter().all(|m| m.documented));
    }

    #[test]
    fn anonymous_union_warning_uses_dotted_path() {
        let src = "\
/**
 * struct s - short
 * @a: documented
 * @st1.arg1: nested and documented
 */
struct s {
\tint a;
\tunion {
\t\tstruct {
\t\t\tint arg1;
\t\t\tint arg2;
\t\t} st1;
\t};
};
";
        let doc = parse(src);
        let undoc: Vec<_> = doc
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::UndocumentedMember)
            .collect();
        // st1 itself and st1.arg2 lack descriptions
        assert_eq!(undoc.len(), 2);
        assert!(undoc.iter().any(|w| w.message.contains("'st1.arg2'")));
    }

    #[test]
    fn doc_block_without_declaration() {
        let src = "\
/**
 * DOC: Theory of Operation
 *
 * Lorem ipsum.
 */
int unrelated;
";
        let doc = parse(src);
        assert!(doc.warnings.is_empty());
        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.records[0].kind, RecordKind::Doc);
        assert_eq!(doc.records[0].name, "Theory of Operation");
    }

    #[test]
    fn comment_without_declaration_warns_and_drops() {
        let src = "/**\n * ghost() - no body follows\n */\n";
        let doc = parse(src);
        assert!(doc.records.is_empty());
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].kind, WarningKind::MissingSubject);
    }

    #[test]
    fn name_mismatch_warns_but_emits() {
        let src = "\
/**
 * foo() - short
 */
int bar(void)
{
}
";
        let doc = parse(src);
        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.records[0].name, "bar");
        assert!(doc
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::NameMismatch));
    }

    #[test]
    fn markup_warning_carries_the_section_line() {
        let src = "\
/**
 * foo() - short
 *
 * Leading description text.
 *
 * Return: a dangling &struct
 */
int foo(void)
{
}
";
        let doc = parse(src);
        let w = doc
            .warnings
            .iter()
            .find(|w| w.kind == WarningKind::AmbiguousMarkup)
            .expect("ambiguous markup warning");
        assert_eq!(w.line, 6);
    }

    #[test]
    fn syscall_title_already_prefixed() {
        let src = "\
/**
 * sys_tgkill - send signal to one thread
 * @tgid: thread group id
 * @pid: thread id
 * @sig: signal to send
 */
SYSCALL_DEFINE3(tgkill, pid_t, tgid, pid_t, pid, int, sig)
{
}
";
        let doc = parse(src);
        assert!(doc
            .warnings
            .iter()
            .all(|w| w.kind != WarningKind::NameMismatch));
        assert_eq!(doc.records[0].name, "sys_tgkill");
        assert_eq!(doc.records[0].params, vec!["tgid", "pid", "sig"]);
    }

    #[test]
    fn inline_member_docs_merge_into_items() {
        let src = "\
/**
 * struct s - short
 * @a: documented in the block
 */
struct s {
\tint a;
\t/** @b: documented inline */
\tint b;
};
";
        let doc = parse(src);
        assert!(doc.warnings.is_empty(), "warnings: {:?}", doc.warnings);
        let r = &doc.records[0];
        assert_eq!(r.item("b"), Some("documented inline"));
        assert!(r.members.iter().all(|m| m.documented));
    }

    #[test]
    fn dialect_directive_applies_to_following_comment() {
        let src = "\
/* parse-markup: kernel-doc */
/**
 * foo() - short
 */
int foo(void)
{
}
";
        let doc = parse(src);
        assert_eq!(doc.records[0].dialect, Dialect::KernelDoc);
    }

    #[test]
    fn unterminated_aggregate_aborts_unit() {
        let src = "\
/**
 * struct s - short
 */
struct s {
\tint a;
";
        let err = parse_unit("test.c", src, Dialect::Rest).unwrap_err();
        assert!(err.to_string().contains("unterminated struct body"));
    }
}
