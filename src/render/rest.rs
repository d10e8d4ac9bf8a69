//! reST renderer.
//!
//! Writes one section per record: an anchor, a header, the Sphinx C domain
//! directive for the declaration, the short description, then the
//! documented items as a definition list and the remaining sections as
//! subsections. An `Example` section becomes a literal code block.

use crate::markup;
use crate::model::{DocRecord, Document, MemberNode, RecordKind, Section};
use crate::render::Renderer;
use regex::Regex;
use std::sync::LazyLock;

const INDENT: &str = "    ";

static RE_ID_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._]").unwrap());

pub struct RestRenderer {
    /// emit the mode line and source-file comment at the top
    pub preamble: bool,
}

impl Renderer for RestRenderer {
    fn render(&self, doc: &Document) -> String {
        let mut out = String::new();
        if self.preamble {
            out.push_str(".. -*- coding: utf-8; mode: rst -*-\n");
            out.push_str(&format!(".. src-file: {}\n", doc.file));
        }
        for record in &doc.records {
            render_record(&mut out, record);
        }
        out
    }

    fn file_extension(&self) -> &str {
        "rst"
    }
}

/// Substitute invalid chars of a reference id with `-` and lowercase it.
fn normalize_id(id: &str) -> String {
    RE_ID_CHARS.replace_all(id, "-").to_lowercase()
}

fn write_anchor(out: &mut String, refname: &str) {
    out.push_str(&format!("\n.. _`{}`:\n", normalize_id(refname)));
}

fn write_header(out: &mut String, header: &str) {
    out.push_str(&format!("\n{}\n{}\n", header, "=".repeat(header.chars().count())));
}

fn write_subheader(out: &mut String, header: &str) {
    out.push_str(&format!("\n{}\n{}\n", header, "-".repeat(header.chars().count())));
}

fn render_record(out: &mut String, record: &DocRecord) {
    if record.kind == RecordKind::Doc {
        for section in &record.sections {
            write_anchor(out, &section.name);
            write_header(out, &section.name);
            render_section_body(out, record, section);
        }
        return;
    }

    write_anchor(out, &record.name);
    write_header(out, &record.name);

    match record.kind {
        RecordKind::Function => {
            out.push_str(&format!(
                "\n.. c:function:: {}({})\n",
                record.name,
                record.params.join(", ")
            ));
        }
        RecordKind::Struct | RecordKind::Union | RecordKind::Enum => {
            out.push_str(&format!("\n.. c:type:: {} {}\n", record.kind, record.name));
        }
        RecordKind::Typedef => {
            out.push_str(&format!("\n.. c:type:: {}\n", record.name));
        }
        RecordKind::Doc => unreachable!(),
    }

    if let Some(ref short) = record.short {
        out.push_str(&format!(
            "\n{}{}\n",
            INDENT,
            markup::highlight(short, record.dialect)
        ));
    }

    match record.kind {
        RecordKind::Function => render_parameters(out, record),
        RecordKind::Struct | RecordKind::Union => render_members(out, record),
        RecordKind::Enum => render_constants(out, record),
        // a function typedef carries a parameter list worth printing
        RecordKind::Typedef if !record.params.is_empty() => render_parameters(out, record),
        _ => {}
    }

    if !record.description.is_empty() {
        write_subheader(out, "Description");
        out.push('\n');
        out.push_str(&markup::highlight(
            &record.description.join("\n"),
            record.dialect,
        ));
        out.push('\n');
    }

    for section in &record.sections {
        write_anchor(out, &format!("{}.{}", record.name, section.name));
        write_subheader(out, &section.name);
        render_section_body(out, record, section);
    }
}

fn render_parameters(out: &mut String, record: &DocRecord) {
    for param in &record.params {
        let label = if param == "..." {
            ":param ellipsis ellipsis:".to_string()
        } else {
            format!(":param {param}:")
        };
        out.push_str(&format!("\n{INDENT}{label}\n"));
        if let Some(text) = record.item(param) {
            write_indented(out, &markup::highlight(text, record.dialect), 2);
        } else if param == "..." {
            write_indented(out, "variable arguments", 2);
        }
    }
}

fn render_constants(out: &mut String, record: &DocRecord) {
    let described: Vec<&str> = record
        .params
        .iter()
        .filter(|p| record.item(p).is_some())
        .map(String::as_str)
        .collect();
    if described.is_empty() {
        return;
    }
    out.push_str("\n**Constants**\n");
    for name in described {
        out.push_str(&format!("\n``{name}``\n"));
        if let Some(text) = record.item(name) {
            write_indented(out, &markup::highlight(text, record.dialect), 1);
        }
    }
}

fn render_members(out: &mut String, record: &DocRecord) {
    if record.members.is_empty() {
        return;
    }
    out.push_str("\n**Members**\n");
    render_member_nodes(out, record, &record.members);
}

fn render_member_nodes(out: &mut String, record: &DocRecord, nodes: &[MemberNode]) {
    for node in nodes {
        if !node.private {
            if let Some(text) = record.item(&node.path) {
                out.push_str(&format!("\n``{}``\n", node.path));
                write_indented(out, &markup::highlight(text, record.dialect), 1);
            }
        }
        render_member_nodes(out, record, &node.children);
    }
}

fn render_section_body(out: &mut String, record: &DocRecord, section: &Section) {
    if section.name.eq_ignore_ascii_case("example") {
        out.push_str("\n.. code-block:: c\n\n");
        for line in section.text.lines() {
            if line.trim().is_empty() {
                out.push('\n');
            } else {
                out.push_str(&format!("{INDENT}{line}\n"));
            }
        }
        return;
    }
    out.push('\n');
    out.push_str(&markup::highlight(&section.text, record.dialect));
    out.push('\n');
}

fn write_indented(out: &mut String, text: &str, level: usize) {
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(&format!("{}{}\n", INDENT.repeat(level), line));
        }
    }
}
