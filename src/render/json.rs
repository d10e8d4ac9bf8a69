//! JSON renderer — structured output for tooling integration.
//!
//! Serializes the Document model directly as JSON, warnings included.

use crate::model::{DocRecord, Document, MemberNode};
use crate::render::Renderer;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, doc: &Document) -> String {
        let mut out = String::new();
        out.push_str("{\n");
        out.push_str(&format!("  \"file\": \"{}\",\n", json_escape(&doc.file)));

        out.push_str("  \"records\": [\n");
        for (i, record) in doc.records.iter().enumerate() {
            out.push_str(&render_record(record));
            if i < doc.records.len() - 1 {
                out.push_str(",\n");
            } else {
                out.push('\n');
            }
        }
        out.push_str("  ],\n");

        out.push_str("  \"warnings\": [\n");
        for (i, warning) in doc.warnings.iter().enumerate() {
            let comma = if i < doc.warnings.len() - 1 { "," } else { "" };
            out.push_str(&format!(
                "    {{ \"line\": {}, \"kind\": \"{}\", \"message\": \"{}\" }}{}\n",
                warning.line,
                warning.kind.label(),
                json_escape(&warning.message),
                comma
            ));
        }
        out.push_str("  ]\n");
        out.push_str("}\n");
        out
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}

fn render_record(record: &DocRecord) -> String {
    let mut out = String::new();
    out.push_str("    {\n");
    out.push_str(&format!("      \"kind\": \"{}\",\n", record.kind));
    out.push_str(&format!("      \"name\": \"{}\",\n", json_escape(&record.name)));
    out.push_str(&format!("      \"line\": {},\n", record.line));

    if let Some(ref short) = record.short {
        out.push_str(&format!("      \"short\": \"{}\",\n", json_escape(short)));
    }

    if !record.description.is_empty() {
        out.push_str(&format!(
            "      \"description\": \"{}\",\n",
            json_escape(&record.description.join("\n"))
        ));
    }

    if !record.params.is_empty() {
        out.push_str("      \"params\": [");
        let names: Vec<String> = record
            .params
            .iter()
            .map(|p| format!("\"{}\"", json_escape(p)))
            .collect();
        out.push_str(&names.join(", "));
        out.push_str("],\n");
    }

    if !record.items.is_empty() {
        out.push_str("      \"items\": [\n");
        for (i, item) in record.items.iter().enumerate() {
            let comma = if i < record.items.len() - 1 { "," } else { "" };
            out.push_str(&format!(
                "        {{ \"name\": \"{}\", \"text\": \"{}\" }}{}\n",
                json_escape(&item.name),
                json_escape(&item.text),
                comma
            ));
        }
        out.push_str("      ],\n");
    }

    if !record.members.is_empty() {
        out.push_str("      \"members\": [\n");
        render_members(&mut out, &record.members, 4);
        out.push_str("      ],\n");
    }

    if !record.sections.is_empty() {
        out.push_str("      \"sections\": [\n");
        for (i, section) in record.sections.iter().enumerate() {
            let comma = if i < record.sections.len() - 1 { "," } else { "" };
            out.push_str(&format!(
                "        {{ \"name\": \"{}\", \"text\": \"{}\" }}{}\n",
                json_escape(&section.name),
                json_escape(&section.text),
                comma
            ));
        }
        out.push_str("      ],\n");
    }

    // drop the trailing comma of the last field
    let trimmed = out.trim_end().trim_end_matches(',').to_string();
    out = trimmed;
    out.push('\n');
    out.push_str("    }");
    out
}

fn render_members(out: &mut String, nodes: &[MemberNode], depth: usize) {
    let pad = "  ".repeat(depth);
    for (i, node) in nodes.iter().enumerate() {
        let comma = if i < nodes.len() - 1 { "," } else { "" };
        out.push_str(&format!(
            "{}{{ \"path\": \"{}\", \"documented\": {}, \"private\": {}",
            pad,
            json_escape(&node.path),
            node.documented,
            node.private
        ));
        if node.children.is_empty() {
            out.push_str(&format!(" }}{comma}\n"));
        } else {
            out.push_str(", \"children\": [\n");
            render_members(out, &node.children, depth + 1);
            out.push_str(&format!("{pad}] }}{comma}\n"));
        }
    }
}

/// Escape a string for embedding in JSON.
fn json_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dialect;
    use crate::parser::parse_unit;

    fn render(src: &str) -> String {
        let doc = parse_unit("demo.c", src, Dialect::Rest).unwrap();
        JsonRenderer.render(&doc)
    }

    #[test]
    fn function_record_fields() {
        let out = render(
            "/**\n * frob() - short\n * @a: first\n */\nint frob(int a)\n{\n}\n",
        );
        assert!(out.contains("\"file\": \"demo.c\""));
        assert!(out.contains("\"kind\": \"function\""));
        assert!(out.contains("\"name\": \"frob\""));
        assert!(out.contains("\"short\": \"short\""));
        assert!(out.contains("\"params\": [\"a\"]"));
        assert!(out.contains("{ \"name\": \"a\", \"text\": \"first\" }"));
    }

    #[test]
    fn warnings_are_listed() {
        let out = render("/**\n * frob() - short\n */\nint frob(int a)\n{\n}\n");
        assert!(out.contains("\"kind\": \"undocumented member\""));
        assert!(out.contains("no description found for parameter 'a'"));
    }

    #[test]
    fn member_tree_nests() {
        let out = render(
            "/**\n * struct s - short\n * @u.a: inner\n */\nstruct s {\n\tunion {\n\t\tint a;\n\t} u;\n};\n",
        );
        assert!(out.contains("\"path\": \"u\""));
        assert!(out.contains("\"children\": ["));
        assert!(out.contains("\"path\": \"u.a\""));
    }

    #[test]
    fn escapes_quotes_and_newlines() {
        assert_eq!(json_escape("a\"b\nc\\d"), "a\\\"b\\nc\\\\d");
    }
}
