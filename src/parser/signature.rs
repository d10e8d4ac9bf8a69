//! Signature associator — pairs a documentation comment with the next
//! declaration in the source.
//!
//! Starting right after a comment block, skips blank lines and decorator
//! macros, then classifies the following construct: a function prototype, a
//! `#define`, a wrapper macro (export / syscall / tracepoint), or a
//! struct/union/enum/typedef definition. Aggregate bodies are scanned with
//! balanced braces and tokenized into member tokens, including nested
//! anonymous aggregates, bitfields, function pointers and region markers.

use crate::model::{Declaration, DocItem, MemberToken, RecordKind, Visibility, Warning, WarningKind};
use crate::parser::scan::is_directive;
use anyhow::{bail, Result};
use regex::Regex;
use std::sync::LazyLock;

static RE_BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*$").unwrap());

// Bare attribute-like tokens that may decorate a following declaration.
static RE_DECORATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[A-Z][A-Z0-9_]*\s*$").unwrap());

static RE_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*EXPORT_SYMBOL(?:_NS)?(?:_GPL)?(?:_FUTURE)?\s*\(\s*(\w+)\s*\)\s*;?\s*$")
        .unwrap()
});

static RE_AGGREGATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(struct|union|enum)\s+(\w+)").unwrap());

static RE_TYPEDEF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*typedef\b").unwrap());

static RE_SYSCALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*SYSCALL_DEFINE(\d)\s*\(").unwrap());

static RE_TRACE_EVENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*TRACE_EVENT\s*\(\s*(\w+)").unwrap());

static RE_DEFINE_EVENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*DEFINE_EVENT\s*\(\s*\w+\s*,\s*(\w+)").unwrap());

static RE_TP_PROTO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"TP_PROTO\s*\((.*?)\)\s*,").unwrap());

static RE_MACRO_DEFINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s*define\s+(\w+)(\()?").unwrap());

static RE_C99_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//.*$").unwrap());

static RE_C89_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/\*.*?\*/").unwrap());

static RE_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\*\s*(private|public):\s*\*/").unwrap());

static RE_INLINE_ONELINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*/\*\*\s*@([\w.]+):\s*(.*?)\s*\*/\s*$").unwrap());

static RE_INLINE_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*/\*\*\s*$").unwrap());

static RE_INLINE_SECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\*\s*@([\w.]+):\s*(.*)$").unwrap());

static RE_INLINE_CONT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\*\s?(.*)$").unwrap());

// Storage classes and attribute noise stripped from prototypes.
static RE_PROTO_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:static|extern|asmlinkage|inline|__inline__|__inline|__always_inline|noinline|__init|__init_or_module|__meminit|__must_check|__weak)\s+",
    )
    .unwrap()
});

static RE_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__attribute__\s*\(\((?:[\w\s]+(?:\([^)]*\))?\s*,?)+\)\)\s*").unwrap());

static RE_PROTO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w\s*]*?)\s*\b([a-zA-Z0-9_]+)\s*\((.*)\)\s*$").unwrap());

static RE_FUNC_PTR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*\*?\s*([\w.]+)\s*\)\s*\(").unwrap());

static RE_MEMBER_MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z_][A-Z0-9_]*)\s*\(\s*(\w+)").unwrap());

static RE_FUNC_TYPEDEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"typedef((?:\s+[\w*]+\b){1,8})\s*\(\s*\*?\s*(\w\S*?)\s*\)\s*\((.*)\)\s*;").unwrap()
});

static RE_PLAIN_TYPEDEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"typedef.*\s+(\w+)\s*;").unwrap());

/// Outcome of the forward scan after one comment block.
#[derive(Debug, Default)]
pub struct Associated {
    pub decl: Option<Declaration>,
    /// `@name:` entries from inline doc comments found inside the body.
    pub inline_docs: Vec<DocItem>,
    pub warnings: Vec<Warning>,
}

/// Find the declaration following a comment block that ends before
/// `lines[start]`. Line numbers in the result are 1-based.
pub fn associate(lines: &[String], start: usize) -> Result<Associated> {
    let mut out = Associated::default();
    let mut i = start;
    let mut exported: Option<(String, usize)> = None;

    // skip blanks, snippet/markup directives and decorator macros
    while i < lines.len() {
        let line = &lines[i];
        if RE_BLANK.is_match(line) || is_directive(line.trim()) {
            i += 1;
        } else if let Some(caps) = RE_EXPORT.captures(line) {
            exported = Some((caps[1].to_string(), i + 1));
            i += 1;
        } else if RE_DECORATOR.is_match(line) {
            i += 1;
        } else {
            break;
        }
    }

    if i >= lines.len() || RE_INLINE_START.is_match(&lines[i]) {
        // end of unit, or the next doc comment starts with no subject between
        if let Some((name, line)) = exported {
            out.decl = Some(Declaration {
                kind: RecordKind::Function,
                name,
                params: Vec::new(),
                members: Vec::new(),
                line,
            });
        }
        return Ok(out);
    }

    let line = &lines[i];

    if let Some(caps) = RE_AGGREGATE.captures(line) {
        let kind = match &caps[1] {
            "struct" => RecordKind::Struct,
            "union" => RecordKind::Union,
            _ => RecordKind::Enum,
        };
        let name = caps[2].to_string();
        return parse_aggregate(lines, i, kind, name, out);
    }

    if RE_TYPEDEF.is_match(line) {
        return parse_typedef(lines, i, out);
    }

    if let Some(caps) = RE_SYSCALL.captures(line) {
        let nargs: usize = caps[1].parse().unwrap_or(0);
        return parse_syscall(lines, i, nargs, out);
    }

    if RE_TRACE_EVENT.is_match(line) || RE_DEFINE_EVENT.is_match(line) {
        return parse_tracepoint(lines, i, out);
    }

    if let Some(caps) = RE_MACRO_DEFINE.captures(line) {
        let name = caps[1].to_string();
        // macro parameters are bare names, no declarators to reduce
        let params = if caps.get(2).is_some() {
            let text = collect_call(lines, i)?;
            call_arguments(&text)
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        } else {
            Vec::new()
        };
        out.decl = Some(Declaration {
            kind: RecordKind::Function,
            name,
            params,
            members: Vec::new(),
            line: i + 1,
        });
        return Ok(out);
    }

    parse_function(lines, i, exported, out)
}

// -- function prototypes ------------------------------------------------------

fn parse_function(
    lines: &[String],
    start: usize,
    exported: Option<(String, usize)>,
    mut out: Associated,
) -> Result<Associated> {
    let mut proto = String::new();
    let mut i = start;
    let mut terminated = false;

    while i < lines.len() {
        let line = RE_C99_COMMENT.replace(&lines[i], "");
        let line = line.trim();
        if RE_INLINE_START.is_match(&lines[i]) {
            break;
        }
        if let Some(pos) = line.find(['{', ';']) {
            proto.push(' ');
            proto.push_str(&line[..pos]);
            terminated = true;
            break;
        }
        proto.push(' ');
        proto.push_str(line);
        i += 1;
    }

    if !terminated {
        // retained export macro is the only remaining subject
        if let Some((name, line)) = exported {
            out.decl = Some(Declaration {
                kind: RecordKind::Function,
                name,
                params: Vec::new(),
                members: Vec::new(),
                line,
            });
        }
        return Ok(out);
    }

    let proto = normalize_ws(&RE_C89_COMMENT.replace_all(&proto, " "));
    let proto = RE_PROTO_NOISE.replace_all(&proto, "");
    let proto = RE_ATTRIBUTE.replace_all(&proto, "");

    if let Some(caps) = RE_PROTO.captures(proto.trim()) {
        let name = caps[2].to_string();
        let params = split_parameters(&caps[3], &mut out, start + 1);
        out.decl = Some(Declaration {
            kind: RecordKind::Function,
            name,
            params,
            members: Vec::new(),
            line: start + 1,
        });
    } else {
        out.warnings.push(Warning::new(
            WarningKind::BadLine,
            start + 1,
            format!("cannot understand function prototype: '{}'", proto.trim()),
        ));
    }
    Ok(out)
}

/// Split a parameter list on top-level commas and reduce each parameter to
/// its name. An ellipsis stays as `...`; `void` and empty lists vanish.
fn split_parameters(args: &str, out: &mut Associated, line: usize) -> Vec<String> {
    let mut params = Vec::new();
    for part in split_top_level(args, ',') {
        let part = normalize_ws(&part);
        if part.is_empty() || part == "void" {
            continue;
        }
        if part.ends_with("...") {
            params.push("...".to_string());
            continue;
        }
        if let Some(caps) = RE_FUNC_PTR_NAME.captures(&part) {
            params.push(caps[1].to_string());
            continue;
        }
        match declarator_name(&part) {
            Some(name) => params.push(name),
            None => out.warnings.push(Warning::new(
                WarningKind::BadLine,
                line,
                format!("cannot understand parameter: '{part}'"),
            )),
        }
    }
    params
}

/// Extract the declared name from a `type name`-shaped token: strips
/// pointers, array suffixes and bitfield widths, keeps the last identifier.
fn declarator_name(token: &str) -> Option<String> {
    static RE_ARRAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
    static RE_BITFIELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*:\s*\d+\s*$").unwrap());
    static RE_IDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+)\s*$").unwrap());

    let token = RE_ARRAY.replace_all(token, "");
    let token = RE_BITFIELD.replace(&token, "");
    let token = token.trim_end_matches(['*', ' ']);
    // a lone word is a bare type (unnamed parameter or unnamed bitfield)
    if !token.trim().contains([' ', '*']) {
        return None;
    }
    RE_IDENT.captures(token).map(|c| c[1].to_string())
}

// -- wrapper macros -----------------------------------------------------------

/// Accumulate a macro call until its parentheses balance. Comments are
/// stripped per line so their text never skews the balance.
fn collect_call(lines: &[String], start: usize) -> Result<String> {
    let mut text = String::new();
    let mut depth = 0i32;
    let mut seen_open = false;
    for line in lines.iter().skip(start) {
        let line = RE_C99_COMMENT.replace(line, "");
        let line = RE_C89_COMMENT.replace_all(&line, " ");
        text.push(' ');
        text.push_str(line.trim_end().trim_end_matches('\\'));
        for c in line.chars() {
            match c {
                '(' => {
                    depth += 1;
                    seen_open = true;
                }
                ')' => depth -= 1,
                _ => {}
            }
        }
        if seen_open && depth == 0 {
            return Ok(normalize_ws(&text));
        }
    }
    bail!("unterminated macro call at line {}", start + 1);
}

/// Text between the first opening parenthesis and its matching close.
fn call_arguments(call: &str) -> String {
    let open = match call.find('(') {
        Some(p) => p,
        None => return String::new(),
    };
    let mut depth = 0i32;
    for (i, c) in call[open..].char_indices().map(|(i, c)| (i + open, c)) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return call[open + 1..i].to_string();
                }
            }
            _ => {}
        }
    }
    call[open + 1..].to_string()
}

fn parse_syscall(
    lines: &[String],
    start: usize,
    nargs: usize,
    mut out: Associated,
) -> Result<Associated> {
    let call = collect_call(lines, start)?;
    let args = call_arguments(&call);
    let mut parts = split_top_level(&args, ',').into_iter();
    let name = match parts.next() {
        Some(n) => format!("sys_{}", n.trim()),
        None => {
            out.warnings.push(Warning::new(
                WarningKind::BadLine,
                start + 1,
                "cannot understand syscall definition",
            ));
            return Ok(out);
        }
    };
    // remaining arguments alternate (type, name)
    let rest: Vec<String> = parts.map(|p| p.trim().to_string()).collect();
    let mut params = Vec::new();
    for pair in rest.chunks(2).take(nargs) {
        if let [_, name] = pair {
            params.push(name.clone());
        }
    }
    out.decl = Some(Declaration {
        kind: RecordKind::Function,
        name,
        params,
        members: Vec::new(),
        line: start + 1,
    });
    Ok(out)
}

fn parse_tracepoint(lines: &[String], start: usize, mut out: Associated) -> Result<Associated> {
    let call = collect_call(lines, start)?;
    let name = RE_TRACE_EVENT
        .captures(&call)
        .or_else(|| RE_DEFINE_EVENT.captures(&call))
        .map(|c| c[1].to_string());
    let proto = RE_TP_PROTO.captures(&call).map(|c| c[1].to_string());
    match (name, proto) {
        (Some(name), Some(proto)) => {
            let params = split_parameters(&proto, &mut out, start + 1);
            out.decl = Some(Declaration {
                kind: RecordKind::Function,
                name: format!("trace_{name}"),
                params,
                members: Vec::new(),
                line: start + 1,
            });
        }
        _ => out.warnings.push(Warning::new(
            WarningKind::BadLine,
            start + 1,
            "unrecognized tracepoint format",
        )),
    }
    Ok(out)
}

// -- aggregates ---------------------------------------------------------------

fn parse_aggregate(
    lines: &[String],
    start: usize,
    kind: RecordKind,
    name: String,
    mut out: Associated,
) -> Result<Associated> {
    let body = collect_aggregate_body(lines, start, kind, &mut out)?;

    match kind {
        RecordKind::Enum => {
            let params = enum_members(&body);
            out.decl = Some(Declaration {
                kind,
                name,
                params,
                members: Vec::new(),
                line: start + 1,
            });
        }
        _ => {
            let members = parse_aggregate_members(&body);
            out.decl = Some(Declaration {
                kind,
                name,
                params: Vec::new(),
                members,
                line: start + 1,
            });
        }
    }
    Ok(out)
}

/// Collect the flattened text between the outer braces of an aggregate
/// definition, removing inline doc comments (collected as `inline_docs`)
/// and keeping region markers as `private:;` / `public:;` statements.
fn collect_aggregate_body(
    lines: &[String],
    start: usize,
    kind: RecordKind,
    out: &mut Associated,
) -> Result<String> {
    let mut body = String::new();
    let mut depth = 0i32;
    let mut seen_open = false;
    let mut i = start;

    while i < lines.len() {
        let raw = &lines[i];

        // inline doc comments inside the body
        if seen_open {
            if let Some(caps) = RE_INLINE_ONELINE.captures(raw) {
                out.inline_docs.push(DocItem {
                    name: caps[1].to_string(),
                    text: caps[2].to_string(),
                    line: i + 1,
                });
                i += 1;
                continue;
            }
            if RE_INLINE_START.is_match(raw) {
                i = collect_inline_doc(lines, i, out);
                continue;
            }
        }

        let line = RE_C99_COMMENT.replace(raw, "");
        let line = RE_REGION.replace_all(&line, " $1:; ");
        let line = RE_C89_COMMENT.replace_all(&line, " ");

        for c in line.chars() {
            match c {
                '{' => {
                    depth += 1;
                    seen_open = true;
                    if depth == 1 {
                        continue;
                    }
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(normalize_ws(&body));
                    }
                }
                _ => {}
            }
            if seen_open && depth >= 1 {
                body.push(c);
            }
        }
        body.push(' ');
        i += 1;
    }

    bail!("unterminated {} body starting at line {}", kind, start + 1);
}

/// Consume a multi-line inline doc comment, returning the index after `*/`.
fn collect_inline_doc(lines: &[String], start: usize, out: &mut Associated) -> usize {
    let mut i = start + 1;
    let mut current: Option<DocItem> = None;
    while i < lines.len() {
        let line = &lines[i];
        if line.contains("*/") {
            i += 1;
            break;
        }
        if let Some(caps) = RE_INLINE_SECT.captures(line) {
            if let Some(item) = current.take() {
                out.inline_docs.push(item);
            }
            current = Some(DocItem {
                name: caps[1].to_string(),
                text: caps[2].trim().to_string(),
                line: i + 1,
            });
        } else if let Some(caps) = RE_INLINE_CONT.captures(line) {
            if let Some(ref mut item) = current {
                item.text.push('\n');
                item.text.push_str(caps[1].trim_end());
            }
        }
        i += 1;
    }
    if let Some(mut item) = current {
        item.text = item.text.trim().to_string();
        out.inline_docs.push(item);
    }
    i
}

/// Tokenize a flattened struct/union body into member tokens.
fn parse_aggregate_members(body: &str) -> Vec<MemberToken> {
    let mut members = Vec::new();

    for stmt in split_statements(body) {
        let stmt = normalize_ws(&stmt);
        if stmt.is_empty() {
            continue;
        }

        if stmt == "private:" {
            members.push(MemberToken::Region(Visibility::Private));
            continue;
        }
        if stmt == "public:" {
            members.push(MemberToken::Region(Visibility::Public));
            continue;
        }

        if let Some(open) = top_level_brace(&stmt) {
            // nested aggregate: `struct|union|enum [tag] { inner } declarators`
            let head = stmt[..open].trim();
            let close = matching_brace(&stmt, open);
            let inner = &stmt[open + 1..close];
            let tail = stmt[close + 1..].trim();

            if head.starts_with("enum") {
                // nested enums collapse to their declarator
                for decl in tail.split(',') {
                    if let Some(name) = trailing_ident(decl) {
                        members.push(MemberToken::Field { name });
                    }
                }
                continue;
            }

            let children = parse_aggregate_members(inner);
            if tail.is_empty() {
                members.push(MemberToken::Nested {
                    name: None,
                    members: children,
                });
            } else {
                for decl in tail.split(',') {
                    if let Some(name) = trailing_ident(decl) {
                        members.push(MemberToken::Nested {
                            name: Some(name),
                            members: clone_tokens(&children),
                        });
                    }
                }
            }
            continue;
        }

        if let Some(caps) = RE_FUNC_PTR_NAME.captures(&stmt) {
            members.push(MemberToken::Field {
                name: caps[1].to_string(),
            });
            continue;
        }

        if let Some(caps) = RE_MEMBER_MACRO.captures(&stmt) {
            // DECLARE_BITMAP(name, ...), DECLARE_KFIFO(name, ...) and kin
            members.push(MemberToken::Field {
                name: caps[2].to_string(),
            });
            continue;
        }

        // plain fields, possibly several declarators
        let mut parts = split_top_level(&stmt, ',').into_iter();
        let first = parts.next().unwrap_or_default();
        if let Some(name) = declarator_name(&first) {
            members.push(MemberToken::Field { name });
        }
        for decl in parts {
            if let Some(name) = trailing_ident(&decl) {
                members.push(MemberToken::Field { name });
            }
        }
    }

    members
}

fn clone_tokens(tokens: &[MemberToken]) -> Vec<MemberToken> {
    tokens
        .iter()
        .map(|t| match t {
            MemberToken::Field { name } => MemberToken::Field { name: name.clone() },
            MemberToken::Nested { name, members } => MemberToken::Nested {
                name: name.clone(),
                members: clone_tokens(members),
            },
            MemberToken::Region(v) => MemberToken::Region(*v),
        })
        .collect()
}

/// Enumerator names from a flattened enum body.
fn enum_members(body: &str) -> Vec<String> {
    let mut names = Vec::new();
    for part in body.split(',') {
        let part = part.trim();
        if part.is_empty() || part.starts_with('#') {
            continue;
        }
        if let Some(name) = part.split(['=', ' ']).next() {
            let name = name.trim();
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
    }
    names
}

// -- typedefs -----------------------------------------------------------------

fn parse_typedef(lines: &[String], start: usize, mut out: Associated) -> Result<Associated> {
    // accumulate until `;` at brace depth 0
    let mut text = String::new();
    let mut depth = 0i32;
    let mut done = false;
    for line in lines.iter().skip(start) {
        let line = RE_C99_COMMENT.replace(line, "");
        for c in line.chars() {
            text.push(c);
            match c {
                '{' => depth += 1,
                '}' => depth -= 1,
                ';' if depth == 0 => {
                    done = true;
                    break;
                }
                _ => {}
            }
        }
        if done {
            break;
        }
        text.push(' ');
    }
    if !done {
        bail!("unterminated typedef starting at line {}", start + 1);
    }

    let text = normalize_ws(&RE_C89_COMMENT.replace_all(&text, " "));

    if let Some(caps) = RE_FUNC_TYPEDEF.captures(&text) {
        let name = caps[2].trim_start_matches('*').to_string();
        let params = split_parameters(&caps[3], &mut out, start + 1);
        out.decl = Some(Declaration {
            kind: RecordKind::Typedef,
            name,
            params,
            members: Vec::new(),
            line: start + 1,
        });
        return Ok(out);
    }

    // drop brace groups (`typedef struct { ... } name;`) and call/array tails
    let mut flat = String::new();
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ if depth == 0 => flat.push(c),
            _ => {}
        }
    }
    static RE_TAILS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\(.*\)|\[.*\])\s*;").unwrap());
    let flat = RE_TAILS.replace_all(&flat, ";");
    let flat = normalize_ws(&flat);

    if let Some(caps) = RE_PLAIN_TYPEDEF.captures(&flat) {
        out.decl = Some(Declaration {
            kind: RecordKind::Typedef,
            name: caps[1].to_string(),
            params: Vec::new(),
            members: Vec::new(),
            line: start + 1,
        });
    } else {
        out.warnings.push(Warning::new(
            WarningKind::BadLine,
            start + 1,
            format!("cannot understand typedef: '{flat}'"),
        ));
    }
    Ok(out)
}

// -- small text helpers -------------------------------------------------------

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split on `sep` ignoring separators nested in parentheses or braces.
fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut cur = String::new();
    for c in s.chars() {
        match c {
            '(' | '{' | '[' => depth += 1,
            ')' | '}' | ']' => depth -= 1,
            _ => {}
        }
        if c == sep && depth == 0 {
            parts.push(std::mem::take(&mut cur));
        } else {
            cur.push(c);
        }
    }
    if !cur.trim().is_empty() {
        parts.push(cur);
    }
    parts
}

/// Split a flattened aggregate body into `;`-terminated statements,
/// keeping nested brace groups intact.
fn split_statements(body: &str) -> Vec<String> {
    let mut stmts = Vec::new();
    let mut depth = 0i32;
    let mut cur = String::new();
    for c in body.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            ';' if depth == 0 => {
                stmts.push(std::mem::take(&mut cur));
                continue;
            }
            _ => {}
        }
        cur.push(c);
    }
    if !cur.trim().is_empty() {
        stmts.push(cur);
    }
    stmts
}

fn top_level_brace(stmt: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in stmt.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            '{' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn matching_brace(stmt: &str, open: usize) -> usize {
    let mut depth = 0i32;
    for (i, c) in stmt[open..].char_indices().map(|(i, c)| (i + open, c)) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    stmt.len()
}

/// Last identifier of a declarator, with array/bitfield/pointer noise removed.
fn trailing_ident(decl: &str) -> Option<String> {
    static RE_NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[:\[].*").unwrap());
    static RE_IDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\w+)\s*$").unwrap());
    let decl = RE_NOISE.replace(decl, "");
    let decl = decl.replace('*', " ");
    RE_IDENT.captures(decl.trim()).map(|c| c[1].to_string())
}
