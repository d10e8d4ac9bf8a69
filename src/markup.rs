//! Markup translator — rewrites the cross-reference shorthand of comment
//! text into reST.
//!
//! `&struct foo`, `bar()`, `@param`, `%CONST` and `$ENV` become Sphinx
//! roles or inline literals. The rewrite table is order-sensitive since the
//! patterns overlap. Text inside literal blocks (after `::` or a
//! `.. code-block::` directive) passes through untouched. The vintage
//! dialect additionally masks characters that reST treats as inline markup.

use crate::model::{Dialect, Warning, WarningKind};
use regex::Regex;
use std::sync::LazyLock;

// The original shorthand only counts when preceded by whitespace. The
// regex engine has no lookbehind, so every pattern captures the leading
// whitespace and each row is mapped with a temporary leading space.
type MapTable = Vec<(Regex, &'static str)>;

static REST_MAP: LazyLock<MapTable> = LazyLock::new(|| {
    // partially overlapping patterns, mind the order
    vec![
        (
            Regex::new(r"(\s)&(enum)\s*([_\w]+)").unwrap(),
            r"${1}\ :c:type:`${2} ${3} <${3}>`\ ",
        ),
        (
            Regex::new(r"(\s)&(struct)\s*([_\w]+)").unwrap(),
            r"${1}\ :c:type:`${2} ${3} <${3}>`\ ",
        ),
        (
            Regex::new(r"(\s)&(typedef)\s*([_\w]+)").unwrap(),
            r"${1}\ :c:type:`${2} ${3} <${3}>`\ ",
        ),
        (
            Regex::new(r"(\s)&(union)\s*([_\w]+)").unwrap(),
            r"${1}\ :c:type:`${2} ${3} <${3}>`\ ",
        ),
        (
            Regex::new(r"(\s)&([_\w]+)((?:\.|->)[_\w]+)\(\)").unwrap(),
            r"${1}\ :c:type:`${2}${3}() <${2}>`\ ",
        ),
        (
            Regex::new(r"(\s)&([_\w]+)((?:\.|->)[_\w]+)").unwrap(),
            r"${1}\ :c:type:`${2}${3} <${2}>`\ ",
        ),
        (
            Regex::new(r"(\s)(\w+)\(\)").unwrap(),
            r"${1}\ :c:func:`${2}`\ ",
        ),
        (
            Regex::new(r"(\s)%([-_\w]+)").unwrap(),
            r"${1}\ ``${2}``\ ",
        ),
        (
            Regex::new(r"(\s)@(\w*(?:(?:\.\w+)|(?:->\w+))*(?:\.\.\.)?)").unwrap(),
            r"${1}\ ``${2}``\ ",
        ),
        (
            Regex::new(r"(\s)(\$\w+)").unwrap(),
            r"${1}\ ``${2}``\ ",
        ),
        (
            Regex::new(r"(\s)&((?:struct\s*)*[_\w]+)").unwrap(),
            r"${1}\ :c:type:`struct ${2} <${2}>`\ ",
        ),
        // replace escaped @, %, & and $ at least
        (Regex::new(r"\\([@%&$(])").unwrap(), r"${1}"),
    ]
});

// Vintage comments carry characters that reST reads as inline markup.
static MASK_REST_INLINES: LazyLock<MapTable> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(\w)_([\s*])").unwrap(), r"${1}\_${2}"), // trailing underline
        (Regex::new(r"([\s*])_(\w)").unwrap(), r"${1}\_${2}"), // leading underline
        (Regex::new(r"(\*)").unwrap(), r"\$1"),                // emphasis
        (Regex::new(r"(`)").unwrap(), r"\$1"),                 // inline literals
        (Regex::new(r"(\|)").unwrap(), r"\$1"),                // substitution refs
    ]
});

static RE_CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\. +code-block ?::( +|$)").unwrap());

static RE_INDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)\S").unwrap());

// a "&struct" reference cut off before its type name
static RE_DANGLING_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|\s)&(struct|union|enum|typedef)\s*$").unwrap());

/// Rewrite the shorthand of one section text for the given source dialect.
pub fn highlight(text: &str, dialect: Dialect) -> String {
    let mut tables: Vec<&MapTable> = Vec::new();
    if dialect == Dialect::KernelDoc {
        tables.push(&MASK_REST_INLINES);
    }
    tables.push(&REST_MAP);

    let mut out: Vec<String> = Vec::new();
    let mut rows: std::collections::VecDeque<&str> = text.lines().collect();
    let mut literal = false;
    let mut block_indent = 0usize;

    while let Some(row) = rows.pop_front() {
        if row.trim().is_empty() {
            out.push(row.to_string());
            continue;
        }
        let indent = RE_INDENT
            .captures(row)
            .map(|c| expanded_width(&c[1]))
            .unwrap_or(0);

        if literal {
            if indent < block_indent {
                literal = false;
                rows.push_front(row);
                continue;
            }
            out.push(row.to_string());
            continue;
        }

        out.push(map_row(row, &tables));
        if opens_literal_block(row) || RE_CODE_BLOCK.is_match(row) {
            literal = true;
            block_indent = 1;
        }
    }
    out.join("\n")
}

fn map_row(row: &str, tables: &[&MapTable]) -> String {
    // leading space stands in for start-of-line whitespace context
    let mut row = format!(" {row}");
    // a reference cut off before its type name stays literal
    row = RE_DANGLING_REF
        .replace(&row, "${1}\u{1}${2}")
        .into_owned();
    for table in tables {
        for (re, substitute) in table.iter() {
            row = re.replace_all(&row, *substitute).into_owned();
        }
    }
    row = row.replace('\u{1}', "&");
    row[1..].to_string()
}

/// Does the row end in an unescaped `::` opening a literal block?
fn opens_literal_block(row: &str) -> bool {
    let Some(head) = row.strip_suffix("::") else {
        return false;
    };
    head.chars().rev().take_while(|c| *c == '\\').count() % 2 == 0
}

fn expanded_width(ws: &str) -> usize {
    let mut col = 0;
    for c in ws.chars() {
        if c == '\t' {
            col += 8 - col % 8;
        } else {
            col += 1;
        }
    }
    col
}

/// Report cross-references that name a type keyword with nothing after it.
pub fn check(text: &str, line: usize) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for (i, row) in text.lines().enumerate() {
        if let Some(caps) = RE_DANGLING_REF.captures(row) {
            warnings.push(Warning::new(
                WarningKind::AmbiguousMarkup,
                line + i,
                format!("no type name after '&{}' reference", &caps[2]),
            ));
        }
    }
    warnings
}
