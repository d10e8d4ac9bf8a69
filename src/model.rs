//! Data model for extracted documentation — format-agnostic.

use std::fmt;

/// Markup interpretation rules active while a comment is parsed.
///
/// Switched per source unit by a `/* parse-markup: ... */` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Vintage kernel-doc: plain text, reST-significant characters are masked.
    KernelDoc,
    /// reST passthrough: everything but the highlight patterns is kept verbatim.
    #[default]
    Rest,
}

impl Dialect {
    pub fn from_name(name: &str) -> Option<Dialect> {
        match name {
            "kernel-doc" => Some(Dialect::KernelDoc),
            "reST" => Some(Dialect::Rest),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::KernelDoc => write!(f, "kernel-doc"),
            Dialect::Rest => write!(f, "reST"),
        }
    }
}

/// Kind of a documented declaration or record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordKind {
    #[default]
    Function,
    Struct,
    Union,
    Enum,
    Typedef,
    /// Free-standing `DOC:` section, not attached to a declaration.
    Doc,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Function => "function",
            RecordKind::Struct => "struct",
            RecordKind::Union => "union",
            RecordKind::Enum => "enum",
            RecordKind::Typedef => "typedef",
            RecordKind::Doc => "DOC",
        };
        write!(f, "{s}")
    }
}

/// A documentation comment block as found in the source.
#[derive(Debug)]
pub struct CommentBlock {
    /// Raw inner lines, without the opening `/**` and closing `*/`.
    pub lines: Vec<String>,
    /// Dialect in effect when the block was scanned.
    pub dialect: Dialect,
    /// 1-based line of the opening delimiter.
    pub start_line: usize,
    /// 1-based line of the closing delimiter.
    pub end_line: usize,
}

/// Region marker state inside an aggregate body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// One member-position token of an aggregate declaration.
#[derive(Debug, PartialEq, Eq)]
pub enum MemberToken {
    /// Plain field, bitfield, array or function-pointer member.
    Field { name: String },
    /// Nested struct/union; `name` is `None` for anonymous aggregates.
    Nested {
        name: Option<String>,
        members: Vec<MemberToken>,
    },
    /// `/* private: */` or `/* public: */` among the following siblings.
    Region(Visibility),
}

/// Declaration skeleton paired with a comment block.
#[derive(Debug)]
pub struct Declaration {
    pub kind: RecordKind,
    pub name: String,
    /// Parameter names for functions, enumerator names for enums.
    pub params: Vec<String>,
    /// Member tokens for structs and unions.
    pub members: Vec<MemberToken>,
    pub line: usize,
}

/// A documented item: `@name: text`, name may be a dotted path or `...`.
#[derive(Debug)]
pub struct DocItem {
    pub name: String,
    pub text: String,
    pub line: usize,
}

/// A named special section (`Context`, `Return`, `Example`, or custom).
#[derive(Debug)]
pub struct Section {
    pub name: String,
    pub text: String,
    /// 1-based line of the section's first content line.
    pub line: usize,
}

/// Node in the resolved member tree of an aggregate.
#[derive(Debug)]
pub struct MemberNode {
    /// Last path segment.
    pub name: String,
    /// Full dotted path, e.g. `bar.st1.arg1`.
    pub path: String,
    pub documented: bool,
    pub private: bool,
    pub children: Vec<MemberNode>,
}

/// Parsed result for one comment block, enriched with declaration data.
#[derive(Debug, Default)]
pub struct DocRecord {
    pub kind: RecordKind,
    pub name: String,
    pub dialect: Dialect,
    /// Short description from the `name - description` title line.
    pub short: Option<String>,
    /// Long description, one entry per line; an empty entry separates
    /// paragraphs.
    pub description: Vec<String>,
    /// 1-based line where the long description starts.
    pub description_line: usize,
    /// `@name:` entries in source order.
    pub items: Vec<DocItem>,
    pub sections: Vec<Section>,
    /// Declared parameter names (functions, enums).
    pub params: Vec<String>,
    /// Resolved member tree (structs, unions).
    pub members: Vec<MemberNode>,
    pub line: usize,
}

impl DocRecord {
    /// Description text for a documented name, if any.
    pub fn item(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.text.as_str())
    }

    /// Section text by name, if any.
    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.text.as_str())
    }
}

/// Classified reason of a recoverable diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    UndocumentedMember,
    StaleDescription,
    SnippetLabelMismatch,
    SnippetReplaced,
    MissingSubject,
    AmbiguousMarkup,
    NameMismatch,
    MissingShortDescription,
    DuplicateDescription,
    BadLine,
    UnknownDirective,
}

impl WarningKind {
    pub fn label(self) -> &'static str {
        match self {
            WarningKind::UndocumentedMember => "undocumented member",
            WarningKind::StaleDescription => "stale description",
            WarningKind::SnippetLabelMismatch => "snippet label mismatch",
            WarningKind::SnippetReplaced => "snippet replaced",
            WarningKind::MissingSubject => "doc comment without subject",
            WarningKind::AmbiguousMarkup => "ambiguous markup",
            WarningKind::NameMismatch => "name mismatch",
            WarningKind::MissingShortDescription => "missing short description",
            WarningKind::DuplicateDescription => "duplicate description",
            WarningKind::BadLine => "bad line",
            WarningKind::UnknownDirective => "unknown directive",
        }
    }
}

/// Recoverable diagnostic, attached to the unit's output.
#[derive(Debug)]
pub struct Warning {
    pub kind: WarningKind,
    /// 1-based source line.
    pub line: usize,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, line: usize, message: impl Into<String>) -> Warning {
        Warning {
            kind,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

/// Complete parsed output of a single source unit.
#[derive(Debug, Default)]
pub struct Document {
    /// File identifier handed in by the caller.
    pub file: String,
    pub records: Vec<DocRecord>,
    pub warnings: Vec<Warning>,
}

/// A delimited source span extracted by the snippet scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub label: String,
    /// 1-based line of the first extracted line.
    pub start_line: usize,
    /// 1-based line of the last extracted line.
    pub end_line: usize,
    pub text: String,
}
