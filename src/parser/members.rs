//! Member resolver — matches the declared members of an aggregate against
//! the `@name:` entries of its comment, builds the dotted member tree, and
//! reports what is undocumented or stale.

use crate::model::{
    Declaration, DocItem, MemberNode, MemberToken, RecordKind, Visibility, Warning, WarningKind,
};

#[derive(Debug, Default)]
pub struct Resolution {
    pub members: Vec<MemberNode>,
    pub warnings: Vec<Warning>,
}

/// Build the member tree for a struct or union declaration and check it
/// against the documented entries.
pub fn resolve_members(decl: &Declaration, items: &[DocItem]) -> Resolution {
    let mut res = Resolution::default();
    res.members = build_level(&decl.members, "", items);

    let mut paths = Vec::new();
    collect_paths(&res.members, &mut paths);

    for node in flatten(&res.members) {
        if !node.documented && !node.private {
            res.warnings.push(Warning::new(
                WarningKind::UndocumentedMember,
                decl.line,
                format!(
                    "no description found for member '{}' in {} '{}'",
                    node.path, decl.kind, decl.name
                ),
            ));
        }
    }

    for item in items {
        if !paths.iter().any(|p| p == &item.name) {
            res.warnings.push(Warning::new(
                WarningKind::StaleDescription,
                item.line,
                format!(
                    "excess member '{}' description in {} '{}'",
                    item.name, decl.kind, decl.name
                ),
            ));
        }
    }

    res
}

/// One nesting level. Region markers set the visibility of the members that
/// follow them; anonymous aggregates are transparent and contribute their
/// members directly, without a path component.
fn build_level(tokens: &[MemberToken], prefix: &str, items: &[DocItem]) -> Vec<MemberNode> {
    let mut nodes = Vec::new();
    let mut visibility = Visibility::Public;

    for token in tokens {
        match token {
            MemberToken::Region(v) => visibility = *v,
            MemberToken::Field { name } => {
                let path = join_path(prefix, name);
                nodes.push(MemberNode {
                    name: name.clone(),
                    documented: items.iter().any(|i| i.name == path),
                    private: visibility == Visibility::Private,
                    path,
                    children: Vec::new(),
                });
            }
            MemberToken::Nested { name: Some(name), members } => {
                let path = join_path(prefix, name);
                let children = build_level(members, &path, items);
                nodes.push(MemberNode {
                    name: name.clone(),
                    documented: items.iter().any(|i| i.name == path),
                    private: visibility == Visibility::Private,
                    path,
                    children,
                });
            }
            MemberToken::Nested { name: None, members } => {
                let mut children = build_level(members, prefix, items);
                if visibility == Visibility::Private {
                    for child in &mut children {
                        child.private = true;
                    }
                }
                nodes.extend(children);
            }
        }
    }
    nodes
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn collect_paths(nodes: &[MemberNode], out: &mut Vec<String>) {
    for node in nodes {
        out.push(node.path.clone());
        collect_paths(&node.children, out);
    }
}

fn flatten(nodes: &[MemberNode]) -> Vec<&MemberNode> {
    let mut out = Vec::new();
    for node in nodes {
        out.push(node);
        out.extend(flatten(&node.children));
    }
    out
}

/// Check the parameter names of a function, typedef or enum against the
/// documented entries. An ellipsis never demands a description.
pub fn check_parameters(decl: &Declaration, items: &[DocItem]) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for param in &decl.params {
        if param == "..." {
            continue;
        }
        if !items.iter().any(|i| i.name == *param) {
            let message = match decl.kind {
                RecordKind::Enum => format!(
                    "enum value '{}' not described in enum '{}'",
                    param, decl.name
                ),
                _ => format!(
                    "no description found for parameter '{}' of '{}'",
                    param, decl.name
                ),
            };
            warnings.push(Warning::new(
                WarningKind::UndocumentedMember,
                decl.line,
                message,
            ));
        }
    }

    for item in items {
        if item.name == "..." && decl.params.iter().any(|p| p == "...") {
            continue;
        }
        if !decl.params.iter().any(|p| p == &item.name) {
            let what = match decl.kind {
                RecordKind::Enum => "enum value",
                _ => "function parameter",
            };
            warnings.push(Warning::new(
                WarningKind::StaleDescription,
                item.line,
                format!(
                    "excess {} '{}' description in '{}'",
                    what, item.name, decl.name
                ),
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> DocItem {
        DocItem {
            name: name.to_string(),
            text: format!("about {name}"),
            line: 5,
        }
    }

    fn decl(kind: RecordKind, members: Vec<MemberToken>) -> Declaration {
        Declaration {
            kind,
            name: "subject".to_string(),
            params: Vec::new(),
            members,
            line: 42,
        }
    }

    #[test]
    fn flat_members_resolve() {
        let d = decl(
            RecordKind::Struct,
            vec![
                MemberToken::Field { name: "a".into() },
                MemberToken::Field { name: "b".into() },
            ],
        );
        let res = resolve_members(&d, &[item("a"), item("b")]);
        assert!(res.warnings.is_empty());
        assert!(res.members.iter().all(|m| m.documented));
    }

    #[test]
    fn undocumented_member_warns() {
        let d = decl(RecordKind::Struct, vec![MemberToken::Field { name: "a".into() }]);
        let res = resolve_members(&d, &[]);
        assert_eq!(res.warnings.len(), 1);
        assert_eq!(res.warnings[0].kind, WarningKind::UndocumentedMember);
        assert!(res.warnings[0].message.contains("'a'"));
    }

    #[test]
    fn private_members_are_exempt() {
        let d = decl(
            RecordKind::Struct,
            vec![
                MemberToken::Region(Visibility::Private),
                MemberToken::Field { name: "hidden".into() },
                MemberToken::Region(Visibility::Public),
                MemberToken::Field { name: "shown".into() },
            ],
        );
        let res = resolve_members(&d, &[item("shown")]);
        assert!(res.warnings.is_empty());
        assert!(res.members.iter().find(|m| m.name == "hidden").unwrap().private);
    }

    #[test]
    fn named_nested_members_use_dotted_paths() {
        let d = decl(
            RecordKind::Union,
            vec![MemberToken::Nested {
                name: Some("st2".into()),
                members: vec![MemberToken::Field { name: "arg1".into() }],
            }],
        );
        let res = resolve_members(&d, &[item("st2"), item("st2.arg1")]);
        assert!(res.warnings.is_empty());
        assert_eq!(res.members[0].path, "st2");
        assert_eq!(res.members[0].children[0].path, "st2.arg1");
    }

    #[test]
    fn anonymous_nested_is_transparent() {
        let d = decl(
            RecordKind::Struct,
            vec![MemberToken::Nested {
                name: None,
                members: vec![
                    MemberToken::Field { name: "a".into() },
                    MemberToken::Field { name: "b".into() },
                ],
            }],
        );
        let res = resolve_members(&d, &[item("a"), item("b")]);
        assert!(res.warnings.is_empty());
        assert_eq!(res.members.len(), 2);
        assert_eq!(res.members[0].path, "a");
    }

    #[test]
    fn stale_member_description_warns() {
        let d = decl(RecordKind::Struct, vec![MemberToken::Field { name: "a".into() }]);
        let res = resolve_members(&d, &[item("a"), item("gone")]);
        assert_eq!(res.warnings.len(), 1);
        assert_eq!(res.warnings[0].kind, WarningKind::StaleDescription);
        assert!(res.warnings[0].message.contains("'gone'"));
    }

    #[test]
    fn function_parameters_checked() {
        let mut d = decl(RecordKind::Function, Vec::new());
        d.params = vec!["a".to_string(), "b".to_string()];
        let warnings = check_parameters(&d, &[item("a"), item("stale")]);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.kind == WarningKind::UndocumentedMember
            && w.message.contains("'b'")));
        assert!(warnings.iter().any(|w| w.kind == WarningKind::StaleDescription
            && w.message.contains("'stale'")));
    }

    #[test]
    fn ellipsis_never_demands_description() {
        let mut d = decl(RecordKind::Function, Vec::new());
        d.params = vec!["fmt".to_string(), "...".to_string()];
        let warnings = check_parameters(&d, &[item("fmt")]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn enum_values_checked_with_enum_wording() {
        let mut d = decl(RecordKind::Enum, Vec::new());
        d.params = vec!["F1".to_string(), "F2".to_string()];
        let warnings = check_parameters(&d, &[item("F1")]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("enum value 'F2'"));
    }
}
