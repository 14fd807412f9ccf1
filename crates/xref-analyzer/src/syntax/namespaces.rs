//! Cheap namespace tracking over raw tokens, without a parse.

use std::collections::{BTreeSet, HashMap};

use super::lexer::{TokenKind, significant_tokens};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceEvent {
    /// Entered a namespace; payload is the full enclosing path.
    Begin(String),
    /// Left a namespace; payload is the path now current.
    End(String),
    /// `using namespace X;` with `X` as written.
    UsingDirective(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Default,
    Namespace,
    NamespaceName,
    Using,
    UsingNamespace,
    UsingNamespaceName,
}

/// Lexes `code` and reports namespace boundaries and using-directives.
///
/// Anonymous namespaces open a brace but no namespace. Unbalanced closing
/// braces are ignored.
pub fn parse_namespace_events(
    code: &str,
    mut callback: impl FnMut(NamespaceEvent),
) {
    let mut enclosing: Vec<String> = Vec::new();
    let mut brace_stack: Vec<bool> = Vec::new();
    let mut state = ScanState::Default;
    let mut name = String::new();

    for (kind, span) in significant_tokens(code) {
        let text = &code[span];
        state = match kind {
            TokenKind::KwUsing => {
                if state == ScanState::Default {
                    ScanState::Using
                } else {
                    ScanState::Default
                }
            },
            TokenKind::KwNamespace => match state {
                ScanState::Using => ScanState::UsingNamespace,
                ScanState::Default => ScanState::Namespace,
                _ => ScanState::Default,
            },
            TokenKind::Identifier => match state {
                ScanState::UsingNamespace | ScanState::UsingNamespaceName => {
                    if state == ScanState::UsingNamespace {
                        name.clear();
                    }
                    name.push_str(text);
                    ScanState::UsingNamespaceName
                },
                ScanState::Namespace | ScanState::NamespaceName => {
                    if state == ScanState::Namespace {
                        name.clear();
                    }
                    name.push_str(text);
                    ScanState::NamespaceName
                },
                ScanState::Using | ScanState::Default => ScanState::Default,
            },
            TokenKind::ColonColon => match state {
                ScanState::UsingNamespace | ScanState::UsingNamespaceName => {
                    if state == ScanState::UsingNamespace {
                        name.clear();
                    }
                    name.push_str("::");
                    ScanState::UsingNamespaceName
                },
                ScanState::NamespaceName => {
                    name.push_str("::");
                    ScanState::NamespaceName
                },
                _ => ScanState::Default,
            },
            TokenKind::LBrace => {
                if state == ScanState::NamespaceName {
                    brace_stack.push(true);
                    enclosing.push(name.clone());
                    callback(NamespaceEvent::Begin(enclosing.join("::")));
                } else {
                    brace_stack.push(false);
                }
                ScanState::Default
            },
            TokenKind::RBrace => {
                if let Some(opened_namespace) = brace_stack.pop()
                    && opened_namespace
                {
                    enclosing.pop();
                    callback(NamespaceEvent::End(enclosing.join("::")));
                }
                state
            },
            TokenKind::Semi => {
                if state == ScanState::UsingNamespaceName {
                    callback(NamespaceEvent::UsingDirective(std::mem::take(&mut name)));
                }
                ScanState::Default
            },
            _ => ScanState::Default,
        };
    }
}

/// `"a::b"` -> `["", "a", "a::b"]`.
pub fn ancestor_namespaces(ns: &str) -> Vec<&str> {
    let mut out = vec![""];
    let mut end = 0;
    for part in ns.split("::") {
        if part.is_empty() {
            end += 2;
            continue;
        }
        let start = end + ns[end..].find(part).unwrap_or(0);
        end = start + part.len();
        out.push(&ns[..end]);
    }
    out
}

/// Namespaces visible at the end of `code`: the current one first, then every
/// enclosing namespace and using-directive target, sorted and deduplicated.
pub fn visible_namespaces(code: &str) -> Vec<String> {
    let mut current = String::new();
    let mut using_directives: HashMap<String, BTreeSet<String>> = HashMap::new();

    parse_namespace_events(code, |event| match event {
        NamespaceEvent::Begin(ns) | NamespaceEvent::End(ns) => current = ns,
        NamespaceEvent::UsingDirective(ns) => {
            let used = using_directives.entry(current.clone()).or_default();
            if let Some(absolute) = ns.strip_prefix("::") {
                used.insert(absolute.to_owned());
            } else {
                for enclosing in ancestor_namespaces(&current) {
                    if enclosing.is_empty() {
                        used.insert(ns.clone());
                    } else {
                        used.insert(format!("{enclosing}::{ns}"));
                    }
                }
            }
        },
    });

    let mut found: Vec<String> = Vec::new();
    for enclosing in ancestor_namespaces(&current) {
        found.push(enclosing.to_owned());
        if let Some(used) = using_directives.get(enclosing) {
            found.extend(used.iter().cloned());
        }
    }

    found.sort_by(|lhs, rhs| {
        let lhs_current = *lhs == current;
        let rhs_current = *rhs == current;
        rhs_current.cmp(&lhs_current).then_with(|| lhs.cmp(rhs))
    });
    found.dedup();
    found
}

#[cfg(test)]
#[path = "../../tests/src/syntax/namespaces_tests.rs"]
mod tests;
