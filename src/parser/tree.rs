//! Indentation-aware tokenization of a raw WHOIS reply into a labeled tree.

use super::schema::LEGAL_MENTIONS;

const TAB_WIDTH: usize = 4;

/// Top-level sentinel separating visually grouped blocks of nodes.
pub const SECTION_BREAK: &str = "SECTION_BREAK";

/// A child is either a nested labeled node or a bare continuation line
/// belonging to the enclosing node's value. The two must stay
/// distinguishable all the way through normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Node(Node),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub label: String,
    pub value: Option<String>,
    pub indent: usize,
    pub children: Vec<Child>,
}

impl Node {
    fn new(label: impl Into<String>, indent: usize, value: Option<String>) -> Self {
        Self {
            label: label.into(),
            value,
            indent,
            children: Vec::new(),
        }
    }

    fn section_break() -> Self {
        Self::new(SECTION_BREAK, 0, None)
    }
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut col = 0usize;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_WIDTH - (col % TAB_WIDTH);
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(ch);
            col += 1;
        }
    }
    out
}

fn normalize_indent(line: &str) -> (usize, String) {
    let expanded = expand_tabs(line);
    let stripped = expanded.trim_start_matches(' ');
    let indent = expanded.len() - stripped.len();
    (indent, stripped.to_string())
}

fn is_comment(line: &str) -> bool {
    matches!(line.trim_start().chars().next(), Some('%') | Some('>'))
}

fn has_legal_mention(line: &str) -> bool {
    let lower = line.to_lowercase();
    LEGAL_MENTIONS.iter().any(|m| lower.contains(&m.to_lowercase()))
}

fn clean_label(label: &str) -> String {
    label.trim_end_matches('.').trim().to_string()
}

/// Split a content line into `(label, value)`. Returns `None` when the line
/// is a continuation of the enclosing node's value.
///
/// A `label: value` split is accepted only when the label side is non-empty
/// and the right side is empty or starts with a space; this keeps URLs and
/// clock times (`12:34`) out of the label namespace.
fn split_label_value(content: &str) -> Option<(String, Option<String>)> {
    if content.starts_with('[') {
        if let Some(end) = content.find(']') {
            let label = content[1..end].trim().to_string();
            let value = content[end + 1..].trim();
            let value = (!value.is_empty()).then(|| value.to_string());
            return Some((label, value));
        }
    }

    let (label, rest) = content.split_once(':')?;

    if label.trim().is_empty() {
        return None;
    }

    if rest.is_empty() || rest.starts_with(' ') {
        let value = rest.trim();
        let value = (!value.is_empty()).then(|| value.to_string());
        return Some((clean_label(label), value));
    }

    None
}

fn close_one(stack: &mut Vec<Node>, root: &mut Vec<Node>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(Child::Node(node)),
            None => root.push(node),
        }
    }
}

fn close_all(stack: &mut Vec<Node>, root: &mut Vec<Node>) {
    while !stack.is_empty() {
        close_one(stack, root);
    }
}

/// Parse raw reply text into an ordered list of top-level nodes.
pub fn parse_tree(text: &str) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Node> = Vec::new();

    for raw_line in text.lines() {
        if is_comment(raw_line) || has_legal_mention(raw_line) {
            continue;
        }

        let (indent, content) = normalize_indent(raw_line);

        if content.trim().is_empty() {
            close_all(&mut stack, &mut root);
            if root.last().is_some_and(|n| n.label != SECTION_BREAK) {
                root.push(Node::section_break());
            }
            continue;
        }

        match split_label_value(&content) {
            Some((label, value)) => {
                while stack.last().is_some_and(|top| indent <= top.indent) {
                    close_one(&mut stack, &mut root);
                }
                stack.push(Node::new(label, indent, value));
            }
            None => {
                while stack.last().is_some_and(|top| indent < top.indent) {
                    close_one(&mut stack, &mut root);
                }
                match stack.last_mut() {
                    Some(top) => top.children.push(Child::Text(content)),
                    None => root.push(Node::new(content, indent, None)),
                }
            }
        }
    }

    close_all(&mut stack, &mut root);
    root
}
