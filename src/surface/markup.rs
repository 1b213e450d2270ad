//! Tolerant markup parser feeding `Document::set_markup`.
//!
//! Handles the subset the views emit: elements with quoted, unquoted or bare
//! attributes, void and self-closing elements, comments, raw `<textarea>`
//! content and the common character entities. Unknown or mismatched closing
//! tags are ignored; elements left open at the end are closed implicitly.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "br", "col", "hr", "img", "input", "link", "meta", "source", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "script", "style"];

struct Open {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<MarkupNode>,
}

impl Open {
    fn close(self) -> MarkupNode {
        MarkupNode::Element {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

pub fn parse(markup: &str) -> Vec<MarkupNode> {
    let mut roots: Vec<MarkupNode> = Vec::new();
    let mut stack: Vec<Open> = Vec::new();
    let mut pos = 0;

    fn push(stack: &mut [Open], roots: &mut Vec<MarkupNode>, node: MarkupNode) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }

    while pos < markup.len() {
        let rest = &markup[pos..];
        if let Some(comment) = rest.strip_prefix("<!--") {
            pos += 4 + comment.find("-->").map_or(comment.len(), |end| end + 3);
            continue;
        }
        if let Some(after) = rest.strip_prefix("</")
            && after.starts_with(|c: char| c.is_ascii_alphabetic())
        {
            let end = after.find('>').unwrap_or(after.len());
            let name = after[..end].trim().to_ascii_lowercase();
            pos += 2 + (end + 1).min(after.len());
            if let Some(idx) = stack.iter().rposition(|open| open.tag == name) {
                while stack.len() > idx {
                    if let Some(open) = stack.pop() {
                        let node = open.close();
                        push(&mut stack, &mut roots, node);
                    }
                }
            }
            continue;
        }
        if rest.starts_with('<') && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            let (tag, attributes, self_closing, consumed) = parse_open_tag(&rest[1..]);
            pos += 1 + consumed;
            if VOID_ELEMENTS.contains(&tag.as_str()) || self_closing {
                push(
                    &mut stack,
                    &mut roots,
                    MarkupNode::Element {
                        tag,
                        attributes,
                        children: Vec::new(),
                    },
                );
                continue;
            }
            if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                let body = &markup[pos..];
                let closer = format!("</{tag}");
                let end = find_ignore_ascii_case(body, &closer).unwrap_or(body.len());
                let raw = &body[..end];
                let mut children = Vec::new();
                if !raw.is_empty() {
                    children.push(MarkupNode::Text(decode_entities(raw)));
                }
                pos += end;
                if let Some(close_end) = markup[pos..].find('>') {
                    pos += close_end + 1;
                }
                push(
                    &mut stack,
                    &mut roots,
                    MarkupNode::Element {
                        tag,
                        attributes,
                        children,
                    },
                );
                continue;
            }
            stack.push(Open {
                tag,
                attributes,
                children: Vec::new(),
            });
            continue;
        }

        // Text runs until the next tag-like '<'.
        let mut end = rest.len();
        for (idx, c) in rest.char_indices().skip(1) {
            if c == '<' {
                let tail = &rest[idx + 1..];
                if tail.starts_with(|c: char| c.is_ascii_alphabetic() || c == '/' || c == '!') {
                    end = idx;
                    break;
                }
            }
        }
        push(
            &mut stack,
            &mut roots,
            MarkupNode::Text(decode_entities(&rest[..end])),
        );
        pos += end;
    }

    while let Some(open) = stack.pop() {
        let node = open.close();
        push(&mut stack, &mut roots, node);
    }
    roots
}

/// Parses `tag attr="v" ...>` (the leading `<` already consumed). Returns the
/// lowercase tag, attributes, whether it was self-closing and bytes consumed.
fn parse_open_tag(input: &str) -> (String, Vec<(String, String)>, bool, usize) {
    let name_end = input
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(input.len());
    let tag = input[..name_end].to_ascii_lowercase();
    let mut attributes = Vec::new();
    let mut pos = name_end;
    let mut self_closing = false;

    loop {
        let rest = &input[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            break;
        }
        if trimmed.starts_with('>') {
            pos += 1;
            break;
        }
        if trimmed.starts_with("/>") {
            self_closing = true;
            pos += 2;
            break;
        }
        if trimmed.starts_with('/') {
            pos += 1;
            continue;
        }
        let name_len = trimmed
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(trimmed.len());
        let name = trimmed[..name_len].to_ascii_lowercase();
        pos += name_len;

        let rest = &input[pos..];
        let after_ws = rest.trim_start();
        if let Some(value_part) = after_ws.strip_prefix('=') {
            pos += rest.len() - after_ws.len() + 1;
            let value_rest = value_part.trim_start();
            pos += value_part.len() - value_rest.len();
            let value = match value_rest.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let body = &value_rest[1..];
                    let end = body.find(quote).unwrap_or(body.len());
                    pos += 1 + end + usize::from(end < body.len());
                    decode_entities(&body[..end])
                }
                _ => {
                    let end = value_rest
                        .find(|c: char| c.is_whitespace() || c == '>')
                        .unwrap_or(value_rest.len());
                    pos += end;
                    decode_entities(&value_rest[..end])
                }
            };
            attributes.push((name, value));
        } else {
            attributes.push((name, String::new()));
        }
    }
    (tag, attributes, self_closing, pos)
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Escapes text for safe inclusion in markup, both as content and inside
/// quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
