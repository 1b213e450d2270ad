//! Flows a document subtree into styled terminal lines.
//!
//! Block elements start on a fresh line, inline elements and text wrap at
//! the available width. Form controls and buttons are painted as bracketed
//! atoms and reported as hit regions so the shell can activate them.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::constants::DIMMED_OPACITY;
use crate::surface::{Document, NodeId, NodeRef, ViewSurface};
use crate::theme;

const BLOCK_TAGS: &[&str] = &[
    "div", "p", "ul", "ol", "li", "h1", "h2", "h3", "pre", "form", "label", "section", "header",
    "textarea", "body",
];

const INPUT_WIDTH: usize = 16;

/// A clickable cell run in flowed coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowHit {
    pub line: usize,
    pub column: u16,
    pub width: u16,
    pub node: NodeId,
}

#[derive(Debug, Default)]
pub struct Flowed {
    pub lines: Vec<Line<'static>>,
    pub hits: Vec<FlowHit>,
}

/// Lays out the children of `scope` within `width` columns. `focused` is
/// the form control currently receiving keystrokes.
pub fn flow(doc: &Document, scope: NodeId, width: u16, focused: Option<NodeId>) -> Flowed {
    let mut writer = Writer::new(width.max(1));
    writer.focused = focused;
    for child in doc.children(scope) {
        walk(doc, *child, Style::default(), false, &mut writer);
    }
    writer.finish()
}

fn walk(doc: &Document, node: NodeId, style: Style, pre: bool, out: &mut Writer) {
    let tag = match doc.node(node) {
        Some(NodeRef::Text(text)) => {
            if pre {
                out.push_pre(text, style);
            } else {
                out.push_text(text, style);
            }
            return;
        }
        Some(NodeRef::Element { tag }) => tag,
        None => return,
    };
    if doc.has_class(node, "hidden") || matches!(tag, "script" | "style") {
        return;
    }
    let style = element_style(doc, node, tag, style);
    let pre = pre || tag == "pre" || doc.has_class(node, "whitespace-pre-wrap");
    let block = BLOCK_TAGS.contains(&tag);
    if block {
        out.block_break();
    }
    match tag {
        "br" => out.break_line(),
        "button" => {
            let label = doc.text(node).split_whitespace().collect::<Vec<_>>().join(" ");
            out.push_atom(&format!("[ {label} ]"), style.patch(theme::button()), Some(node));
        }
        "input" => {
            let text = input_text(doc, node);
            let style = if doc.attr(node, "type") == Some("checkbox") {
                style
            } else {
                style.patch(out.field_style(node))
            };
            out.push_atom(&text, style, Some(node));
        }
        "textarea" => {
            let value = doc.value(node);
            let field = style.patch(out.field_style(node));
            let lines: Vec<&str> = if value.is_empty() { vec![""] } else { value.split('\n').collect() };
            for line in lines {
                out.push_atom(&format!("{line:<width$}", width = INPUT_WIDTH), field, Some(node));
                out.break_line();
            }
        }
        _ => {
            if tag == "li" {
                out.prefix = Some("• ");
            }
            for child in doc.children(node) {
                walk(doc, *child, style, pre, out);
            }
            if tag == "li" {
                out.prefix = None;
            }
        }
    }
    if block {
        out.block_break();
    }
}

fn element_style(doc: &Document, node: NodeId, tag: &str, inherited: Style) -> Style {
    let mut style = inherited;
    match tag {
        "h1" | "h2" | "h3" | "strong" | "b" => style = style.add_modifier(Modifier::BOLD),
        "mark" => style = style.patch(theme::highlight()),
        "a" => style = style.patch(theme::link()),
        _ => {}
    }
    if doc.has_class(node, "font-medium") || doc.has_class(node, "font-semibold") {
        style = style.add_modifier(Modifier::BOLD);
    }
    if doc.has_class(node, "text-red-600") {
        style = style.patch(theme::error());
    }
    if doc.has_class(node, "uppercase") {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if doc.style_ref(node, "opacity") == Some(DIMMED_OPACITY) {
        style = style.add_modifier(Modifier::DIM);
    }
    style
}

fn input_text(doc: &Document, node: NodeId) -> String {
    if doc.attr(node, "type") == Some("checkbox") {
        return if doc.attr(node, "checked").is_some() { "[x]" } else { "[ ]" }.to_string();
    }
    let value = doc.value(node);
    let shown = if value.is_empty() {
        doc.attr(node, "placeholder").unwrap_or_default().to_string()
    } else {
        value
    };
    let clipped: String = shown.chars().take(INPUT_WIDTH).collect();
    format!("[{clipped:<width$}]", width = INPUT_WIDTH)
}

struct Writer {
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    used: usize,
    pending_space: bool,
    /// Marker placed before the next content on a fresh line (list bullets).
    prefix: Option<&'static str>,
    focused: Option<NodeId>,
    hits: Vec<FlowHit>,
}

impl Writer {
    fn new(width: u16) -> Self {
        Self {
            width: usize::from(width),
            lines: Vec::new(),
            current: Vec::new(),
            used: 0,
            pending_space: false,
            prefix: None,
            focused: None,
            hits: Vec::new(),
        }
    }

    fn field_style(&self, node: NodeId) -> Style {
        if self.focused == Some(node) {
            theme::focused_field()
        } else {
            theme::field()
        }
    }

    fn break_line(&mut self) {
        let spans = std::mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
        self.used = 0;
        self.pending_space = false;
    }

    fn block_break(&mut self) {
        if self.used > 0 {
            self.break_line();
        }
        self.pending_space = false;
    }

    fn take_prefix(&mut self) {
        if self.used == 0
            && let Some(prefix) = self.prefix.take()
        {
            self.emit(prefix.to_string(), Style::default());
        }
    }

    fn emit(&mut self, text: String, style: Style) {
        self.used += text.chars().count();
        self.current.push(Span::styled(text, style));
    }

    /// Places an unbreakable run, wrapping first when it does not fit.
    fn push_atom(&mut self, text: &str, style: Style, node: Option<NodeId>) {
        let len = text.chars().count();
        let space = usize::from(self.pending_space && self.used > 0);
        if self.used > 0 && self.used + space + len > self.width {
            self.break_line();
        } else if space == 1 {
            self.emit(" ".to_string(), Style::default());
        }
        self.pending_space = false;
        self.take_prefix();
        let column = self.used;
        let text: String = text.chars().take(self.width.saturating_sub(column).max(1)).collect();
        let width = text.chars().count();
        self.emit(text, style);
        if let Some(node) = node {
            self.hits.push(FlowHit {
                line: self.lines.len(),
                column: column as u16,
                width: width as u16,
                node,
            });
        }
    }

    fn push_text(&mut self, text: &str, style: Style) {
        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        for word in text.split_whitespace() {
            let mut rest: Vec<char> = word.chars().collect();
            while rest.len() > self.width {
                let head: String = rest.drain(..self.width).collect();
                self.push_atom(&head, style, None);
            }
            let word: String = rest.into_iter().collect();
            self.push_atom(&word, style, None);
            self.pending_space = true;
        }
        if !text.ends_with(char::is_whitespace) {
            self.pending_space = false;
        }
    }

    fn push_pre(&mut self, text: &str, style: Style) {
        let mut first = true;
        for segment in text.split('\n') {
            if !first {
                self.break_line();
            }
            first = false;
            let chars: Vec<char> = segment.chars().collect();
            for chunk in chars.chunks(self.width) {
                if self.used + chunk.len() > self.width {
                    self.break_line();
                }
                self.take_prefix();
                self.emit(chunk.iter().collect(), style);
            }
        }
    }

    fn finish(mut self) -> Flowed {
        if !self.current.is_empty() {
            self.break_line();
        }
        Flowed {
            lines: self.lines,
            hits: self.hits,
        }
    }
}

/// Plain text of a flowed line, for tests and width checks.
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flowed(markup: &str, width: u16) -> (Document, Flowed) {
        let mut doc = Document::new();
        let root = doc.root();
        doc.set_markup(root, markup);
        let flowed = flow(&doc, root, width, None);
        (doc, flowed)
    }

    fn texts(flowed: &Flowed) -> Vec<String> {
        flowed.lines.iter().map(line_text).collect()
    }

    #[test]
    fn blocks_start_new_lines_and_inline_text_joins() {
        let (_, out) = flowed("<h1>Title</h1><p>one <b>two</b> three</p><div>next</div>", 40);
        assert_eq!(texts(&out), vec!["Title", "one two three", "next"]);
    }

    #[test]
    fn long_text_wraps_at_width() {
        let (_, out) = flowed("<p>alpha beta gamma delta</p>", 11);
        assert_eq!(texts(&out), vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn pre_keeps_line_breaks() {
        let (_, out) = flowed("<pre>{\n  \"a\": 1\n}</pre>", 40);
        assert_eq!(texts(&out), vec!["{", "  \"a\": 1", "}"]);
    }

    #[test]
    fn hidden_elements_are_skipped() {
        let (_, out) = flowed("<p>shown</p><p class=\"hidden\">gone</p>", 40);
        assert_eq!(texts(&out), vec!["shown"]);
    }

    #[test]
    fn buttons_and_checkboxes_report_hits() {
        let (doc, out) = flowed(
            "<li>Auth <input type=\"checkbox\" checked> <button id=\"b\">View JSON</button></li>",
            60,
        );
        assert_eq!(texts(&out), vec!["• Auth [x] [ View JSON ]"]);
        let button = doc.by_id("b").unwrap();
        let hit = out.hits.iter().find(|hit| hit.node == button).unwrap();
        assert_eq!((hit.line, hit.column, hit.width), (0, 11, 13));
        assert_eq!(out.hits.len(), 2);
    }

    #[test]
    fn bullets_attach_to_first_block_child() {
        let (_, out) = flowed("<ul><li>\n <div><p>example.com</p><p>port 80</p></div>\n</li></ul>", 40);
        assert_eq!(texts(&out), vec!["• example.com", "port 80"]);
    }

    #[test]
    fn dimmed_rows_carry_dim_modifier() {
        let (_, out) = flowed("<li style=\"opacity: 0.4\">faded</li>", 40);
        let span = out.lines[0].spans.last().unwrap();
        assert!(span.style.add_modifier.contains(Modifier::DIM));
    }
}
