//! Terminal rendering of a page session.
//!
//! `UiFrame` wraps `ratatui::Frame` and clips every draw call to the visible
//! area, so painters can compute rectangles that drift past the edge (a sheet
//! dragged half off-screen, a minimized widget on a narrow terminal) without
//! guarding each write.
//!
//! `draw` paints the bars, the page container and the overlay layer, then
//! hands the clickable regions it produced back to the shell.

pub mod flow;
pub mod panel;

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Clear, Paragraph, Widget};

use crate::api::ApiClient;
use crate::constants::APP_CONTAINER;
use crate::overlay::{OverlayDraw, OverlayState};
use crate::shell::{Focus, HitRegion, HitTarget, Shell};
use crate::surface::{Document, NodeId, ViewSurface};
use crate::theme;

pub use flow::{FlowHit, Flowed, flow};
pub use panel::{NavItem, Panel};

/// Wrapper around `ratatui::Frame` that clamps drawing to the visible area.
pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Construct a `UiFrame` directly from an area and buffer, for offscreen
    /// rendering in tests.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    let bounds = bounds.intersection(buffer.area);
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}

/// Paints `style` over every cell of `area` that lies inside the buffer.
pub(crate) fn fill(buffer: &mut Buffer, area: Rect, style: Style) {
    let area = area.intersection(buffer.area);
    for y in area.y..area.y.saturating_add(area.height) {
        for x in area.x..area.x.saturating_add(area.width) {
            if let Some(cell) = buffer.cell_mut((x, y)) {
                cell.set_symbol(" ");
                cell.set_style(style);
            }
        }
    }
}

/// Paints the whole session and records its hit regions.
pub fn draw<C: ApiClient>(frame: &mut UiFrame<'_>, shell: &mut Shell<C>, panel: &mut Panel) {
    let (_, _, page) = panel.split_area(frame.area());
    let mut hits = Vec::new();

    let nav: Vec<NavItem> = shell
        .router()
        .routes()
        .iter()
        .filter_map(|route| {
            Some(NavItem {
                path: route.pattern.clone(),
                title: shell.router().view_title(&route.pattern)?,
            })
        })
        .collect();
    let search = shell.search_input();
    panel.render_top(
        frame,
        &nav,
        shell.router().active_path(),
        &search,
        shell.focus() == Focus::Search,
        &mut hits,
    );
    panel.render_bottom(frame, shell.page().status(), shell.router().active_path());

    let focused = match shell.focus() {
        Focus::Node(node) => Some(node),
        _ => None,
    };
    let content = inset(page);
    let app = shell
        .document()
        .by_id(APP_CONTAINER.trim_start_matches('#'));
    if let Some(app) = app {
        let flowed = flow(shell.document(), app, content.width, focused);
        let max_scroll = (flowed.lines.len() as u16).saturating_sub(content.height);
        shell.clamp_scroll(max_scroll);
        paint_lines(frame, content, flowed, shell.scroll(), None, &mut hits);
    }

    shell.set_viewport(page);
    for overlay in shell.overlays().layout() {
        paint_overlay(frame, shell.document(), &overlay, focused, &mut hits);
    }
    shell.set_hits(hits);
}

/// One column of padding on each side.
fn inset(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        width: area.width.saturating_sub(2),
        ..area
    }
}

fn paint_lines(
    frame: &mut UiFrame<'_>,
    area: Rect,
    flowed: Flowed,
    scroll: u16,
    overlay: Option<&str>,
    hits: &mut Vec<HitRegion>,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    for hit in &flowed.hits {
        let Some(row) = hit.line.checked_sub(usize::from(scroll)) else {
            continue;
        };
        if row >= usize::from(area.height) {
            continue;
        }
        let rect = Rect::new(
            area.x.saturating_add(hit.column),
            area.y.saturating_add(row as u16),
            hit.width,
            1,
        )
        .intersection(area);
        if rect.width > 0 {
            hits.push(HitRegion {
                rect,
                target: HitTarget::Node(hit.node),
                overlay: overlay.map(str::to_string),
            });
        }
    }
    frame.render_widget(Paragraph::new(flowed.lines).scroll((scroll, 0)), area);
}

fn paint_overlay(
    frame: &mut UiFrame<'_>,
    doc: &Document,
    overlay: &OverlayDraw,
    focused: Option<NodeId>,
    hits: &mut Vec<HitRegion>,
) {
    frame.render_widget(Clear, overlay.rect);
    if overlay.state == OverlayState::Minimized {
        let block = Block::bordered()
            .border_style(theme::minimized_border())
            .title(truncate_to_width(
                &overlay.title,
                usize::from(overlay.rect.width.saturating_sub(2)),
            ));
        let inner = block.inner(overlay.rect);
        frame.render_widget(block, overlay.rect);
        safe_set_string(frame.buffer_mut(), inner, inner.x, inner.y, "▲ restore", Style::default());
        return;
    }

    let base = Style::default()
        .bg(theme::overlay_bg())
        .fg(theme::overlay_fg());
    fill(frame.buffer_mut(), overlay.rect, base);
    if let Some(handle) = overlay.handle {
        let grip = "━━━━━━";
        let x = handle.x + handle.width.saturating_sub(grip.chars().count() as u16) / 2;
        safe_set_string(frame.buffer_mut(), handle, x, handle.y, grip, theme::drag_handle());
    }
    if let Some(header) = overlay.header {
        fill(frame.buffer_mut(), header, theme::overlay_header());
        safe_set_string(
            frame.buffer_mut(),
            header,
            header.x.saturating_add(1),
            header.y,
            &overlay.title,
            theme::overlay_header(),
        );
        for button in &overlay.buttons {
            let label = format!(" {} ", button.label);
            safe_set_string(
                frame.buffer_mut(),
                header,
                button.rect.x,
                button.rect.y,
                &label,
                theme::overlay_button(),
            );
        }
    }
    if let Some(body) = overlay.body {
        let body = inset(body);
        let flowed = flow(doc, overlay.content, body.width, focused);
        let scroll = overlay
            .scroll
            .min((flowed.lines.len() as u16).saturating_sub(body.height));
        paint_lines(frame, body, flowed, scroll, Some(&overlay.id), hits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ScriptedClient;
    use std::time::Instant;

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer.cell((x, y)).map_or(" ", |c| c.symbol()))
            .collect()
    }

    fn screen(buffer: &Buffer) -> String {
        (0..buffer.area.height)
            .map(|y| row_text(buffer, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(shell: &mut Shell<ScriptedClient>, panel: &mut Panel, area: Rect) -> Buffer {
        let mut buffer = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        draw(&mut frame, shell, panel);
        buffer
    }

    #[test]
    fn truncate_to_width_short_and_long() {
        assert_eq!(truncate_to_width("abc", 5), "abc");
        assert_eq!(truncate_to_width("abcdef", 3), "abc");
    }

    #[test]
    fn safe_set_string_ignores_out_of_bounds() {
        let bounds = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(bounds);
        safe_set_string(&mut buf, bounds, 1, 0, "hello", Style::default());
        assert_eq!(buf.cell((1, 0)).unwrap().symbol(), "h");
        safe_set_string(&mut buf, bounds, 100, 0, "x", Style::default());
        safe_set_string(&mut buf, Rect::new(8, 0, 10, 1), 8, 0, "wide", Style::default());
        assert_eq!(buf.cell((9, 0)).unwrap().symbol(), "i");
    }

    #[test]
    fn render_widget_clips_to_frame_area() {
        let area = Rect::new(0, 0, 5, 3);
        let mut buf = Buffer::empty(area);
        let mut ui = UiFrame::from_parts(area, &mut buf);
        ui.render_widget(Paragraph::new("AAAAAAAA"), Rect::new(3, 1, 5, 2));
        assert_eq!(buf.cell((3, 1)).unwrap().symbol(), "A");
        assert_eq!(buf.cell((2, 1)).unwrap().symbol(), " ");
    }

    #[test]
    fn page_renders_with_nav_and_hits() {
        let mut shell = Shell::new(ScriptedClient::demo());
        let mut panel = Panel::new();
        shell.navigate("/plugins").unwrap();
        shell.tick(Instant::now());
        let buffer = render(&mut shell, &mut panel, Rect::new(0, 0, 100, 30));
        let text = screen(&buffer);
        assert!(row_text(&buffer, 0).contains(" 3 Plugins "));
        assert!(text.contains("AuthPlugin"));
        assert!(text.contains("[x]"));
        let checkboxes = shell
            .hits()
            .iter()
            .filter(|hit| matches!(hit.target, HitTarget::Node(_)) && hit.overlay.is_none())
            .count();
        assert_eq!(checkboxes, 3);
        assert_eq!(shell.overlays().viewport(), Rect::new(0, 1, 100, 28));
    }

    #[test]
    fn overlay_sheet_paints_header_buttons_and_body() {
        let mut shell = Shell::new(ScriptedClient::demo());
        let mut panel = Panel::new();
        shell.navigate("/tools").unwrap();
        shell.tick(Instant::now());
        let cleanup = shell.document().by_id("cleanupLogsBtn").unwrap();
        assert!(shell.activate(cleanup));
        let buffer = render(&mut shell, &mut panel, Rect::new(0, 0, 80, 24));
        let text = screen(&buffer);
        assert!(text.contains("━━━━━━"));
        assert!(text.contains("Clean up logs"));
        assert!(text.contains(" Clean up "));
        assert!(text.contains("× Cancel"));
        assert!(text.contains("Back up and clean the logs?"));
    }
}
