use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use super::{UiFrame, fill, safe_set_string, truncate_to_width};
use crate::shell::{HitRegion, HitTarget};
use crate::theme;

const SEARCH_WIDTH: u16 = 24;

/// A navigation entry as the top bar shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub path: String,
    pub title: &'static str,
}

/// Top navigation/search bar and bottom status bar.
#[derive(Debug, Default)]
pub struct Panel {
    top: Rect,
    bottom: Rect,
    hostname: Option<String>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `area` into the top bar, the bottom bar and the page between.
    pub fn split_area(&mut self, area: Rect) -> (Rect, Rect, Rect) {
        let top_h = 1u16.min(area.height);
        let bottom_h = 1u16.min(area.height.saturating_sub(top_h));
        self.top = Rect {
            height: top_h,
            ..area
        };
        self.bottom = Rect {
            y: area.y.saturating_add(area.height).saturating_sub(bottom_h),
            height: bottom_h,
            ..area
        };
        let page = Rect {
            y: area.y.saturating_add(top_h),
            height: area.height.saturating_sub(top_h).saturating_sub(bottom_h),
            ..area
        };
        (self.top, self.bottom, page)
    }

    /// Paints the nav links and the search box, recording their hit regions.
    pub fn render_top(
        &mut self,
        frame: &mut UiFrame<'_>,
        nav: &[NavItem],
        active: Option<&str>,
        search: &str,
        search_focused: bool,
        hits: &mut Vec<HitRegion>,
    ) {
        let area = self.top;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let bar = Style::default().bg(theme::nav_bg()).fg(theme::nav_fg());
        let buffer = frame.buffer_mut();
        fill(buffer, area, bar);
        let max_x = area.x.saturating_add(area.width);
        let search_x = max_x.saturating_sub(SEARCH_WIDTH.min(area.width));

        let mut x = area.x;
        const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
        let label = format!("≡ {CRATE_NAME} ");
        safe_set_string(buffer, area, x, area.y, &label, bar.add_modifier(Modifier::BOLD));
        x = x.saturating_add(label.chars().count() as u16);

        for (idx, item) in nav.iter().enumerate() {
            let chunk = format!(" {} {} ", idx + 1, item.title);
            let width = chunk.chars().count() as u16;
            if x.saturating_add(width) > search_x {
                break;
            }
            let style = if active == Some(item.path.as_str()) {
                theme::nav_active()
            } else {
                bar
            };
            safe_set_string(buffer, area, x, area.y, &chunk, style);
            hits.push(HitRegion {
                rect: Rect::new(x, area.y, width, 1),
                target: HitTarget::Navigate(item.path.clone()),
                overlay: None,
            });
            x = x.saturating_add(width);
        }

        if search_x >= x && search_x < max_x {
            let width = max_x - search_x;
            let inner = usize::from(width.saturating_sub(3));
            let shown = if search.is_empty() && !search_focused {
                "search".to_string()
            } else {
                // Keep the tail visible while typing.
                let skip = search.chars().count().saturating_sub(inner);
                search.chars().skip(skip).collect()
            };
            let style = if search_focused {
                theme::focused_field()
            } else {
                theme::field()
            };
            let text = format!("/ {shown:<inner$}");
            safe_set_string(buffer, area, search_x, area.y, &text, style);
            hits.push(HitRegion {
                rect: Rect::new(search_x, area.y, width, 1),
                target: HitTarget::Search,
                overlay: None,
            });
        }
    }

    /// Status message on the left, active path and host on the right.
    pub fn render_bottom(&mut self, frame: &mut UiFrame<'_>, status: Option<&str>, path: Option<&str>) {
        let area = self.bottom;
        if area.width == 0 || area.height == 0 {
            return;
        }
        // Cached so the bar does not issue a system call every frame.
        let hostname = self
            .hostname
            .get_or_insert_with(|| {
                hostname::get()
                    .ok()
                    .and_then(|s| s.into_string().ok())
                    .unwrap_or_else(|| "unknown-host".to_string())
            })
            .clone();
        let style = Style::default()
            .bg(theme::status_bg())
            .fg(theme::status_fg());
        let buffer = frame.buffer_mut();
        fill(buffer, area, style);

        let info = format!("{} · {hostname}", path.unwrap_or("-"));
        let info = truncate_to_width(&info, usize::from(area.width));
        let info_width = info.chars().count() as u16;
        let info_x = area.x.saturating_add(area.width).saturating_sub(info_width);
        if let Some(status) = status {
            let room = usize::from(info_x.saturating_sub(area.x).saturating_sub(1));
            let text = truncate_to_width(status, room);
            safe_set_string(buffer, area, area.x, area.y, &text, style.add_modifier(Modifier::BOLD));
        }
        safe_set_string(buffer, area, info_x, area.y, &info, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer.cell((x, y)).map_or(" ", |c| c.symbol()))
            .collect()
    }

    #[test]
    fn split_reserves_one_row_each() {
        let mut panel = Panel::new();
        let (top, bottom, page) = panel.split_area(Rect::new(0, 0, 80, 24));
        assert_eq!(top, Rect::new(0, 0, 80, 1));
        assert_eq!(bottom, Rect::new(0, 23, 80, 1));
        assert_eq!(page, Rect::new(0, 1, 80, 22));
    }

    #[test]
    fn nav_links_and_search_record_hits() {
        let area = Rect::new(0, 0, 80, 2);
        let mut buffer = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        let mut panel = Panel::new();
        panel.split_area(area);
        let nav = vec![
            NavItem { path: "/".into(), title: "Home" },
            NavItem { path: "/sites".into(), title: "Sites" },
        ];
        let mut hits = Vec::new();
        panel.render_top(&mut frame, &nav, Some("/sites"), "exa", true, &mut hits);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[1].target, HitTarget::Navigate("/sites".into()));
        assert_eq!(hits[2].target, HitTarget::Search);
        let top = row_text(&buffer, 0);
        assert!(top.contains(" 1 Home "));
        assert!(top.contains("/ exa"));
    }

    #[test]
    fn status_and_path_share_the_bottom_row() {
        let area = Rect::new(0, 0, 60, 2);
        let mut buffer = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        let mut panel = Panel::new();
        panel.split_area(area);
        panel.hostname = Some("box".into());
        panel.render_bottom(&mut frame, Some("Config saved."), Some("/config"));
        let bottom = row_text(&buffer, 1);
        assert!(bottom.starts_with("Config saved."));
        assert!(bottom.trim_end().ends_with("/config · box"));
    }
}
