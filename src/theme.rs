use ratatui::style::{Color, Modifier, Style};

// Centralized dashboard colors. Keep these as small helpers so widgets never
// hardcode a palette.

pub const ACCENT_RGB: (u8, u8, u8) = (37, 99, 235);

pub fn accent() -> Color {
    Color::Rgb(ACCENT_RGB.0, ACCENT_RGB.1, ACCENT_RGB.2)
}

// Top navigation bar
pub fn nav_bg() -> Color {
    Color::DarkGray
}
pub fn nav_fg() -> Color {
    Color::White
}
pub fn nav_active() -> Style {
    Style::default()
        .bg(accent())
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

// Bottom status bar
pub fn status_bg() -> Color {
    Color::Gray
}
pub fn status_fg() -> Color {
    Color::Black
}

// Page content
pub fn button() -> Style {
    Style::default().fg(accent()).add_modifier(Modifier::BOLD)
}
pub fn field() -> Style {
    Style::default().bg(Color::Black).fg(Color::White)
}
pub fn focused_field() -> Style {
    Style::default().bg(Color::White).fg(Color::Black)
}
pub fn link() -> Style {
    Style::default()
        .fg(accent())
        .add_modifier(Modifier::UNDERLINED)
}
pub fn highlight() -> Style {
    Style::default().bg(Color::Yellow).fg(Color::Black)
}
pub fn error() -> Style {
    Style::default().fg(Color::Red)
}

// Overlays
pub fn overlay_bg() -> Color {
    Color::Black
}
pub fn overlay_fg() -> Color {
    Color::White
}
pub fn overlay_header() -> Style {
    Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}
pub fn drag_handle() -> Style {
    Style::default().fg(Color::Gray).bg(overlay_bg())
}
pub fn overlay_button() -> Style {
    Style::default().bg(Color::White).fg(Color::Blue)
}
pub fn minimized_border() -> Style {
    Style::default().fg(accent())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accent_is_rgb() {
        assert!(matches!(accent(), Color::Rgb(_, _, _)));
    }

    #[test]
    fn highlight_differs_from_plain_text() {
        assert_ne!(highlight(), Style::default());
        assert_eq!(highlight().bg, Some(Color::Yellow));
    }
}
