use std::time::Duration;

use crossterm::event::{KeyCode, MouseButton, MouseEventKind};
use goup_dash::api::ScriptedClient;
use goup_dash::drivers::scripted::{BufferOutput, ScriptedInput};
use goup_dash::overlay::OverlayState;
use goup_dash::runner::run_dashboard;
use goup_dash::shell::Shell;

#[test]
fn clicking_a_nav_link_switches_views() {
    let mut shell = Shell::new(ScriptedClient::demo());
    shell.navigate("/").unwrap();
    let mut input = ScriptedInput::new();
    // "≡ goup-dash " then " 1 Home " and " 2 Metrics ": Plugins starts at column 31.
    input.click(34, 0).key(KeyCode::Char('q'));
    let mut output = BufferOutput::new(100, 30).unwrap();

    run_dashboard(input, &mut output, &mut shell, Duration::ZERO).unwrap();

    assert_eq!(shell.router().active_path(), Some("/plugins"));
    let screen = output.screen();
    assert!(screen.contains("NodeJSPlugin"));
    assert!(screen.lines().last().unwrap_or_default().contains("/plugins"));
}

#[test]
fn typing_in_the_search_box_filters_the_page() {
    let mut shell = Shell::new(ScriptedClient::demo());
    shell.navigate("/plugins").unwrap();
    let mut input = ScriptedInput::new();
    input
        .key(KeyCode::Char('/'))
        .text("node")
        .key(KeyCode::Esc)
        .key(KeyCode::Char('q'));
    let mut output = BufferOutput::new(100, 30).unwrap();

    run_dashboard(input, &mut output, &mut shell, Duration::ZERO).unwrap();

    assert_eq!(shell.search_term(), "node");
    assert!(output.screen().lines().next().unwrap_or_default().contains("/ node"));
}

#[test]
fn dragging_a_sheet_down_minimizes_it() {
    let mut shell = Shell::new(ScriptedClient::demo());
    shell.navigate("/tools").unwrap();
    let mut input = ScriptedInput::new();
    // 80x24 screen: page rows 1..=22, sheet 13 rows tall with its handle on row 10.
    input
        .mouse(MouseEventKind::Down(MouseButton::Left), 40, 10)
        .mouse(MouseEventKind::Drag(MouseButton::Left), 40, 22)
        .mouse(MouseEventKind::Up(MouseButton::Left), 40, 22)
        .key(KeyCode::Char('q'));
    let mut output = BufferOutput::new(80, 24).unwrap();

    let cleanup = {
        use goup_dash::surface::ViewSurface;
        shell.document().by_id("cleanupLogsBtn").unwrap()
    };
    assert!(shell.activate(cleanup));
    run_dashboard(input, &mut output, &mut shell, Duration::ZERO).unwrap();

    assert_eq!(
        shell.overlays().state("confirm-cleanup"),
        Some(OverlayState::Minimized)
    );
    assert!(output.screen().contains("▲ restore"));
}
