use std::time::{Duration, Instant};

use goup_dash::api::{ApiError, Method, ScriptedClient};
use goup_dash::overlay::{DragOutcome, OverlayState};
use goup_dash::shell::{Focus, Shell};
use goup_dash::surface::{NodeId, ViewSurface};
use ratatui::layout::Rect;
use serde_json::json;

const LOG_OVERLAY: &str = "log-example-com-2024-05-02-log";

fn shell_at(path: &str) -> Shell<ScriptedClient> {
    let mut shell = Shell::new(ScriptedClient::demo());
    shell.set_viewport(Rect::new(0, 0, 80, 20));
    shell.navigate(path).unwrap();
    shell.tick(Instant::now());
    shell
}

fn first(shell: &Shell<ScriptedClient>, selector: &str) -> NodeId {
    shell
        .document()
        .query(selector)
        .into_iter()
        .next()
        .unwrap_or_else(|| panic!("nothing matches {selector}"))
}

fn overlay_text(shell: &Shell<ScriptedClient>, id: &str) -> String {
    let content = shell.overlays().content_node(id).expect("overlay content");
    shell.document().text(content)
}

fn open_first_log(shell: &mut Shell<ScriptedClient>) {
    let view = first(shell, "button[data-action=\"view-log\"]");
    assert!(shell.activate(view));
    shell.tick(Instant::now());
}

#[test]
fn log_overlay_minimizes_by_drag_and_reopens_in_place() {
    let mut shell = shell_at("/logs");
    let fetch = first(&shell, "#fetchLogsBtn");
    assert!(shell.activate(fetch));
    shell.tick(Instant::now());
    assert_eq!(shell.document().query("#logsList li").len(), 3);

    open_first_log(&mut shell);
    assert!(shell.overlays().contains(LOG_OVERLAY));
    assert_eq!(shell.overlays().category(LOG_OVERLAY), Some("logs"));
    let text = overlay_text(&shell, LOG_OVERLAY);
    assert!(text.contains("WARN"));
    assert!(text.contains("slow upstream"));
    assert!(text.contains("latency_ms:"));
    assert!(!shell.document().selection_enabled());

    // Sheet is 12 rows tall on a 20 row viewport, handle on row 8.
    assert!(shell.pointer_down(10, 8));
    assert!(shell.pointer_drag(18));
    assert_eq!(shell.pointer_up(), Some(DragOutcome::Minimize));
    assert_eq!(
        shell.overlays().state(LOG_OVERLAY),
        Some(OverlayState::Minimized)
    );
    assert_eq!(shell.overlays().minimized_slot(LOG_OVERLAY), Some(0));
    assert!(shell.document().selection_enabled());

    // Asking for the same file again restores the existing overlay.
    open_first_log(&mut shell);
    assert_eq!(shell.overlays().state(LOG_OVERLAY), Some(OverlayState::Open));
    assert_eq!(shell.overlays().ids().len(), 1);
    assert!(shell.overlays().registry().is_empty());
}

#[test]
fn short_drag_springs_back_and_minimized_widget_restores_on_click() {
    let mut shell = shell_at("/logs");
    let fetch = first(&shell, "#fetchLogsBtn");
    shell.activate(fetch);
    shell.tick(Instant::now());
    open_first_log(&mut shell);

    assert!(shell.pointer_down(0, 8));
    shell.pointer_drag(11);
    assert_eq!(shell.pointer_up(), Some(DragOutcome::SpringBack));
    assert_eq!(shell.overlays().offset(LOG_OVERLAY), Some(0));

    assert!(shell.minimize_overlay(LOG_OVERLAY));
    let left = shell.overlays().minimized_left(LOG_OVERLAY).unwrap();
    assert!(shell.pointer_down(left + 1, 18));
    assert_eq!(shell.overlays().state(LOG_OVERLAY), Some(OverlayState::Open));
}

#[test]
fn log_files_with_the_same_slug_get_separate_overlays() {
    let mut client = ScriptedClient::new();
    client
        .respond_json(
            Method::Get,
            "/api/logfiles",
            json!([
                {"domain": "my-site.com", "file_name": "my-site.com/a.log", "size_bytes": 10},
                {"domain": "my.site.com", "file_name": "my.site.com/a.log", "size_bytes": 10}
            ]),
        )
        .respond_text(Method::Get, "/api/logfiles/my-site.com%2Fa.log", "dash entry")
        .respond_text(Method::Get, "/api/logfiles/my.site.com%2Fa.log", "dot entry");
    let mut shell = Shell::new(client);
    shell.set_viewport(Rect::new(0, 0, 80, 20));
    shell.navigate("/logs").unwrap();
    let fetch = first(&shell, "#fetchLogsBtn");
    shell.activate(fetch);
    shell.tick(Instant::now());

    let buttons = shell.document().query("button[data-action=\"view-log\"]");
    assert_eq!(buttons.len(), 2);
    for button in &buttons {
        shell.activate(*button);
        shell.tick(Instant::now());
    }
    assert_eq!(
        shell.overlays().ids().to_vec(),
        vec!["log-my-site-com-a-log", "log-my-site-com-a-log-1"]
    );
    assert!(overlay_text(&shell, "log-my-site-com-a-log").contains("dash entry"));
    assert!(overlay_text(&shell, "log-my-site-com-a-log-1").contains("dot entry"));

    // Viewing the first file again reuses its own overlay.
    shell.activate(buttons[0]);
    shell.tick(Instant::now());
    assert_eq!(shell.overlays().ids().len(), 2);
    assert_eq!(shell.overlays().title("log-my-site-com-a-log"), Some("my-site.com/a.log"));
}

#[test]
fn plain_text_logs_are_shown_escaped() {
    let mut shell = shell_at("/logs");
    let fetch = first(&shell, "#fetchLogsBtn");
    shell.activate(fetch);
    shell.tick(Instant::now());
    let buttons = shell.document().query("button[data-action=\"view-log\"]");
    assert_eq!(buttons.len(), 2);
    shell.activate(buttons[1]);
    shell.tick(Instant::now());

    let id = "log-blog-example-com-PHPPlugin-2024-05-02-log";
    assert!(shell.overlays().contains(id));
    assert!(overlay_text(&shell, id).contains("<notice> ready"));
    let content = shell.overlays().content_node(id).unwrap();
    assert_eq!(shell.document().query_within(content, "pre").len(), 1);
}

#[test]
fn site_json_edit_validates_then_saves() {
    let mut shell = shell_at("/sites");
    let view = first(&shell, ".view-json");
    assert!(shell.activate(view));
    shell.tick(Instant::now());

    let id = "site-json-modal";
    assert_eq!(shell.overlays().title(id), Some("example.com's JSON"));
    assert!(overlay_text(&shell, id).contains("/var/www/example"));
    assert!(!shell.press_button(id, "save-json-btn"));

    assert!(shell.press_button(id, "edit-json-btn"));
    assert_eq!(shell.overlays().title(id), Some("Editing example.com's JSON"));
    let editor = first(&shell, "#json-editor");
    assert!(shell.activate(editor));
    assert_eq!(shell.focus(), Focus::Node(editor));

    shell.type_char('x');
    assert!(shell.press_button(id, "save-json-btn"));
    assert!(
        shell
            .page()
            .status()
            .is_some_and(|s| s.starts_with("Invalid JSON"))
    );
    assert!(shell.overlays().contains(id));

    shell.backspace();
    assert!(shell.press_button(id, "save-json-btn"));
    assert!(!shell.overlays().contains(id));
    shell.tick(Instant::now());
    assert_eq!(
        shell.client().sent_paths().last().map(String::as_str),
        Some("PUT /api/sites/example.com")
    );
    assert_eq!(
        shell.page().status(),
        Some("Configuration updated. Restarting server...")
    );
}

#[test]
fn deleting_a_site_confirms_then_reloads() {
    let mut shell = shell_at("/sites");
    let delete = first(&shell, ".delete-site");
    assert!(shell.activate(delete));
    assert!(shell.overlays().contains("confirm-delete-site"));
    assert!(overlay_text(&shell, "confirm-delete-site").contains("example.com"));

    assert!(shell.press_button("confirm-delete-site", "confirm-btn"));
    assert!(!shell.overlays().contains("confirm-delete-site"));
    shell.tick(Instant::now());

    let paths = shell.client().sent_paths();
    assert!(paths.contains(&"DELETE /api/sites/example.com".to_string()));
    assert_eq!(paths.iter().filter(|p| *p == "GET /api/sites").count(), 2);
    assert_eq!(shell.page().status(), Some("Site deleted. Restarting server..."));
}

#[test]
fn confirming_after_navigating_away_still_reports_to_the_owning_view() {
    let mut shell = shell_at("/sites");
    let delete = first(&shell, ".delete-site");
    assert!(shell.activate(delete));
    shell.navigate("/tools").unwrap();
    shell.tick(Instant::now());

    assert!(shell.press_button("confirm-delete-site", "confirm-btn"));
    shell.tick(Instant::now());

    let paths = shell.client().sent_paths();
    assert!(paths.contains(&"DELETE /api/sites/example.com".to_string()));
    assert_eq!(shell.page().status(), Some("Site deleted. Restarting server..."));
    // The sites view is off screen, so the tools page is left alone.
    assert_eq!(paths.iter().filter(|p| *p == "GET /api/sites").count(), 1);
    assert_eq!(shell.router().active_path(), Some("/tools"));
    assert!(shell.document().by_id("cleanupLogsBtn").is_some());
}

#[test]
fn failed_save_after_navigating_away_is_reported() {
    let mut shell = shell_at("/sites");
    let view = first(&shell, ".view-json");
    shell.activate(view);
    shell.tick(Instant::now());
    let id = "site-json-modal";
    assert!(shell.press_button(id, "edit-json-btn"));
    shell.navigate("/plugins").unwrap();

    shell.client_mut().respond(
        Method::Put,
        "/api/sites/example.com",
        Err(ApiError::Status { status: 500 }),
    );
    assert!(shell.press_button(id, "save-json-btn"));
    shell.tick(Instant::now());

    assert!(
        shell
            .page()
            .status()
            .is_some_and(|s| s.starts_with("Could not save example.com"))
    );
}

#[test]
fn repeated_confirmations_get_distinct_ids_and_cancel_sends_nothing() {
    let mut shell = shell_at("/tools");
    let cleanup = first(&shell, "#cleanupLogsBtn");
    shell.activate(cleanup);
    shell.activate(cleanup);
    assert_eq!(
        shell.overlays().ids().to_vec(),
        vec!["confirm-cleanup", "confirm-cleanup-1"]
    );

    assert!(shell.press_button("confirm-cleanup-1", "cancel-btn"));
    assert!(shell.press_button("confirm-cleanup", "confirm-btn"));
    shell.tick(Instant::now());
    assert_eq!(
        shell.client().sent_paths(),
        vec!["POST /api/tools/cleanuplogs"]
    );
    assert_eq!(shell.page().status(), Some("Logs cleaned and backup saved"));

    // Closed overlays stay mounted until the slide-out finishes.
    assert!(shell.overlays().is_mounted("confirm-cleanup"));
    shell.tick(Instant::now() + Duration::from_millis(400));
    assert!(shell.overlays().ids().is_empty());
    assert!(shell.document().by_id("confirm-cleanup").is_none());
}

#[test]
fn escape_closes_the_topmost_open_overlay() {
    let mut shell = shell_at("/tools");
    let restart = first(&shell, "#physicalRestartBtn");
    shell.activate(restart);
    assert_eq!(shell.overlays().topmost_open(), Some("confirm-restart"));
    assert!(shell.escape());
    assert_eq!(shell.overlays().topmost_open(), None);
    assert!(!shell.escape());
}
