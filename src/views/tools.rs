use indoc::indoc;

use super::{ElementAction, View, ViewContext, confirm, display_value};
use crate::api::{Payload, Request};
use crate::error::{ApiError, ViewError};

const TOOLS_PAGE: &str = indoc! {r#"
    <div class="p-6 space-y-4">
      <h1 class="text-2xl font-bold">Tools</h1>
      <div class="bg-white rounded-xl p-4 space-y-2">
        <p class="text-sm text-gray-600">Back up the log directory and start fresh files.</p>
        <button id="cleanupLogsBtn">Clean up logs</button>
      </div>
      <div class="bg-white rounded-xl p-4 space-y-2">
        <p class="text-sm text-gray-600">Restart the server process.</p>
        <button id="physicalRestartBtn">Restart server</button>
      </div>
    </div>
"#};

/// Maintenance actions. Installs no search callback, so typing in the
/// search box leaves this page untouched.
#[derive(Debug, Default)]
pub struct ToolsView;

impl View for ToolsView {
    fn title(&self) -> &'static str {
        "Tools"
    }

    fn render(&mut self, cx: &mut ViewContext<'_>) -> Result<(), ViewError> {
        cx.mount(TOOLS_PAGE)?;
        Ok(())
    }

    fn on_response(
        &mut self,
        key: &str,
        result: Result<Payload, ApiError>,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        match (key, result) {
            ("cleanup", Ok(payload)) => {
                let message = payload
                    .into_json()
                    .ok()
                    .map(|body| display_value(body.get("message")))
                    .filter(|message| !message.is_empty())
                    .unwrap_or_else(|| "Logs cleaned.".to_string());
                cx.notify(message);
            }
            ("restart", Ok(_)) => cx.notify("Server restarting..."),
            (_, Err(err)) => cx.notify(format!("Request failed: {err}")),
            _ => {}
        }
        Ok(())
    }

    fn on_action(
        &mut self,
        action: &ElementAction,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        match action.name.as_str() {
            "cleanupLogsBtn" => {
                confirm(
                    cx,
                    "confirm-cleanup",
                    "Clean up logs",
                    "Back up and clean the logs?",
                    "Clean up",
                    |cx| cx.fetch("cleanup", Request::post("/api/tools/cleanuplogs")),
                );
            }
            "physicalRestartBtn" => {
                confirm(
                    cx,
                    "confirm-restart",
                    "Restart server",
                    "Restart the server process?",
                    "Restart",
                    |cx| cx.fetch("restart", Request::post("/api/restart")),
                );
            }
            _ => {}
        }
        Ok(())
    }
}
