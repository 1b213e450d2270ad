use std::collections::BTreeMap;

use indoc::{formatdoc, indoc};
use serde_json::{Map, Value};

use super::{ElementAction, SharedId, View, ViewContext, display_value, expect_array};
use crate::api::{Payload, Request, encode_component};
use crate::error::{ApiError, ViewError};
use crate::overlay::ShowRequest;
use crate::search;
use crate::surface::escape;

const SEARCH_TARGETS: &str = "#logsList li";
const LOG_CATEGORY: &str = "logs";

const LOGS_PAGE: &str = indoc! {r#"
    <div class="p-6 space-y-4">
      <h1 class="text-2xl font-bold">Logs</h1>
      <div class="bg-white rounded-xl p-4 space-y-2">
        <label class="block text-sm font-medium">Start date</label>
        <input id="startDate" type="date" placeholder="YYYY-MM-DD">
        <label class="block text-sm font-medium">End date</label>
        <input id="endDate" type="date" placeholder="YYYY-MM-DD">
        <label class="block text-sm font-medium">Plugin</label>
        <input id="pluginFilter" type="text" placeholder="plugin name">
        <button id="fetchLogsBtn" data-action="fetch-logs">Fetch logs</button>
      </div>
      <ul id="logsList" class="divide-y bg-white rounded-xl"></ul>
    </div>
"#};

#[derive(Debug, Default)]
pub struct LogsView {
    /// Overlay each viewed file was mounted under. Distinct files can share a
    /// slug, in which case the later one gets a suffixed id.
    overlays: BTreeMap<String, String>,
}

impl View for LogsView {
    fn title(&self) -> &'static str {
        "Logs"
    }

    fn render(&mut self, cx: &mut ViewContext<'_>) -> Result<(), ViewError> {
        cx.mount(LOGS_PAGE)?;
        cx.install_search(|surface, term| search::filter_list(surface, SEARCH_TARGETS, term));
        Ok(())
    }

    fn on_response(
        &mut self,
        key: &str,
        result: Result<Payload, ApiError>,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        if key == "logfiles" {
            let files = match result.and_then(Payload::into_json) {
                Ok(value) => expect_array(value, "log files")?,
                Err(err) => {
                    cx.notify(format!("Could not list log files: {err}"));
                    return Ok(());
                }
            };
            let Some(list) = cx.surface.by_id("logsList") else {
                return Err(ViewError::MissingContainer("#logsList".to_string()));
            };
            let items: String = files.iter().map(file_item).collect();
            cx.surface.set_markup(list, &items);
            let term = cx.search_term().to_string();
            search::filter_list(&mut *cx.surface, SEARCH_TARGETS, &term);
        } else if let Some(file) = key.strip_prefix("logfile:") {
            match result {
                Ok(payload) => self.show_log(cx, file, &payload.into_text()),
                Err(err) => cx.notify(format!("Could not open {file}: {err}")),
            }
        }
        Ok(())
    }

    fn on_action(
        &mut self,
        action: &ElementAction,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        match action.name.as_str() {
            "fetch-logs" => {
                let filters = [
                    ("start", cx.input_value("startDate")),
                    ("end", cx.input_value("endDate")),
                    ("plugin", cx.input_value("pluginFilter")),
                ];
                cx.fetch("logfiles", Request::get(logfiles_path(&filters)));
            }
            "view-log" => {
                if let Some(file) = action.data("file").filter(|f| !f.is_empty()) {
                    cx.fetch(
                        format!("logfile:{file}"),
                        Request::get(format!("/api/logfiles/{}", encode_component(file))),
                    );
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// `/api/logfiles` with the non-empty filters as query parameters.
pub fn logfiles_path(filters: &[(&str, String)]) -> String {
    let params: Vec<String> = filters
        .iter()
        .map(|(name, value)| (name, value.trim()))
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("{name}={}", encode_component(value)))
        .collect();
    if params.is_empty() {
        "/api/logfiles".to_string()
    } else {
        format!("/api/logfiles?{}", params.join("&"))
    }
}

fn file_item(file: &Value) -> String {
    let name = display_value(file.get("file_name"));
    let size = file.get("size_bytes").and_then(Value::as_u64).unwrap_or(0);
    let action = if size > 0 {
        format!(
            "<button class=\"text-blue-600\" data-action=\"view-log\" data-file=\"{}\">View</button>",
            escape(&name)
        )
    } else {
        "<span class=\"text-gray-400\">Empty</span>".to_string()
    };
    formatdoc! {r#"
        <li class="px-4 py-3 flex justify-between items-center">
          <div><p class="font-medium">{domain}</p><p class="text-sm text-gray-400">{name} | {size} bytes</p></div>
          {action}
        </li>
        "#,
        domain = escape(&display_value(file.get("domain"))),
        name = escape(&name),
        size = size,
        action = action,
    }
}

/// Preferred overlay id for a log file. File names carry path separators,
/// which the derived `-title`/`-content` ids should not. Not unique per file.
pub fn overlay_id(file: &str) -> String {
    let slug: String = file
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("log-{slug}")
}

impl LogsView {
    /// Shows `raw` in the file's overlay, reusing the overlay when the same
    /// file is already open or minimized.
    fn show_log(&mut self, cx: &mut ViewContext<'_>, file: &str, raw: &str) {
        let content = match parse_entries(raw) {
            Some(entries) => entries_markup(&entries),
            None => format!("<pre class=\"whitespace-pre-wrap\">{}</pre>", escape(raw)),
        };
        if let Some(id) = self.overlays.get(file).filter(|id| cx.overlays.contains(id)) {
            cx.overlays.set_title(id, file, &mut *cx.surface);
            cx.overlays.set_content(id, &content, &mut *cx.surface);
            cx.overlays.restore(id, &mut *cx.surface);
            return;
        }
        let mounted = SharedId::default();
        let request = ShowRequest::new(file)
            .id(overlay_id(file))
            .category(LOG_CATEGORY)
            .content(content)
            .button(mounted.close_button());
        let shown = cx.show_overlay(request);
        mounted.set(shown.clone());
        self.overlays.retain(|_, id| *id != shown);
        self.overlays.insert(file.to_string(), shown);
    }
}

/// Parses a log file made of concatenated JSON objects. `None` when any part
/// is not a JSON object, so the caller can fall back to raw text.
pub fn parse_entries(raw: &str) -> Option<Vec<Map<String, Value>>> {
    let mut entries = Vec::new();
    for item in serde_json::Deserializer::from_str(raw.trim()).into_iter::<Value>() {
        match item.ok()? {
            Value::Object(entry) => entries.push(entry),
            _ => return None,
        }
    }
    Some(entries)
}

fn entries_markup(entries: &[Map<String, Value>]) -> String {
    let mut html = String::from("<div class=\"flex flex-col space-y-2 text-sm\">");
    for entry in entries {
        let level = entry
            .get("level")
            .map(|v| display_value(Some(v)))
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "info".to_string());
        let time = display_value(entry.get("time"));
        let message = match entry.get("message") {
            Some(Value::String(message)) => message.as_str(),
            _ => "",
        };
        let extra: String = entry
            .iter()
            .filter(|(key, value)| match key.as_str() {
                "level" | "time" => false,
                "message" => !value.is_string(),
                _ => true,
            })
            .map(|(key, value)| {
                format!("<div><strong>{}:</strong> {}</div>", escape(key), escape(&value.to_string()))
            })
            .collect();
        let extra = if extra.is_empty() {
            extra
        } else {
            format!("<div class=\"mt-1 text-xs text-gray-600\">{extra}</div>")
        };
        html.push_str(&formatdoc! {r#"
            <div class="log-entry bg-gray-50 border rounded p-2">
              <div class="text-xs text-gray-500"><span class="font-semibold uppercase">{level}</span> @ <span>{time}</span></div>
              <div class="text-gray-800 whitespace-pre-line">{message}</div>
              {extra}
            </div>
            "#,
            level = escape(&level.to_uppercase()),
            time = escape(&time),
            message = escape(message),
            extra = extra,
        });
    }
    html.push_str("</div>");
    html
}
