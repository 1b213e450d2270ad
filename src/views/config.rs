use indoc::formatdoc;
use serde_json::Value;

use super::{ElementAction, View, ViewContext, display_value};
use crate::api::{Payload, Request, RequestBody};
use crate::error::{ApiError, ViewError};
use crate::search;
use crate::surface::escape;

const SEARCH_TARGETS: &str = ".block.text-sm.font-medium";

/// Global server configuration. Only the ports are editable; every other
/// loaded field is sent back unchanged.
#[derive(Debug, Default)]
pub struct ConfigView {
    loaded: Option<Value>,
}

impl View for ConfigView {
    fn title(&self) -> &'static str {
        "Config"
    }

    fn render(&mut self, cx: &mut ViewContext<'_>) -> Result<(), ViewError> {
        self.loaded = None;
        cx.mount("<div class=\"p-6\"><p class=\"text-gray-500\">Loading configuration…</p></div>")?;
        cx.fetch("config", Request::get("/api/config"));
        Ok(())
    }

    fn on_response(
        &mut self,
        key: &str,
        result: Result<Payload, ApiError>,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        match key {
            "config" => {
                let config = match result.and_then(Payload::into_json) {
                    Ok(config @ Value::Object(_)) => config,
                    Ok(_) => return Err(ViewError::Shape { what: "config" }),
                    Err(err) => return cx.show_error("the configuration", &err),
                };
                let markup = formatdoc! {r#"
                    <div class="p-6 space-y-4">
                      <h1 class="text-2xl font-bold">Configuration</h1>
                      <div class="bg-white rounded-xl p-4 space-y-2">
                        <label class="block text-sm font-medium">API Port</label>
                        <input id="apiPort" type="number" value="{api_port}">
                        <label class="block text-sm font-medium">Dashboard Port</label>
                        <input id="dashboardPort" type="number" value="{dashboard_port}">
                        <label class="block text-sm font-medium">Enabled Plugins</label>
                        <p class="text-sm text-gray-600">{plugins}</p>
                        <button id="saveConfigButton" data-action="save-config">Save</button>
                      </div>
                    </div>
                    "#,
                    api_port = escape(&display_value(config.get("api_port"))),
                    dashboard_port = escape(&display_value(config.get("dashboard_port"))),
                    plugins = escape(&enabled_plugins(&config)),
                };
                self.loaded = Some(config);
                cx.mount(&markup)?;
                cx.install_search(|surface, term| search::highlight(surface, SEARCH_TARGETS, term));
            }
            "config-saved" => match result {
                Ok(_) => {
                    cx.notify("Config saved.");
                    cx.request_refresh();
                }
                Err(err) => cx.notify(format!("Could not save the configuration: {err}")),
            },
            _ => {}
        }
        Ok(())
    }

    fn on_action(
        &mut self,
        action: &ElementAction,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        if action.name != "save-config" {
            return Ok(());
        }
        let Some(loaded) = &self.loaded else {
            return Ok(());
        };
        let api_port = cx.input_value("apiPort");
        let dashboard_port = cx.input_value("dashboardPort");
        match merged_config(loaded, &api_port, &dashboard_port) {
            Ok(updated) => cx.fetch(
                "config-saved",
                Request::put("/api/config", RequestBody::Json(updated)),
            ),
            Err(message) => cx.notify(message),
        }
        Ok(())
    }
}

fn enabled_plugins(config: &Value) -> String {
    match config.get("enabled_plugins") {
        Some(Value::Array(plugins)) if !plugins.is_empty() => plugins
            .iter()
            .map(|p| display_value(Some(p)))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "none".to_string(),
    }
}

/// `loaded` with both ports replaced, or a message naming the bad field.
pub fn merged_config(loaded: &Value, api_port: &str, dashboard_port: &str) -> Result<Value, String> {
    let parse = |label: &str, raw: &str| {
        raw.trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port > 0)
            .ok_or_else(|| format!("{label} must be a port between 1 and 65535."))
    };
    let api_port = parse("API port", api_port)?;
    let dashboard_port = parse("Dashboard port", dashboard_port)?;
    let mut updated = loaded.clone();
    if let Value::Object(map) = &mut updated {
        map.insert("api_port".to_string(), Value::from(api_port));
        map.insert("dashboard_port".to_string(), Value::from(dashboard_port));
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_keeps_unedited_fields() {
        let loaded = json!({"enable_api": true, "api_port": 6007, "dashboard_port": 6008, "enabled_plugins": ["AuthPlugin"]});
        let updated = merged_config(&loaded, " 7000", "7001").unwrap();
        assert_eq!(
            updated,
            json!({"enable_api": true, "api_port": 7000, "dashboard_port": 7001, "enabled_plugins": ["AuthPlugin"]})
        );
    }

    #[test]
    fn merge_rejects_bad_ports() {
        let loaded = json!({});
        assert!(merged_config(&loaded, "abc", "1").unwrap_err().starts_with("API port"));
        assert!(merged_config(&loaded, "1", "70000").unwrap_err().starts_with("Dashboard port"));
        assert!(merged_config(&loaded, "0", "1").is_err());
    }
}
