use indoc::formatdoc;
use serde_json::Value;

use super::{ElementAction, View, ViewContext, display_value, expect_array};
use crate::api::{Payload, Request, encode_component};
use crate::error::{ApiError, ViewError};
use crate::search;
use crate::surface::escape;

const SEARCH_TARGETS: &str = ".divide-y li";

#[derive(Debug, Default)]
pub struct PluginsView;

impl View for PluginsView {
    fn title(&self) -> &'static str {
        "Plugins"
    }

    fn render(&mut self, cx: &mut ViewContext<'_>) -> Result<(), ViewError> {
        cx.mount("<div class=\"p-6\"><p class=\"text-gray-500\">Loading plugins…</p></div>")?;
        cx.fetch("plugins", Request::get("/api/plugins"));
        Ok(())
    }

    fn on_response(
        &mut self,
        key: &str,
        result: Result<Payload, ApiError>,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        if let Some(plugin) = key.strip_prefix("toggle:") {
            match result {
                Ok(_) => cx.notify("Plugin modified. Server will restart shortly."),
                Err(err) => cx.notify(format!("Could not toggle {plugin}: {err}")),
            }
            return Ok(());
        }
        if key != "plugins" {
            return Ok(());
        }
        let plugins = match result.and_then(Payload::into_json) {
            Ok(value) => expect_array(value, "plugins")?,
            Err(err) => return cx.show_error("plugins", &err),
        };
        let items: String = plugins.iter().map(plugin_item).collect();
        let markup = formatdoc! {r#"
            <div class="p-6">
              <h1 class="text-2xl font-bold mb-4">Plugins</h1>
              <ul class="divide-y bg-white rounded-xl">{items}</ul>
            </div>
            "#,
            items = items,
        };
        cx.mount(&markup)?;
        cx.install_search(|surface, term| search::filter_list(surface, SEARCH_TARGETS, term));
        Ok(())
    }

    fn on_action(
        &mut self,
        action: &ElementAction,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        if action.name != "toggle-plugin" {
            return Ok(());
        }
        let Some(plugin) = action.data("plugin") else {
            return Ok(());
        };
        cx.fetch(
            format!("toggle:{plugin}"),
            Request::post(format!("/api/plugins/{}/toggle", encode_component(plugin))),
        );
        Ok(())
    }
}

/// Accepts both `"Name"` and `{"name": ..., "enabled": ..., "description": ...}`.
fn plugin_item(plugin: &Value) -> String {
    let (name, enabled, description) = match plugin {
        Value::String(name) => (name.clone(), true, String::new()),
        other => (
            display_value(other.get("name")),
            other.get("enabled").and_then(Value::as_bool).unwrap_or(true),
            display_value(other.get("description")),
        ),
    };
    let name = escape(&name);
    formatdoc! {r#"
        <li class="py-3 px-4 flex justify-between items-center">
          <div><p class="font-medium">{name}</p><p class="text-sm text-gray-500">{description}</p></div>
          <input type="checkbox" class="toggle-plugin" data-action="toggle-plugin" data-plugin="{name}"{checked}>
        </li>
        "#,
        name = name,
        description = escape(&description),
        checked = if enabled { " checked" } else { "" },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plugin_items_accept_names_and_objects() {
        let plain = plugin_item(&json!("AuthPlugin"));
        assert!(plain.contains("data-plugin=\"AuthPlugin\" checked"));
        let disabled = plugin_item(&json!({"name": "NodeJSPlugin", "enabled": false}));
        assert!(disabled.contains("data-plugin=\"NodeJSPlugin\">"));
    }
}
