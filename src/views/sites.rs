use indoc::formatdoc;
use serde_json::Value;

use super::{ElementAction, SharedId, View, ViewContext, confirm, display_value, expect_array};
use crate::api::{Payload, Request, RequestBody, encode_component};
use crate::error::{ApiError, ViewError};
use crate::overlay::{ButtonSpec, ShowRequest};
use crate::search;
use crate::surface::escape;

const SEARCH_TARGETS: &str = ".divide-y li";
const JSON_OVERLAY: &str = "site-json-modal";
const EDIT_BUTTON: &str = "edit-json-btn";
const SAVE_BUTTON: &str = "save-json-btn";

#[derive(Debug, Default)]
pub struct SitesView;

impl View for SitesView {
    fn title(&self) -> &'static str {
        "Sites"
    }

    fn render(&mut self, cx: &mut ViewContext<'_>) -> Result<(), ViewError> {
        cx.mount("<div class=\"p-6\"><p class=\"text-gray-500\">Loading sites…</p></div>")?;
        cx.fetch("sites", Request::get("/api/sites"));
        Ok(())
    }

    fn on_response(
        &mut self,
        key: &str,
        result: Result<Payload, ApiError>,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        if key == "sites" {
            let sites = match result.and_then(Payload::into_json) {
                Ok(value) => expect_array(value, "sites")?,
                Err(err) => return cx.show_error("sites", &err),
            };
            let items: String = sites.iter().map(site_item).collect();
            let markup = formatdoc! {r#"
                <div class="p-6">
                  <h1 class="text-2xl font-bold mb-4">Sites</h1>
                  <ul class="divide-y bg-white rounded-xl">{items}</ul>
                </div>
                "#,
                items = items,
            };
            cx.mount(&markup)?;
            cx.install_search(|surface, term| search::filter_list(surface, SEARCH_TARGETS, term));
        } else if let Some(domain) = key.strip_prefix("site:") {
            match result.and_then(Payload::into_json) {
                Ok(config) => show_json(cx, domain, &config),
                Err(err) => cx.notify(format!("Could not load {domain}: {err}")),
            }
        } else if let Some(domain) = key.strip_prefix("saved:") {
            match result {
                Ok(_) => cx.notify("Configuration updated. Restarting server..."),
                Err(err) => cx.notify(format!("Could not save {domain}: {err}")),
            }
        } else if let Some(domain) = key.strip_prefix("deleted:") {
            match result {
                Ok(_) => {
                    cx.notify("Site deleted. Restarting server...");
                    cx.request_refresh();
                }
                Err(err) => cx.notify(format!("Could not delete {domain}: {err}")),
            }
        }
        Ok(())
    }

    fn on_action(
        &mut self,
        action: &ElementAction,
        cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        let Some(domain) = action.data("domain").filter(|d| !d.is_empty()) else {
            return Ok(());
        };
        let domain = domain.to_string();
        match action.name.as_str() {
            "view-json" => {
                cx.fetch(
                    format!("site:{domain}"),
                    Request::get(format!("/api/sites/{}", encode_component(&domain))),
                );
            }
            "delete-site" => {
                let target = domain.clone();
                confirm(
                    cx,
                    "confirm-delete-site",
                    &format!("Delete {domain}"),
                    &format!("Are you sure you want to delete {domain}?"),
                    "Delete",
                    move |cx| {
                        cx.fetch(
                            format!("deleted:{target}"),
                            Request::delete(format!("/api/sites/{}", encode_component(&target))),
                        );
                    },
                );
            }
            _ => {}
        }
        Ok(())
    }
}

fn site_item(site: &Value) -> String {
    let domain = escape(&display_value(site.get("domain")));
    let root = display_value(site.get("root_directory"));
    let proxy = display_value(site.get("proxy_pass"));
    let target = if proxy.is_empty() { root } else { format!("proxy → {proxy}") };
    formatdoc! {r#"
        <li class="py-3 px-4 flex justify-between items-center">
          <div><p class="font-medium">{domain}</p><p class="text-sm text-gray-500">port {port} | {target}</p></div>
          <div class="space-x-2"><button class="view-json" data-action="view-json" data-domain="{domain}">View JSON</button> <button class="delete-site" data-action="delete-site" data-domain="{domain}">Delete</button></div>
        </li>
        "#,
        domain = domain,
        port = escape(&display_value(site.get("port"))),
        target = escape(&target),
    }
}

/// Shows a site's configuration with an Edit/Save flow.
fn show_json(cx: &mut ViewContext<'_>, domain: &str, config: &Value) {
    let pretty = serde_json::to_string_pretty(config).unwrap_or_else(|_| config.to_string());
    let mounted = SharedId::default();

    let edit = {
        let mounted = mounted.clone();
        let domain = domain.to_string();
        let pretty = pretty.clone();
        move |cx: &mut ViewContext<'_>| {
            let id = mounted.get();
            cx.overlays
                .set_title(&id, &format!("Editing {domain}'s JSON"), &mut *cx.surface);
            cx.overlays.toggle_button(&id, EDIT_BUTTON, false, &mut *cx.surface);
            cx.overlays.toggle_button(&id, SAVE_BUTTON, true, &mut *cx.surface);
            cx.overlays.set_content(
                &id,
                &format!(
                    "<textarea id=\"json-editor\" class=\"w-full h-80 p-2 border rounded\">{}</textarea>",
                    escape(&pretty)
                ),
                &mut *cx.surface,
            );
        }
    };

    let save = {
        let mounted = mounted.clone();
        let domain = domain.to_string();
        move |cx: &mut ViewContext<'_>| {
            let id = mounted.get();
            let Some(content) = cx.overlays.content_node(&id) else {
                return;
            };
            let Some(editor) = cx.surface.query_within(content, "textarea").into_iter().next() else {
                return;
            };
            let edited = cx.surface.value(editor);
            if let Err(err) = serde_json::from_str::<Value>(&edited) {
                cx.notify(format!("Invalid JSON: {err}"));
                return;
            }
            cx.fetch(
                format!("saved:{domain}"),
                Request::put(
                    format!("/api/sites/{}", encode_component(&domain)),
                    RequestBody::Text(edited),
                ),
            );
            cx.hide_overlay(&id);
        }
    };

    let request = ShowRequest::new(format!("{domain}'s JSON"))
        .id(JSON_OVERLAY)
        .content(format!(
            "<pre id=\"json-content\" class=\"whitespace-pre-wrap bg-gray-100 p-2 rounded\">{}</pre>",
            escape(&pretty)
        ))
        .button(ButtonSpec::new(EDIT_BUTTON, "Edit", edit).icon("edit"))
        .button(ButtonSpec::new(SAVE_BUTTON, "Save Changes", save).icon("save").hidden())
        .button(mounted.close_button());
    let shown = cx.show_overlay(request);
    mounted.set(shown);
}
