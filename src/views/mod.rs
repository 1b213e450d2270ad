//! View modules and the context they render through.
//!
//! A view renders into the page container, enqueues API requests, and reacts
//! to their responses and to activated elements inside its markup. It opts
//! into global search by installing a callback through `ViewContext`.

pub mod config;
pub mod home;
pub mod logs;
pub mod metrics;
pub mod plugins;
pub mod sites;
pub mod tools;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

use crate::api::{Payload, Request, Ticket};
use crate::error::{ApiError, ViewError};
use crate::overlay::{ButtonSpec, OverlayManager, ShowRequest};
use crate::router::{Router, SearchHandle};
use crate::state::PageState;
use crate::surface::{NodeId, ViewSurface, escape};

pub trait View {
    /// Label shown in the navigation bar.
    fn title(&self) -> &'static str;

    /// Starts rendering into the container. Data usually arrives later through
    /// `on_response`.
    fn render(&mut self, cx: &mut ViewContext<'_>) -> Result<(), ViewError>;

    fn on_response(
        &mut self,
        _key: &str,
        _result: Result<Payload, ApiError>,
        _cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        Ok(())
    }

    fn on_action(
        &mut self,
        _action: &ElementAction,
        _cx: &mut ViewContext<'_>,
    ) -> Result<(), ViewError> {
        Ok(())
    }
}

/// An activated element inside the page: its `data-action` (or id) and its
/// `data-*` attributes with the prefix stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementAction {
    pub name: String,
    pub node: NodeId,
    pub data: BTreeMap<String, String>,
}

impl ElementAction {
    /// Builds the action for `node`, or `None` when it carries neither a
    /// `data-action` nor an id.
    pub fn from_node(surface: &dyn ViewSurface, node: NodeId) -> Option<Self> {
        let attributes = surface.attributes(node);
        let lookup = |name: &str| {
            attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };
        let name = lookup("data-action").or_else(|| lookup("id"))?;
        let data = attributes
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix("data-")
                    .filter(|stripped| *stripped != "action")
                    .map(|stripped| (stripped.to_string(), value.clone()))
            })
            .collect();
        Some(Self { name, node, data })
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

/// A request waiting to be handed to the API client.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub ticket: Ticket,
    pub request: Request,
}

pub struct ViewContext<'a> {
    pub surface: &'a mut dyn ViewSurface,
    pub overlays: &'a mut OverlayManager,
    pub page: &'a mut PageState,
    outbox: &'a mut Vec<Outgoing>,
    container: &'a str,
    search_term: &'a str,
    pub(crate) search: SearchHandle,
    pub(crate) generation: u64,
    /// Index of the view this context acts for.
    pub(crate) view: Option<usize>,
    /// Whether that view currently owns the page container.
    pub(crate) attached: bool,
    /// Requests stay addressed to `view` even after navigation.
    pub(crate) pinned: bool,
}

impl<'a> ViewContext<'a> {
    pub fn new(
        surface: &'a mut dyn ViewSurface,
        overlays: &'a mut OverlayManager,
        page: &'a mut PageState,
        outbox: &'a mut Vec<Outgoing>,
        container: &'a str,
        search_term: &'a str,
    ) -> Self {
        Self {
            surface,
            overlays,
            page,
            outbox,
            container,
            search_term,
            search: SearchHandle::default(),
            generation: 0,
            view: None,
            attached: true,
            pinned: false,
        }
    }

    /// Selector of the page container.
    pub fn container(&self) -> &str {
        self.container
    }

    /// The normalized global search term at the time of the call.
    pub fn search_term(&self) -> &str {
        self.search_term
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The page container. Fails with `Detached` while acting for a view
    /// that has been navigated away from.
    pub fn container_node(&self) -> Result<NodeId, ViewError> {
        if !self.attached {
            return Err(ViewError::Detached);
        }
        self.surface
            .query(self.container)
            .into_iter()
            .next()
            .ok_or_else(|| ViewError::MissingContainer(self.container.to_string()))
    }

    /// Replaces the container's content with `markup`.
    pub fn mount(&mut self, markup: &str) -> Result<NodeId, ViewError> {
        let container = self.container_node()?;
        self.surface.set_markup(container, markup);
        Ok(container)
    }

    /// Enqueues `request`; its outcome reaches the active view's
    /// `on_response` under `key`, unless the page navigated in between.
    /// Requests issued from overlay buttons always reach the view that opened
    /// the overlay.
    pub fn fetch(&mut self, key: impl Into<String>, request: Request) {
        let owner = if self.pinned { self.view } else { None };
        self.outbox.push(Outgoing {
            ticket: Ticket {
                generation: self.generation,
                key: key.into(),
                owner,
            },
            request,
        });
    }

    /// Registers the view's search callback on the current record and applies
    /// the term already typed, if any. Returns `false` when the record was
    /// replaced in the meantime.
    pub fn install_search<F>(&mut self, mut apply: F) -> bool
    where
        F: FnMut(&mut dyn ViewSurface, &str) + 'static,
    {
        if !self.search.is_current() {
            return false;
        }
        if !self.search_term.is_empty() {
            apply(&mut *self.surface, self.search_term);
        }
        self.search.install(apply)
    }

    /// Shows an overlay owned by the view this context acts for.
    pub fn show_overlay(&mut self, request: ShowRequest) -> String {
        let id = self.overlays.show(request, &mut *self.surface);
        self.overlays.set_owner(&id, self.view);
        id
    }

    pub fn hide_overlay(&mut self, id: &str) -> bool {
        self.overlays.hide(id, &mut *self.surface)
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.page.notify(message);
    }

    /// Re-renders the active path on the next tick. Ignored for a view that
    /// is no longer on screen.
    pub fn request_refresh(&mut self) {
        if !self.attached {
            tracing::debug!("refresh skipped, view not on screen");
            return;
        }
        self.page.request_refresh();
    }

    /// Current value of the element with `id`, empty when absent.
    pub fn input_value(&self, id: &str) -> String {
        self.surface
            .by_id(id)
            .map(|node| self.surface.value(node))
            .unwrap_or_default()
    }

    /// Renders an inline failure notice into the container.
    pub fn show_error(&mut self, what: &str, err: &dyn std::fmt::Display) -> Result<(), ViewError> {
        let markup = format!(
            "<div class=\"p-6 text-red-600 error\"><p>Could not load {}.</p><p class=\"text-sm\">{}</p></div>",
            escape(what),
            escape(&err.to_string()),
        );
        self.mount(&markup)?;
        Ok(())
    }
}

/// Registers every dashboard view; `/` doubles as the fallback route.
pub fn register_default_routes(router: &mut Router) {
    router.register("/", Box::new(home::HomeView::default()));
    router.register("/metrics", Box::new(metrics::MetricsView::default()));
    router.register("/plugins", Box::new(plugins::PluginsView::default()));
    router.register("/sites", Box::new(sites::SitesView::default()));
    router.register("/logs", Box::new(logs::LogsView::default()));
    router.register("/config", Box::new(config::ConfigView::default()));
    router.register("/tools", Box::new(tools::ToolsView::default()));
    router.set_default("/");
}

/// The id an overlay was actually mounted under, shared with its button
/// handlers. Filled in right after `show`, since a taken id gets suffixed.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedId(Rc<RefCell<String>>);

impl SharedId {
    pub(crate) fn get(&self) -> String {
        self.0.borrow().clone()
    }

    pub(crate) fn set(&self, id: String) {
        *self.0.borrow_mut() = id;
    }

    /// A "Close" button hiding the overlay this id refers to.
    pub(crate) fn close_button(&self) -> ButtonSpec {
        let id = self.clone();
        ButtonSpec::new("closeBtn", "Close", move |cx| {
            cx.hide_overlay(&id.get());
        })
        .icon("close")
    }
}

/// Shows a confirmation overlay. `on_confirm` runs when the user accepts,
/// after which the overlay closes; "Cancel" only closes it.
pub(crate) fn confirm<F>(
    cx: &mut ViewContext<'_>,
    id: &str,
    title: &str,
    message: &str,
    confirm_label: &str,
    on_confirm: F,
) -> String
where
    F: Fn(&mut ViewContext<'_>) + 'static,
{
    let mounted = SharedId::default();
    let accept = mounted.clone();
    let cancel = mounted.clone();
    let request = ShowRequest::new(title)
        .id(id)
        .content(format!("<p>{}</p>", escape(message)))
        .button(ButtonSpec::new("confirm-btn", confirm_label, move |cx| {
            on_confirm(cx);
            cx.hide_overlay(&accept.get());
        }))
        .button(
            ButtonSpec::new("cancel-btn", "Cancel", move |cx| {
                cx.hide_overlay(&cancel.get());
            })
            .icon("close"),
        );
    let shown = cx.show_overlay(request);
    mounted.set(shown.clone());
    shown
}

/// Renders a JSON scalar the way a template would interpolate it.
pub(crate) fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Expects a JSON array, naming the payload in the error otherwise.
pub(crate) fn expect_array(value: Value, what: &'static str) -> Result<Vec<Value>, ViewError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        _ => Err(ViewError::Shape { what }),
    }
}
