//! The page session.
//!
//! `Shell` owns everything a page needs (document, router, search
//! broadcaster, overlay manager and API client) and exposes the input the
//! terminal delivers as plain operations: navigate, type, click, drag,
//! scroll and tick. Nothing in here knows about crossterm, so integration
//! tests drive a `Shell` directly.

use std::time::Instant;

use ratatui::layout::{Position, Rect};

use crate::api::ApiClient;
use crate::constants::{APP_CONTAINER, SEARCH_INPUT_ID};
use crate::error::NavigationError;
use crate::overlay::{DragOutcome, OverlayHit, OverlayManager};
use crate::router::Router;
use crate::search::SearchBroadcaster;
use crate::state::PageState;
use crate::surface::{Document, NodeId, ViewSurface};
use crate::views::{self, ElementAction, Outgoing, ViewContext};

const CHROME: &str = "<input id=\"globalSearch\" type=\"search\" placeholder=\"Search\"><div id=\"app\"></div>";

/// Which element receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    None,
    Search,
    Node(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Navigate(String),
    Search,
    Node(NodeId),
}

/// A clickable region recorded by the renderer. `overlay` names the overlay
/// whose body the region was painted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitRegion {
    pub rect: Rect,
    pub target: HitTarget,
    pub overlay: Option<String>,
}

pub struct Shell<C> {
    document: Document,
    router: Router,
    search: SearchBroadcaster,
    overlays: OverlayManager,
    page: PageState,
    client: C,
    outbox: Vec<Outgoing>,
    focus: Focus,
    hits: Vec<HitRegion>,
    scroll: u16,
}

impl<C: ApiClient> Shell<C> {
    /// A session with every dashboard view registered.
    pub fn new(client: C) -> Self {
        let mut router = Router::new();
        views::register_default_routes(&mut router);
        Self::with_router(client, router)
    }

    pub fn with_router(client: C, router: Router) -> Self {
        let mut document = Document::new();
        let root = document.root();
        document.set_markup(root, CHROME);
        let mut search = SearchBroadcaster::new(SEARCH_INPUT_ID);
        search.init(&document);
        Self {
            document,
            router,
            search,
            overlays: OverlayManager::new(),
            page: PageState::new(),
            client,
            outbox: Vec::new(),
            focus: Focus::None,
            hits: Vec::new(),
            scroll: 0,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut PageState {
        &mut self.page
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn search_term(&self) -> &str {
        self.search.term()
    }

    /// Raw text of the search input.
    pub fn search_input(&self) -> String {
        self.document
            .by_id(SEARCH_INPUT_ID)
            .map(|input| self.document.value(input))
            .unwrap_or_default()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn hits(&self) -> &[HitRegion] {
        &self.hits
    }

    /// Replaces the clickable regions after a redraw.
    pub fn set_hits(&mut self, hits: Vec<HitRegion>) {
        self.hits = hits;
    }

    /// Keeps the page scroll within the rendered content.
    pub fn clamp_scroll(&mut self, max: u16) {
        self.scroll = self.scroll.min(max);
    }

    /// Area overlays are laid out in.
    pub fn set_viewport(&mut self, area: Rect) {
        self.overlays.set_viewport(area, &mut self.document);
    }

    fn parts(&mut self) -> (&mut Router, ViewContext<'_>) {
        let cx = ViewContext::new(
            &mut self.document,
            &mut self.overlays,
            &mut self.page,
            &mut self.outbox,
            APP_CONTAINER,
            self.search.term(),
        );
        (&mut self.router, cx)
    }

    /// Hands queued requests to the client.
    fn flush(&mut self) {
        for outgoing in self.outbox.drain(..) {
            tracing::trace!(key = %outgoing.ticket.key, path = %outgoing.request.path, "send");
            self.client.send(outgoing.ticket, outgoing.request);
        }
    }

    pub fn navigate(&mut self, path: &str) -> Result<String, NavigationError> {
        self.scroll = 0;
        if matches!(self.focus, Focus::Node(_)) {
            self.focus = Focus::None;
        }
        let (router, mut cx) = self.parts();
        let result = router.navigate(path, &mut cx);
        self.flush();
        if let Err(err) = &result {
            self.page.notify(err.to_string());
        }
        result
    }

    /// Navigates to the `index`-th registered route.
    pub fn navigate_index(&mut self, index: usize) -> bool {
        let Some(pattern) = self.router.routes().get(index).map(|r| r.pattern.clone()) else {
            return false;
        };
        self.navigate(&pattern).is_ok()
    }

    /// Polls the client, delivers responses, honours refresh requests and
    /// advances overlay animations. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.overlays.tick(now, &mut self.document);
        for delivery in self.client.poll() {
            let (router, mut cx) = self.parts();
            changed |= router.deliver(&delivery.ticket, delivery.result, &mut cx);
        }
        if self.page.take_refresh()
            && let Some(path) = self.router.active_path().map(str::to_string)
        {
            let _ = self.navigate(&path);
            changed = true;
        }
        self.flush();
        changed
    }

    pub fn focus_search(&mut self) {
        self.focus = Focus::Search;
    }

    pub fn blur(&mut self) {
        self.focus = Focus::None;
    }

    /// Blurs the focused input, or closes the topmost open overlay.
    pub fn escape(&mut self) -> bool {
        if self.focus != Focus::None {
            self.focus = Focus::None;
            return true;
        }
        match self.overlays.topmost_open().map(str::to_string) {
            Some(id) => self.overlays.hide(&id, &mut self.document),
            None => false,
        }
    }

    pub fn type_char(&mut self, ch: char) -> bool {
        self.edit_focused(|value| value.push(ch))
    }

    pub fn type_str(&mut self, text: &str) -> bool {
        self.edit_focused(|value| value.push_str(text))
    }

    pub fn backspace(&mut self) -> bool {
        self.edit_focused(|value| {
            value.pop();
        })
    }

    /// Enter inserts a newline into a textarea and blurs any other input.
    pub fn enter(&mut self) -> bool {
        match self.focus {
            Focus::Node(node) if self.document.tag(node) == Some("textarea") => {
                self.edit_focused(|value| value.push('\n'))
            }
            Focus::None => false,
            _ => {
                self.focus = Focus::None;
                true
            }
        }
    }

    /// Replaces the whole search input value, as a paste would.
    pub fn set_search(&mut self, raw: &str) -> bool {
        self.focus = Focus::Search;
        self.edit_focused(|value| {
            value.clear();
            value.push_str(raw);
        })
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) -> bool {
        let node = match self.focus {
            Focus::None => return false,
            Focus::Search => match self.document.by_id(SEARCH_INPUT_ID) {
                Some(input) => input,
                None => return false,
            },
            Focus::Node(node) => node,
        };
        if !self.document.contains(node) {
            self.focus = Focus::None;
            return false;
        }
        let mut value = self.document.value(node);
        edit(&mut value);
        self.document.set_attribute(node, "value", &value);
        if self.focus == Focus::Search {
            self.search
                .on_input(&value, self.router.slot(), &mut self.document);
        }
        true
    }

    /// Activates an element of the page or an overlay body: toggles
    /// checkboxes, focuses inputs, follows links and hands everything else
    /// carrying an action to the active view.
    pub fn activate(&mut self, node: NodeId) -> bool {
        if !self.document.contains(node) {
            return false;
        }
        let tag = self.document.tag(node).unwrap_or_default().to_string();
        let kind = self.document.attr(node, "type").unwrap_or_default().to_string();
        match tag.as_str() {
            "input" if kind == "checkbox" => {
                if self.document.attr(node, "checked").is_some() {
                    self.document.remove_attribute(node, "checked");
                } else {
                    self.document.set_attribute(node, "checked", "");
                }
            }
            "input" | "textarea" => {
                self.focus = if self.document.attr(node, "id") == Some(SEARCH_INPUT_ID) {
                    Focus::Search
                } else {
                    Focus::Node(node)
                };
                return true;
            }
            "a" => {
                if let Some(href) = self.document.attr(node, "href").map(str::to_string) {
                    return self.navigate(&href).is_ok();
                }
            }
            _ => {}
        }
        let Some(action) = ElementAction::from_node(&self.document, node) else {
            return false;
        };
        tracing::debug!(action = %action.name, "activate");
        let (router, mut cx) = self.parts();
        let handled = router.dispatch_action(&action, &mut cx);
        self.flush();
        handled
    }

    /// Runs the handler of a visible header button on behalf of the view that
    /// opened the overlay, even after the page navigated elsewhere.
    pub fn press_button(&mut self, overlay: &str, button: &str) -> bool {
        let Some(handler) = self.overlays.button_handler(overlay, button) else {
            return false;
        };
        let owner = self.overlays.owner(overlay);
        tracing::debug!(overlay_id = %overlay, button, ?owner, "overlay button");
        let (router, mut cx) = self.parts();
        router.bind_overlay_context(owner, &mut cx);
        handler(&mut cx);
        self.flush();
        true
    }

    pub fn pointer_down(&mut self, column: u16, row: u16) -> bool {
        match self.overlays.hit_test(column, row) {
            Some(OverlayHit::Handle(id)) => self.overlays.begin_drag(&id, row, &mut self.document),
            Some(OverlayHit::Button { overlay, button }) => self.press_button(&overlay, &button),
            Some(OverlayHit::Minimized(id)) => self.overlays.click(&id, &mut self.document),
            Some(OverlayHit::Body(id)) => match self.hit_at(column, row, Some(&id)) {
                Some(target) => self.activate_target(target),
                None => false,
            },
            None => match self.hit_at(column, row, None) {
                Some(target) => self.activate_target(target),
                None => {
                    if self.focus != Focus::None {
                        self.focus = Focus::None;
                        return true;
                    }
                    false
                }
            },
        }
    }

    pub fn pointer_drag(&mut self, row: u16) -> bool {
        self.overlays.drag_to(row, &mut self.document).is_some()
    }

    pub fn pointer_up(&mut self) -> Option<DragOutcome> {
        self.overlays.end_drag(&mut self.document)
    }

    fn hit_at(&self, column: u16, row: u16, overlay: Option<&str>) -> Option<HitTarget> {
        let point = Position::new(column, row);
        self.hits
            .iter()
            .rev()
            .find(|hit| hit.overlay.as_deref() == overlay && hit.rect.contains(point))
            .map(|hit| hit.target.clone())
    }

    fn activate_target(&mut self, target: HitTarget) -> bool {
        match target {
            HitTarget::Navigate(path) => self.navigate(&path).is_ok(),
            HitTarget::Search => {
                self.focus = Focus::Search;
                true
            }
            HitTarget::Node(node) => self.activate(node),
        }
    }

    pub fn minimize_overlay(&mut self, id: &str) -> bool {
        self.overlays.minimize(id, &mut self.document)
    }

    pub fn restore_overlay(&mut self, id: &str) -> bool {
        self.overlays.restore(id, &mut self.document)
    }

    /// Scrolls the topmost open overlay, or the page when none is open.
    pub fn scroll_by(&mut self, delta: i32) {
        match self.overlays.topmost_open().map(str::to_string) {
            Some(id) => self.overlays.scroll_by(&id, delta),
            None => {
                let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(u16::MAX));
                self.scroll = next as u16;
            }
        }
    }

    pub fn request_quit(&mut self) {
        self.page.request_quit();
    }

    pub fn quit_requested(&self) -> bool {
        self.page.quit_requested()
    }
}
