//! View router and the CurrentView record.
//!
//! The router owns exactly one `CurrentView` record at a time. Every
//! navigation swaps in a fresh, empty record before the target view renders,
//! so a search callback installed by a previous view can never fire again:
//! its `SearchHandle` points at a record nobody holds any more.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::api::{Payload, Ticket};
use crate::error::{ApiError, NavigationError};
use crate::surface::ViewSurface;
use crate::views::{ElementAction, View, ViewContext};

/// Search-application callback registered by the active view.
pub type SearchCallback = Box<dyn FnMut(&mut dyn ViewSurface, &str)>;

#[derive(Default)]
pub struct CurrentView {
    apply_search: Option<SearchCallback>,
}

impl std::fmt::Debug for CurrentView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentView")
            .field("apply_search", &self.apply_search.is_some())
            .finish()
    }
}

/// Single-slot holder of the CurrentView record.
#[derive(Debug, Default)]
pub struct CurrentViewSlot {
    current: Rc<RefCell<CurrentView>>,
}

impl CurrentViewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the current record and installs a fresh empty one. Handles to the
    /// old record go dead immediately.
    pub fn replace(&mut self) -> SearchHandle {
        self.current = Rc::new(RefCell::new(CurrentView::default()));
        self.handle()
    }

    pub fn handle(&self) -> SearchHandle {
        SearchHandle(Rc::downgrade(&self.current))
    }

    pub fn has_callback(&self) -> bool {
        self.current.borrow().apply_search.is_some()
    }

    /// Runs the registered callback with `term`. Returns `false` when the
    /// record holds none.
    pub fn dispatch(&self, surface: &mut dyn ViewSurface, term: &str) -> bool {
        // Taken out for the call so the callback may itself re-register.
        let taken = self.current.borrow_mut().apply_search.take();
        let Some(mut callback) = taken else {
            return false;
        };
        callback(surface, term);
        let mut record = self.current.borrow_mut();
        if record.apply_search.is_none() {
            record.apply_search = Some(callback);
        }
        true
    }
}

/// Weak handle a view uses to register its search callback on the record that
/// was current when it started rendering.
#[derive(Debug, Clone, Default)]
pub struct SearchHandle(Weak<RefCell<CurrentView>>);

impl SearchHandle {
    /// Installs `callback` if the record is still current. Returns `false` when
    /// the view has been navigated away from in the meantime.
    pub fn install<F>(&self, callback: F) -> bool
    where
        F: FnMut(&mut dyn ViewSurface, &str) + 'static,
    {
        self.install_boxed(Box::new(callback))
    }

    pub fn install_boxed(&self, callback: SearchCallback) -> bool {
        match self.0.upgrade() {
            Some(record) => {
                record.borrow_mut().apply_search = Some(callback);
                true
            }
            None => {
                tracing::debug!("search callback dropped, record already replaced");
                false
            }
        }
    }

    pub fn is_current(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// A registered (path, view) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: String,
    view: usize,
}

pub struct Router {
    routes: Vec<Route>,
    views: Vec<Box<dyn View>>,
    default_path: Option<String>,
    active: Option<usize>,
    active_path: Option<String>,
    slot: CurrentViewSlot,
    generation: u64,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            views: Vec::new(),
            default_path: None,
            active: None,
            active_path: None,
            slot: CurrentViewSlot::new(),
            generation: 0,
        }
    }

    /// Registers `view` under `path`. Registering a path twice replaces the
    /// earlier view for that path.
    pub fn register(&mut self, path: &str, view: Box<dyn View>) {
        let pattern = normalize_path(path);
        let existing = self
            .routes
            .iter()
            .find(|route| route.pattern == pattern)
            .map(|route| route.view);
        match existing {
            Some(idx) => self.views[idx] = view,
            None => {
                self.views.push(view);
                let view = self.views.len() - 1;
                self.routes.push(Route { pattern, view });
            }
        }
    }

    /// Designates the path unknown paths fall back to.
    pub fn set_default(&mut self, path: &str) {
        self.default_path = Some(normalize_path(path));
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn view_title(&self, path: &str) -> Option<&'static str> {
        let pattern = normalize_path(path);
        let route = self.routes.iter().find(|route| route.pattern == pattern)?;
        Some(self.views[route.view].title())
    }

    /// Resolves `path` to the registered pattern that will render, applying
    /// the default fallback.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let pattern = normalize_path(path);
        self.routes
            .iter()
            .find(|route| route.pattern == pattern)
            .or_else(|| {
                let fallback = self.default_path.as_deref()?;
                self.routes.iter().find(|route| route.pattern == fallback)
            })
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active_path.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn slot(&self) -> &CurrentViewSlot {
        &self.slot
    }

    pub fn search_handle(&self) -> SearchHandle {
        self.slot.handle()
    }

    /// Replaces the CurrentView record and renders the view for `path`.
    /// Returns the pattern that rendered. A view that fails to render leaves
    /// an empty record behind; the failure is logged, not returned.
    pub fn navigate(
        &mut self,
        path: &str,
        cx: &mut ViewContext<'_>,
    ) -> Result<String, NavigationError> {
        let resolved = self.resolve(path).cloned();
        let handle = self.slot.replace();
        self.generation += 1;
        cx.attached = true;
        cx.pinned = false;

        let Some(route) = resolved else {
            self.active = None;
            self.active_path = None;
            if let Ok(container) = cx.container_node() {
                cx.surface.set_markup(container, "");
            }
            tracing::warn!(path, "no route and no default, nothing rendered");
            return Err(NavigationError::NoRoute(path.to_string()));
        };
        if route.pattern != normalize_path(path) {
            tracing::debug!(path, fallback = %route.pattern, "unknown path, using default route");
        }

        self.active = Some(route.view);
        self.active_path = Some(route.pattern.clone());
        cx.search = handle;
        cx.generation = self.generation;
        cx.view = Some(route.view);
        tracing::info!(path = %route.pattern, generation = self.generation, "navigate");

        if let Err(err) = self.views[route.view].render(cx) {
            tracing::warn!(path = %route.pattern, error = %err, "view render failed");
        }
        Ok(route.pattern)
    }

    /// Hands an API response to the view it belongs to. Owned tickets go to
    /// their owner whatever is on screen. Others go to the active view, and
    /// are dropped with `false` when issued under an older generation.
    pub fn deliver(
        &mut self,
        ticket: &Ticket,
        result: Result<Payload, ApiError>,
        cx: &mut ViewContext<'_>,
    ) -> bool {
        let key = ticket.key.as_str();
        let idx = match ticket.owner {
            Some(owner) if owner < self.views.len() => {
                self.bind_owner(owner, cx);
                owner
            }
            _ => {
                if ticket.generation != self.generation {
                    tracing::debug!(
                        key,
                        generation = ticket.generation,
                        current = self.generation,
                        "dropping stale response"
                    );
                    return false;
                }
                let Some(idx) = self.active else {
                    return false;
                };
                self.bind_active(idx, cx);
                idx
            }
        };
        if let Err(err) = self.views[idx].on_response(key, result, cx) {
            tracing::warn!(key, error = %err, "view failed to handle response");
        }
        true
    }

    /// Routes an activated element inside the container to the active view.
    pub fn dispatch_action(&mut self, action: &ElementAction, cx: &mut ViewContext<'_>) -> bool {
        let Some(idx) = self.active else {
            return false;
        };
        self.bind_active(idx, cx);
        if let Err(err) = self.views[idx].on_action(action, cx) {
            tracing::warn!(action = %action.name, error = %err, "view action failed");
        }
        true
    }

    /// Prepares `cx` for an overlay button handler. The handler acts for the
    /// view that opened the overlay, falling back to the active view.
    pub fn bind_overlay_context(&self, owner: Option<usize>, cx: &mut ViewContext<'_>) {
        match owner.filter(|&idx| idx < self.views.len()).or(self.active) {
            Some(idx) => self.bind_owner(idx, cx),
            None => {
                cx.search = self.slot.handle();
                cx.generation = self.generation;
            }
        }
    }

    fn bind_active(&self, idx: usize, cx: &mut ViewContext<'_>) {
        cx.search = self.slot.handle();
        cx.generation = self.generation;
        cx.view = Some(idx);
        cx.attached = true;
        cx.pinned = false;
    }

    /// Requests made through `cx` keep reaching `owner`; the page container
    /// and search are only available while `owner` is on screen.
    fn bind_owner(&self, owner: usize, cx: &mut ViewContext<'_>) {
        let attached = self.active == Some(owner);
        cx.search = if attached {
            self.slot.handle()
        } else {
            SearchHandle::default()
        };
        cx.generation = self.generation;
        cx.view = Some(owner);
        cx.attached = attached;
        cx.pinned = true;
    }
}

/// Strips the query string, fragment and trailing slashes; an empty result
/// becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayManager;
    use crate::state::PageState;
    use crate::surface::Document;
    use crate::views::Outgoing;
    use std::cell::Cell;

    /// Records renders and installs a search callback that counts calls.
    struct Recorder {
        title: &'static str,
        renders: Rc<Cell<u32>>,
        searches: Rc<Cell<u32>>,
        install_on_render: bool,
    }

    impl Recorder {
        fn new(title: &'static str, install_on_render: bool) -> (Self, Rc<Cell<u32>>, Rc<Cell<u32>>) {
            let renders = Rc::new(Cell::new(0));
            let searches = Rc::new(Cell::new(0));
            (
                Self {
                    title,
                    renders: renders.clone(),
                    searches: searches.clone(),
                    install_on_render,
                },
                renders,
                searches,
            )
        }
    }

    impl View for Recorder {
        fn title(&self) -> &'static str {
            self.title
        }

        fn render(&mut self, cx: &mut ViewContext<'_>) -> Result<(), crate::error::ViewError> {
            self.renders.set(self.renders.get() + 1);
            if self.install_on_render {
                let searches = self.searches.clone();
                cx.install_search(move |_, _| searches.set(searches.get() + 1));
            } else {
                cx.fetch("data", crate::api::Request::get("/api/data"));
            }
            Ok(())
        }

        fn on_response(
            &mut self,
            _key: &str,
            _result: Result<Payload, ApiError>,
            cx: &mut ViewContext<'_>,
        ) -> Result<(), crate::error::ViewError> {
            cx.notify(self.title);
            let searches = self.searches.clone();
            cx.install_search(move |_, _| searches.set(searches.get() + 1));
            Ok(())
        }
    }

    struct Fixture {
        doc: Document,
        overlays: OverlayManager,
        page: PageState,
        outbox: Vec<Outgoing>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut doc = Document::new();
            let root = doc.root();
            let app = doc.create_element(root, "div");
            doc.set_attribute(app, "id", "app");
            Self {
                doc,
                overlays: OverlayManager::new(),
                page: PageState::new(),
                outbox: Vec::new(),
            }
        }

        fn cx(&mut self) -> ViewContext<'_> {
            ViewContext::new(
                &mut self.doc,
                &mut self.overlays,
                &mut self.page,
                &mut self.outbox,
                "#app",
                "",
            )
        }
    }

    #[test]
    fn normalize_path_variants() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/sites/"), "/sites");
        assert_eq!(normalize_path("logs?start=1"), "/logs");
    }

    #[test]
    fn unknown_path_falls_back_to_default() {
        let mut fx = Fixture::new();
        let mut router = Router::new();
        let (home, home_renders, _) = Recorder::new("Home", true);
        router.register("/", Box::new(home));
        router.set_default("/");
        let mut cx = fx.cx();
        assert_eq!(router.navigate("/nope", &mut cx), Ok("/".to_string()));
        assert_eq!(home_renders.get(), 1);
        assert_eq!(router.active_path(), Some("/"));
    }

    #[test]
    fn unknown_path_without_default_clears_container() {
        let mut fx = Fixture::new();
        let app = fx.doc.by_id("app").unwrap();
        fx.doc.set_markup(app, "<p>old</p>");
        let mut router = Router::new();
        let (home, _, _) = Recorder::new("Home", true);
        router.register("/", Box::new(home));
        let mut cx = fx.cx();
        assert_eq!(
            router.navigate("/nope", &mut cx),
            Err(NavigationError::NoRoute("/nope".to_string()))
        );
        assert!(!router.slot().has_callback());
        assert_eq!(fx.doc.text(app), "");
    }

    #[test]
    fn navigation_replaces_record_before_render() {
        let mut fx = Fixture::new();
        let mut router = Router::new();
        let (a, _, a_searches) = Recorder::new("A", true);
        let (b, _, b_searches) = Recorder::new("B", true);
        router.register("/a", Box::new(a));
        router.register("/b", Box::new(b));

        router.navigate("/a", &mut fx.cx()).unwrap();
        let stale = router.search_handle();
        assert!(router.slot().dispatch(&mut fx.doc, "x"));
        assert_eq!(a_searches.get(), 1);

        router.navigate("/b", &mut fx.cx()).unwrap();
        assert!(!stale.is_current());
        assert!(!stale.install(|_, _| {}));
        assert!(router.slot().dispatch(&mut fx.doc, "x"));
        assert_eq!(a_searches.get(), 1);
        assert_eq!(b_searches.get(), 1);
    }

    #[test]
    fn stale_response_never_reaches_new_view() {
        let mut fx = Fixture::new();
        let mut router = Router::new();
        let (a, _, a_searches) = Recorder::new("A", false);
        let (b, _, b_searches) = Recorder::new("B", true);
        router.register("/a", Box::new(a));
        router.register("/b", Box::new(b));

        router.navigate("/a", &mut fx.cx()).unwrap();
        let ticket = fx.outbox.pop().unwrap().ticket;
        router.navigate("/b", &mut fx.cx()).unwrap();

        let delivered = router.deliver(&ticket, Ok(Payload::Text(String::new())), &mut fx.cx());
        assert!(!delivered);
        router.slot().dispatch(&mut fx.doc, "term");
        assert_eq!(a_searches.get(), 0);
        assert_eq!(b_searches.get(), 1);
    }

    #[test]
    fn view_without_search_hook_is_a_noop() {
        let mut fx = Fixture::new();
        let mut router = Router::new();
        let (a, _, _) = Recorder::new("A", false);
        router.register("/a", Box::new(a));
        router.navigate("/a", &mut fx.cx()).unwrap();
        assert!(!router.slot().dispatch(&mut fx.doc, "x"));
    }

    #[test]
    fn registering_a_path_again_replaces_its_view() {
        let mut fx = Fixture::new();
        let mut router = Router::new();
        let (old, old_renders, _) = Recorder::new("Old", true);
        let (new, new_renders, _) = Recorder::new("New", true);
        router.register("/a", Box::new(old));
        router.register("/a/", Box::new(new));
        assert_eq!(router.routes().len(), 1);
        assert_eq!(router.views.len(), 1);
        assert_eq!(router.view_title("/a"), Some("New"));
        router.navigate("/a", &mut fx.cx()).unwrap();
        assert_eq!(old_renders.get(), 0);
        assert_eq!(new_renders.get(), 1);
    }

    #[test]
    fn owned_response_reaches_its_view_after_navigation() {
        let mut fx = Fixture::new();
        let mut router = Router::new();
        let (a, _, a_searches) = Recorder::new("A", false);
        let (b, _, b_searches) = Recorder::new("B", true);
        router.register("/a", Box::new(a));
        router.register("/b", Box::new(b));

        router.navigate("/a", &mut fx.cx()).unwrap();
        let mut cx = fx.cx();
        router.bind_overlay_context(Some(0), &mut cx);
        cx.fetch("deleted", crate::api::Request::delete("/api/x"));
        let ticket = fx.outbox.pop().unwrap().ticket;
        assert_eq!(ticket.owner, Some(0));

        router.navigate("/b", &mut fx.cx()).unwrap();
        assert!(router.deliver(&ticket, Ok(Payload::Text(String::new())), &mut fx.cx()));
        assert_eq!(fx.page.status(), Some("A"));

        // Detached, so the owner cannot claim the search record.
        router.slot().dispatch(&mut fx.doc, "term");
        assert_eq!(a_searches.get(), 0);
        assert_eq!(b_searches.get(), 1);
    }
}
