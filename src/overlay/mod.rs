//! Floating bottom-sheet overlays: creation, drag-to-minimize, per-category
//! stacking of minimized widgets, restore and animated close.
//!
//! Each overlay moves through `Open -> Dragging -> Minimized -> Open` and is
//! removed by `hide`. The manager mirrors every change into the view surface
//! (nodes, transform and slot styles, text-selection flag) and exposes a
//! geometric layout for the terminal renderer.

pub mod drag;
pub mod registry;

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use ratatui::layout::{Position, Rect};

use crate::constants::{
    CLOSE_ANIMATION, DEFAULT_CATEGORY, DEFAULT_OVERLAY_ID, MAX_DRAG_OFFSET_PERCENT,
    MINIMIZED_HEIGHT, MINIMIZED_WIDTH, OVERLAY_HEIGHT_PERCENT, OVERLAY_MIN_HEIGHT,
};
use crate::surface::{NodeId, ViewSurface};
use crate::views::ViewContext;

pub use drag::{DragGesture, DragOutcome};
pub use registry::{MinimizedRegistry, slot_left};

/// Click handler attached to an overlay header button.
pub type ButtonHandler = Rc<dyn Fn(&mut ViewContext<'_>)>;

#[derive(Clone)]
pub struct ButtonSpec {
    pub id: String,
    pub text: String,
    pub icon: Option<String>,
    pub visible: bool,
    pub handler: ButtonHandler,
}

impl ButtonSpec {
    pub fn new<F>(id: impl Into<String>, text: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut ViewContext<'_>) + 'static,
    {
        Self {
            id: id.into(),
            text: text.into(),
            icon: None,
            visible: true,
            handler: Rc::new(handler),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Text shown on the button, prefixed by the icon glyph when known.
    pub fn label(&self) -> String {
        match self.icon.as_deref().and_then(icon_glyph) {
            Some(glyph) => format!("{glyph} {}", self.text),
            None => self.text.clone(),
        }
    }
}

impl fmt::Debug for ButtonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonSpec")
            .field("id", &self.id)
            .field("text", &self.text)
            .field("icon", &self.icon)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}

fn icon_glyph(name: &str) -> Option<&'static str> {
    match name {
        "close" => Some("×"),
        "edit" => Some("✎"),
        "save" => Some("✔"),
        "delete" => Some("✖"),
        "refresh" => Some("↻"),
        _ => None,
    }
}

/// Parameters of `OverlayManager::show`.
#[derive(Debug, Clone, Default)]
pub struct ShowRequest {
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub buttons: Vec<ButtonSpec>,
    pub category: Option<String>,
}

impl ShowRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Pre-rendered markup placed in the overlay body.
    pub fn content(mut self, markup: impl Into<String>) -> Self {
        self.content = markup.into();
        self
    }

    pub fn button(mut self, button: ButtonSpec) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Open,
    Dragging,
    Minimized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closing {
    /// Hidden; the removal deadline is stamped by the next tick.
    Pending,
    Until(Instant),
}

#[derive(Debug)]
struct Overlay {
    title: String,
    category: String,
    buttons: Vec<ButtonSpec>,
    button_nodes: Vec<NodeId>,
    state: OverlayState,
    offset: u16,
    scroll: u16,
    restore_armed: bool,
    closing: Option<Closing>,
    owner: Option<usize>,
    node: NodeId,
    title_node: NodeId,
    buttons_node: NodeId,
    content_node: NodeId,
}

impl Overlay {
    fn is_active(&self) -> bool {
        self.closing.is_none() && matches!(self.state, OverlayState::Open | OverlayState::Dragging)
    }
}

/// Where a pointer landed on the overlay layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayHit {
    Handle(String),
    Button { overlay: String, button: String },
    Minimized(String),
    Body(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonDraw {
    pub id: String,
    pub label: String,
    pub rect: Rect,
}

/// Geometry of one mounted overlay for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDraw {
    pub id: String,
    pub title: String,
    pub state: OverlayState,
    pub rect: Rect,
    pub handle: Option<Rect>,
    pub header: Option<Rect>,
    pub body: Option<Rect>,
    pub buttons: Vec<ButtonDraw>,
    pub content: NodeId,
    pub scroll: u16,
}

#[derive(Debug)]
pub struct OverlayManager {
    overlays: BTreeMap<String, Overlay>,
    z_order: Vec<String>,
    registry: MinimizedRegistry,
    drag: Option<(String, DragGesture)>,
    viewport: Rect,
}

impl Default for OverlayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayManager {
    pub fn new() -> Self {
        Self {
            overlays: BTreeMap::new(),
            z_order: Vec::new(),
            registry: MinimizedRegistry::new(),
            drag: None,
            viewport: Rect::new(0, 0, 80, 24),
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Updates the area overlays are laid out in and re-applies slot
    /// positions of every minimized widget.
    pub fn set_viewport(&mut self, viewport: Rect, surface: &mut dyn ViewSurface) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        let categories: Vec<String> = self.registry.categories().map(str::to_string).collect();
        for category in categories {
            self.apply_slots(&category, surface);
        }
    }

    /// Mounts a new overlay and returns its id: the requested one, or a
    /// suffixed variant when that id is already taken.
    pub fn show(&mut self, request: ShowRequest, surface: &mut dyn ViewSurface) -> String {
        let requested = request
            .id
            .clone()
            .unwrap_or_else(|| DEFAULT_OVERLAY_ID.to_string());
        let id = self.unique_id(&requested, surface);
        if id != requested {
            tracing::debug!(requested = %requested, overlay_id = %id, "overlay id taken, suffixed");
        }
        let category = request
            .category
            .clone()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        let root = surface.root();
        let node = surface.create_element(root, "div");
        surface.set_attribute(node, "id", &id);
        surface.set_attribute(node, "class", "overlay");
        surface.set_attribute(node, "data-category", &category);
        surface.set_style(node, "transform", &translate(0));

        let handle = surface.create_element(node, "div");
        surface.set_attribute(handle, "class", "cursor-pointer drag-handle");
        let header = surface.create_element(node, "div");
        surface.set_attribute(header, "class", "overlay-header");
        let title_node = surface.create_element(header, "h2");
        surface.set_attribute(title_node, "id", &format!("{id}-title"));
        surface.set_text(title_node, &request.title);
        let buttons_node = surface.create_element(header, "div");
        surface.set_attribute(buttons_node, "id", &format!("{id}-buttons"));
        let content_node = surface.create_element(node, "div");
        surface.set_attribute(content_node, "id", &format!("{id}-content"));
        surface.set_markup(content_node, &request.content);

        self.overlays.insert(
            id.clone(),
            Overlay {
                title: request.title,
                category: category.clone(),
                buttons: Vec::new(),
                button_nodes: Vec::new(),
                state: OverlayState::Open,
                offset: 0,
                scroll: 0,
                restore_armed: false,
                closing: None,
                owner: None,
                node,
                title_node,
                buttons_node,
                content_node,
            },
        );
        self.z_order.push(id.clone());
        self.update_buttons(&id, request.buttons, surface);
        self.sync_selection(surface);
        tracing::debug!(overlay_id = %id, category = %category, "overlay shown");
        id
    }

    fn unique_id(&self, requested: &str, surface: &dyn ViewSurface) -> String {
        let taken = |candidate: &str| {
            self.overlays.contains_key(candidate) || surface.by_id(candidate).is_some()
        };
        if !taken(requested) {
            return requested.to_string();
        }
        (1u32..)
            .map(|n| format!("{requested}-{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| requested.to_string())
    }

    /// Starts the close animation. The overlay stays mounted until a `tick`
    /// at least `CLOSE_ANIMATION` after the hide was first observed.
    pub fn hide(&mut self, id: &str, surface: &mut dyn ViewSurface) -> bool {
        let Some(overlay) = self.overlays.get_mut(id) else {
            return false;
        };
        if overlay.closing.is_some() {
            return false;
        }
        let was_minimized = overlay.state == OverlayState::Minimized;
        overlay.closing = Some(Closing::Pending);
        overlay.restore_armed = false;
        overlay.offset = MAX_DRAG_OFFSET_PERCENT;
        surface.set_style(overlay.node, "transform", &translate(MAX_DRAG_OFFSET_PERCENT));
        if self.drag.as_ref().is_some_and(|(dragged, _)| dragged == id) {
            self.drag = None;
        }
        if was_minimized {
            self.unregister(id, surface);
        }
        self.sync_selection(surface);
        tracing::debug!(overlay_id = %id, "overlay hiding");
        true
    }

    /// Advances close animations; returns `true` when any overlay was removed.
    pub fn tick(&mut self, now: Instant, surface: &mut dyn ViewSurface) -> bool {
        let mut expired = Vec::new();
        for (id, overlay) in &mut self.overlays {
            match overlay.closing {
                Some(Closing::Pending) => overlay.closing = Some(Closing::Until(now + CLOSE_ANIMATION)),
                Some(Closing::Until(deadline)) if now >= deadline => expired.push(id.clone()),
                _ => {}
            }
        }
        for id in &expired {
            if let Some(overlay) = self.overlays.remove(id) {
                surface.remove(overlay.node);
            }
            self.z_order.retain(|existing| existing != id);
            tracing::debug!(overlay_id = %id, "overlay removed");
        }
        !expired.is_empty()
    }

    /// Whether a not-yet-closing overlay is mounted under `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.overlays
            .get(id)
            .is_some_and(|overlay| overlay.closing.is_none())
    }

    /// Whether `id` is mounted at all, including while it animates out.
    pub fn is_mounted(&self, id: &str) -> bool {
        self.overlays.contains_key(id)
    }

    pub fn state(&self, id: &str) -> Option<OverlayState> {
        self.overlays.get(id).map(|overlay| overlay.state)
    }

    pub fn offset(&self, id: &str) -> Option<u16> {
        self.overlays.get(id).map(|overlay| overlay.offset)
    }

    pub fn title(&self, id: &str) -> Option<&str> {
        self.overlays.get(id).map(|overlay| overlay.title.as_str())
    }

    pub fn category(&self, id: &str) -> Option<&str> {
        self.overlays.get(id).map(|overlay| overlay.category.as_str())
    }

    /// Index of the view whose button handlers the overlay runs.
    pub fn owner(&self, id: &str) -> Option<usize> {
        self.overlays.get(id).and_then(|overlay| overlay.owner)
    }

    pub fn set_owner(&mut self, id: &str, owner: Option<usize>) {
        if let Some(overlay) = self.overlays.get_mut(id) {
            overlay.owner = owner;
        }
    }

    pub fn content_node(&self, id: &str) -> Option<NodeId> {
        self.overlays.get(id).map(|overlay| overlay.content_node)
    }

    pub fn buttons(&self, id: &str) -> &[ButtonSpec] {
        self.overlays
            .get(id)
            .map_or(&[], |overlay| overlay.buttons.as_slice())
    }

    /// Ids in stacking order, bottom first.
    pub fn ids(&self) -> &[String] {
        &self.z_order
    }

    pub fn registry(&self) -> &MinimizedRegistry {
        &self.registry
    }

    pub fn minimized_slot(&self, id: &str) -> Option<usize> {
        self.registry.position(id)
    }

    pub fn minimized_left(&self, id: &str) -> Option<u16> {
        self.minimized_slot(id)
            .map(|slot| slot_left(slot, self.viewport.width))
    }

    /// Whether any overlay is open or being dragged.
    pub fn has_active(&self) -> bool {
        self.overlays.values().any(Overlay::is_active)
    }

    /// Topmost overlay that is open and not closing.
    pub fn topmost_open(&self) -> Option<&str> {
        self.z_order
            .iter()
            .rev()
            .find(|id| {
                self.overlays
                    .get(id.as_str())
                    .is_some_and(|overlay| overlay.closing.is_none() && overlay.state == OverlayState::Open)
            })
            .map(String::as_str)
    }

    pub fn set_title(&mut self, id: &str, title: &str, surface: &mut dyn ViewSurface) -> bool {
        let Some(overlay) = self.overlays.get_mut(id) else {
            return false;
        };
        overlay.title = title.to_string();
        surface.set_text(overlay.title_node, title);
        true
    }

    pub fn set_content(&mut self, id: &str, markup: &str, surface: &mut dyn ViewSurface) -> bool {
        let Some(overlay) = self.overlays.get_mut(id) else {
            return false;
        };
        overlay.scroll = 0;
        surface.set_markup(overlay.content_node, markup);
        true
    }

    /// Replaces the whole button set of an overlay.
    pub fn update_buttons(
        &mut self,
        id: &str,
        buttons: Vec<ButtonSpec>,
        surface: &mut dyn ViewSurface,
    ) -> bool {
        let Some(overlay) = self.overlays.get_mut(id) else {
            return false;
        };
        for node in overlay.button_nodes.drain(..) {
            surface.remove(node);
        }
        for spec in &buttons {
            let node = surface.create_element(overlay.buttons_node, "button");
            surface.set_attribute(node, "id", &spec.id);
            surface.set_attribute(node, "data-overlay", id);
            surface.set_attribute(node, "class", "overlay-button");
            surface.toggle_class(node, "hidden", !spec.visible);
            surface.set_text(node, &spec.text);
            overlay.button_nodes.push(node);
        }
        overlay.buttons = buttons;
        true
    }

    /// Flips visibility of one existing button.
    pub fn toggle_button(
        &mut self,
        id: &str,
        button_id: &str,
        visible: bool,
        surface: &mut dyn ViewSurface,
    ) -> bool {
        let Some(overlay) = self.overlays.get_mut(id) else {
            return false;
        };
        let Some(index) = overlay.buttons.iter().position(|spec| spec.id == button_id) else {
            return false;
        };
        overlay.buttons[index].visible = visible;
        if let Some(node) = overlay.button_nodes.get(index) {
            surface.toggle_class(*node, "hidden", !visible);
        }
        true
    }

    /// Handler of a visible button, cloned so the caller can run it while
    /// handing out `&mut self`.
    pub fn button_handler(&self, id: &str, button_id: &str) -> Option<ButtonHandler> {
        self.overlays
            .get(id)?
            .buttons
            .iter()
            .find(|spec| spec.id == button_id && spec.visible)
            .map(|spec| spec.handler.clone())
    }

    pub fn scroll_by(&mut self, id: &str, delta: i32) {
        if let Some(overlay) = self.overlays.get_mut(id) {
            let next = (i32::from(overlay.scroll) + delta).clamp(0, i32::from(u16::MAX));
            overlay.scroll = next as u16;
        }
    }

    /// Pointer-down on the drag handle of an open overlay.
    pub fn begin_drag(&mut self, id: &str, row: u16, surface: &mut dyn ViewSurface) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let extent = self.sheet_height();
        let Some(overlay) = self.overlays.get_mut(id) else {
            return false;
        };
        if overlay.closing.is_some() || overlay.state != OverlayState::Open {
            return false;
        }
        overlay.state = OverlayState::Dragging;
        surface.set_style(overlay.node, "transition", "none");
        self.drag = Some((id.to_string(), DragGesture::begin(row, overlay.offset, extent)));
        self.raise(id);
        self.sync_selection(surface);
        true
    }

    /// Pointer-move while dragging; returns the new offset.
    pub fn drag_to(&mut self, row: u16, surface: &mut dyn ViewSurface) -> Option<u16> {
        let (id, gesture) = self.drag.as_mut()?;
        let offset = gesture.update(row);
        let overlay = self.overlays.get_mut(id.as_str())?;
        overlay.offset = offset;
        surface.set_style(overlay.node, "transform", &translate(offset));
        Some(offset)
    }

    pub fn dragging(&self) -> Option<&str> {
        self.drag.as_ref().map(|(id, _)| id.as_str())
    }

    /// Pointer-up. Without a preceding `begin_drag` this is a no-op.
    pub fn end_drag(&mut self, surface: &mut dyn ViewSurface) -> Option<DragOutcome> {
        let (id, gesture) = self.drag.take()?;
        let outcome = gesture.finish();
        if let Some(overlay) = self.overlays.get_mut(&id) {
            surface.set_style(overlay.node, "transition", "transform 0.3s ease");
            overlay.state = OverlayState::Open;
        }
        match outcome {
            DragOutcome::Minimize => {
                self.minimize(&id, surface);
            }
            DragOutcome::SpringBack => {
                if let Some(overlay) = self.overlays.get_mut(&id) {
                    overlay.offset = 0;
                    surface.set_style(overlay.node, "transform", &translate(0));
                }
                self.sync_selection(surface);
            }
        }
        tracing::debug!(overlay_id = %id, ?outcome, "drag released");
        Some(outcome)
    }

    /// Shrinks an overlay into a widget at the end of its category's row.
    pub fn minimize(&mut self, id: &str, surface: &mut dyn ViewSurface) -> bool {
        let Some(overlay) = self.overlays.get_mut(id) else {
            return false;
        };
        if overlay.closing.is_some() || overlay.state == OverlayState::Minimized {
            return false;
        }
        overlay.state = OverlayState::Minimized;
        overlay.offset = 0;
        overlay.restore_armed = true;
        let node = overlay.node;
        let category = overlay.category.clone();
        if self.drag.as_ref().is_some_and(|(dragged, _)| dragged == id) {
            self.drag = None;
        }
        surface.toggle_class(node, "minimized", true);
        surface.set_style(node, "transform", &translate(0));
        surface.set_style(node, "bottom", "0");
        surface.set_style(node, "width", &MINIMIZED_WIDTH.to_string());
        let slot = self.registry.push(&category, id);
        self.apply_slots(&category, surface);
        self.sync_selection(surface);
        tracing::debug!(overlay_id = %id, category = %category, slot, "overlay minimized");
        true
    }

    /// Brings a minimized overlay back to full size and compacts the
    /// remaining widgets of its category.
    pub fn restore(&mut self, id: &str, surface: &mut dyn ViewSurface) -> bool {
        let Some(overlay) = self.overlays.get_mut(id) else {
            return false;
        };
        if overlay.closing.is_some() || overlay.state != OverlayState::Minimized {
            return false;
        }
        overlay.state = OverlayState::Open;
        overlay.offset = 0;
        overlay.restore_armed = false;
        let node = overlay.node;
        surface.toggle_class(node, "minimized", false);
        surface.set_style(node, "left", "0");
        surface.set_style(node, "width", "100%");
        surface.set_style(node, "transform", &translate(0));
        self.unregister(id, surface);
        self.raise(id);
        self.sync_selection(surface);
        tracing::debug!(overlay_id = %id, "overlay restored");
        true
    }

    /// A click on a minimized widget restores it once; further clicks before
    /// the next minimize do nothing.
    pub fn click(&mut self, id: &str, surface: &mut dyn ViewSurface) -> bool {
        let armed = self
            .overlays
            .get(id)
            .is_some_and(|overlay| overlay.restore_armed);
        armed && self.restore(id, surface)
    }

    fn unregister(&mut self, id: &str, surface: &mut dyn ViewSurface) {
        if let Some((category, _)) = self.registry.remove(id) {
            self.apply_slots(&category, surface);
        }
    }

    fn apply_slots(&self, category: &str, surface: &mut dyn ViewSurface) {
        for (index, member) in self.registry.members(category).iter().enumerate() {
            if let Some(overlay) = self.overlays.get(member) {
                let left = slot_left(index, self.viewport.width);
                surface.set_style(overlay.node, "left", &left.to_string());
            }
        }
    }

    fn raise(&mut self, id: &str) {
        self.z_order.retain(|existing| existing != id);
        self.z_order.push(id.to_string());
    }

    fn sync_selection(&self, surface: &mut dyn ViewSurface) {
        let enabled = !self.has_active();
        if surface.selection_enabled() != enabled {
            surface.set_selection_enabled(enabled);
        }
    }

    fn sheet_height(&self) -> u16 {
        let height = self.viewport.height;
        let share = (u32::from(height) * u32::from(OVERLAY_HEIGHT_PERCENT) / 100) as u16;
        share.max(OVERLAY_MIN_HEIGHT).min(height)
    }

    /// Geometry of every visible overlay, bottom of the stack first.
    /// Minimized widgets sit below open sheets.
    pub fn layout(&self) -> Vec<OverlayDraw> {
        let vp = self.viewport;
        let mut minimized = Vec::new();
        let mut open = Vec::new();
        for id in &self.z_order {
            let Some(overlay) = self.overlays.get(id) else {
                continue;
            };
            if overlay.closing.is_some() {
                continue;
            }
            match overlay.state {
                OverlayState::Minimized => {
                    let Some(slot) = self.registry.position(id) else {
                        continue;
                    };
                    let height = MINIMIZED_HEIGHT.min(vp.height);
                    let rect = Rect {
                        x: vp.x.saturating_add(slot_left(slot, vp.width)),
                        y: vp.y.saturating_add(vp.height.saturating_sub(height)),
                        width: MINIMIZED_WIDTH.min(vp.width),
                        height,
                    };
                    minimized.push(OverlayDraw {
                        id: id.clone(),
                        title: overlay.title.clone(),
                        state: overlay.state,
                        rect,
                        handle: None,
                        header: None,
                        body: None,
                        buttons: Vec::new(),
                        content: overlay.content_node,
                        scroll: overlay.scroll,
                    });
                }
                OverlayState::Open | OverlayState::Dragging => {
                    if let Some(draw) = self.sheet_draw(id, overlay) {
                        open.push(draw);
                    }
                }
            }
        }
        minimized.extend(open);
        minimized
    }

    fn sheet_draw(&self, id: &str, overlay: &Overlay) -> Option<OverlayDraw> {
        let vp = self.viewport;
        let height = self.sheet_height();
        let shift = (u32::from(height) * u32::from(overlay.offset) / 100) as u16;
        let visible = height.saturating_sub(shift);
        if visible == 0 || vp.width == 0 {
            return None;
        }
        let top = vp.y + vp.height - height + shift;
        let rect = Rect::new(vp.x, top, vp.width, visible);
        let handle = Rect::new(vp.x, top, vp.width, 1);
        let header = (visible >= 2).then(|| Rect::new(vp.x, top + 1, vp.width, 1));
        let body = (visible >= 3).then(|| Rect::new(vp.x, top + 2, vp.width, visible - 2));

        let mut buttons = Vec::new();
        if let Some(header) = header {
            let mut right = header.x + header.width.saturating_sub(1);
            for spec in overlay.buttons.iter().rev().filter(|spec| spec.visible) {
                let label = spec.label();
                let width = u16::try_from(label.chars().count())
                    .unwrap_or(u16::MAX)
                    .saturating_add(2);
                if right < header.x.saturating_add(width).saturating_add(1) {
                    break;
                }
                let x = right - width;
                buttons.push(ButtonDraw {
                    id: spec.id.clone(),
                    label,
                    rect: Rect::new(x, header.y, width, 1),
                });
                right = x.saturating_sub(1);
            }
            buttons.reverse();
        }

        Some(OverlayDraw {
            id: id.to_string(),
            title: overlay.title.clone(),
            state: overlay.state,
            rect,
            handle: Some(handle),
            header,
            body,
            buttons,
            content: overlay.content_node,
            scroll: overlay.scroll,
        })
    }

    /// Topmost overlay element under the pointer.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<OverlayHit> {
        let point = Position::new(column, row);
        self.layout()
            .into_iter()
            .rev()
            .find(|draw| draw.rect.contains(point))
            .map(|draw| {
                if draw.state == OverlayState::Minimized {
                    return OverlayHit::Minimized(draw.id);
                }
                if let Some(button) = draw.buttons.iter().find(|b| b.rect.contains(point)) {
                    return OverlayHit::Button {
                        overlay: draw.id.clone(),
                        button: button.id.clone(),
                    };
                }
                if draw.handle.is_some_and(|handle| handle.contains(point)) {
                    return OverlayHit::Handle(draw.id);
                }
                OverlayHit::Body(draw.id)
            })
    }
}

fn translate(percent: u16) -> String {
    format!("translateY({percent}%)")
}
