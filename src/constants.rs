//! Shared crate-wide constants.

use std::time::Duration;

/// Drag distance, in percent of the overlay's own height, at which releasing
/// the handle commits to the minimized state instead of springing back open.
pub const MINIMIZE_THRESHOLD_PERCENT: u16 = 70;

/// Largest vertical offset an overlay can be dragged to (fully off-screen).
pub const MAX_DRAG_OFFSET_PERCENT: u16 = 100;

/// Share of the viewport height an open overlay occupies.
pub const OVERLAY_HEIGHT_PERCENT: u16 = 60;

/// Smallest height of an open overlay: handle, header and one content row
/// plus the bottom border.
pub const OVERLAY_MIN_HEIGHT: u16 = 5;

/// Footprint of a minimized overlay widget, in terminal cells.
pub const MINIMIZED_WIDTH: u16 = 24;
pub const MINIMIZED_HEIGHT: u16 = 3;

/// Horizontal inset of the first minimized widget from the viewport edge, and
/// the minimum gap kept on the right when slots overflow.
pub const MINIMIZED_BASE_MARGIN: u16 = 2;

/// Gap between neighbouring minimized widgets of the same category.
pub const MINIMIZED_SPACING: u16 = 1;

/// How long a closing overlay stays mounted while it slides off-screen.
pub const CLOSE_ANIMATION: Duration = Duration::from_millis(300);

/// Category used for overlays whose show request omits one.
pub const DEFAULT_CATEGORY: &str = "default";

/// Overlay id used when a show request omits one.
pub const DEFAULT_OVERLAY_ID: &str = "custom-modal";

/// Element id of the global search input.
pub const SEARCH_INPUT_ID: &str = "globalSearch";

/// Selector of the element views render into.
pub const APP_CONTAINER: &str = "#app";

/// Side attribute holding an element's text before the first highlight.
pub const ORIGINAL_TEXT_ATTR: &str = "data-original-text";

/// Opacity applied by `filter_list` to elements that do not match.
pub const DIMMED_OPACITY: &str = "0.4";
pub const FULL_OPACITY: &str = "1";
