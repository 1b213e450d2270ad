//! Terminal control dashboard for a goup server.
//!
//! A page session (`shell::Shell`) hosts one view at a time inside an
//! in-memory document, routes API responses back to the view that asked for
//! them, broadcasts the global search term and manages stacked overlays that
//! can be dragged down into minimized widgets.

pub mod api;
pub mod config;
pub mod constants;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod overlay;
pub mod router;
pub mod runner;
pub mod search;
pub mod shell;
pub mod state;
pub mod surface;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod views;
