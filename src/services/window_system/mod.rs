//! Window system: query interface, in-memory registry and backends.
//!
//! Backends only observe the compositor and emit `WindowUpdate`s. They MUST
//! NOT decide which windows are project windows; that belongs to the
//! window tracker.

mod dry_run;
mod registry;
mod sway;
mod r#trait;

pub use self::r#trait::{create_window_source, WindowSource};
pub use registry::WindowRegistry;

use crate::events::{Rect, SurfaceId, WindowId};

/// Read side of the window system, queried at the moment of use.
pub trait WindowSystem {
    /// Windows that exist right now.
    fn windows(&self) -> Vec<WindowId>;
    fn class(&self, window: WindowId) -> Option<&str>;
    fn title(&self, window: WindowId) -> Option<&str>;
    fn is_fullscreen(&self, window: WindowId) -> bool;
    fn frame_rect(&self, window: WindowId) -> Option<Rect>;
    /// `None` until the compositor has a surface for the window.
    fn render_surface(&self, window: WindowId) -> Option<SurfaceId>;
}
