use std::fmt;

/// Opaque window identity handed out by the window system.
///
/// Holding one does not keep the window alive; it only names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Compositor-side render surface a decoration attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Window frame geometry in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Same size, anchored at the surface origin.
    pub fn at_origin(&self) -> Self {
        Self::new(0, 0, self.width, self.height)
    }

    pub fn same_size(&self, other: &Rect) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Everything the window system reports about a single window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowProps {
    pub id: WindowId,
    pub class: Option<String>,
    pub title: Option<String>,
    pub fullscreen: bool,
    pub frame: Rect,
    pub surface: Option<SurfaceId>,
}

impl WindowProps {
    pub fn new(id: WindowId) -> Self {
        Self {
            id,
            class: None,
            title: None,
            fullscreen: false,
            frame: Rect::default(),
            surface: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_surface(mut self, surface: SurfaceId) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }
}

impl fmt::Display for WindowProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \"{}\" ({})",
            self.id,
            self.title.as_deref().unwrap_or(""),
            self.class.as_deref().unwrap_or("?")
        )
    }
}

/// Raw update produced by a window backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowUpdate {
    /// Full current state of a window, new or already known.
    Upsert(WindowProps),
    Closed(WindowId),
}

/// Window-system signals a tracker can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowSignal {
    Created,
    ClassChanged,
    TitleChanged,
    FullscreenChanged,
    SizeChanged,
    Unmanaging,
}

/// A change notification for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvent {
    pub window: WindowId,
    pub signal: WindowSignal,
}

impl WindowEvent {
    pub fn new(window: WindowId, signal: WindowSignal) -> Self {
        Self { window, signal }
    }
}

impl fmt::Display for WindowEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.signal, self.window)
    }
}

/// Lifecycle facts emitted by the window tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    Tracked { window: WindowId, project_name: String },
    Updated { window: WindowId, project_name: String },
    Lost { window: WindowId },
    Fullscreen { window: WindowId, fullscreen: bool },
    SizeChanged { window: WindowId },
}

impl TrackerEvent {
    pub fn window(&self) -> WindowId {
        match self {
            TrackerEvent::Tracked { window, .. }
            | TrackerEvent::Updated { window, .. }
            | TrackerEvent::Lost { window }
            | TrackerEvent::Fullscreen { window, .. }
            | TrackerEvent::SizeChanged { window } => *window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_props_builder() {
        let props = WindowProps::new(WindowId(7))
            .with_class("dev.zed.Zed")
            .with_title("Kodecanter \u{2014} main.rs")
            .with_frame(Rect::new(10, 20, 800, 600))
            .with_surface(SurfaceId(7));

        assert_eq!(props.class.as_deref(), Some("dev.zed.Zed"));
        assert_eq!(props.frame.width, 800);
        assert_eq!(props.surface, Some(SurfaceId(7)));
        assert!(!props.fullscreen);
    }

    #[test]
    fn test_rect_helpers() {
        let rect = Rect::new(100, 50, 640, 480);
        assert_eq!(rect.at_origin(), Rect::new(0, 0, 640, 480));
        assert!(rect.same_size(&Rect::new(0, 0, 640, 480)));
        assert!(!rect.same_size(&Rect::new(100, 50, 641, 480)));
    }

    #[test]
    fn test_window_props_display() {
        let props = WindowProps::new(WindowId(4)).with_class("dev.zed.Zed").with_title("notes");
        assert_eq!(props.to_string(), "window#4 \"notes\" (dev.zed.Zed)");
        assert_eq!(WindowProps::new(WindowId(5)).to_string(), "window#5 \"\" (?)");
    }

    #[test]
    fn test_tracker_event_window() {
        let event = TrackerEvent::Fullscreen { window: WindowId(3), fullscreen: true };
        assert_eq!(event.window(), WindowId(3));
    }
}
