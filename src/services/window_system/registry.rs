use super::WindowSystem;
use crate::debug_if_enabled;
use crate::events::{Rect, SurfaceId, WindowEvent, WindowId, WindowProps, WindowSignal, WindowUpdate};
use std::collections::BTreeMap;

/// In-memory mirror of the window system.
///
/// Backends push full window snapshots; the registry keeps the latest one per
/// window and turns the differences into change notifications.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: BTreeMap<WindowId, WindowProps>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, update: WindowUpdate) -> Vec<WindowEvent> {
        match update {
            WindowUpdate::Upsert(props) => self.upsert(props),
            WindowUpdate::Closed(id) => match self.windows.remove(&id) {
                Some(_) => vec![WindowEvent::new(id, WindowSignal::Unmanaging)],
                None => Vec::new(),
            },
        }
    }

    fn upsert(&mut self, props: WindowProps) -> Vec<WindowEvent> {
        let id = props.id;
        let Some(previous) = self.windows.insert(id, props.clone()) else {
            debug_if_enabled!("New window {}", props);
            return vec![WindowEvent::new(id, WindowSignal::Created)];
        };

        let mut events = Vec::new();
        if previous.class != props.class {
            events.push(WindowEvent::new(id, WindowSignal::ClassChanged));
        }
        if previous.title != props.title {
            events.push(WindowEvent::new(id, WindowSignal::TitleChanged));
        }
        if previous.fullscreen != props.fullscreen {
            events.push(WindowEvent::new(id, WindowSignal::FullscreenChanged));
        }
        if !previous.frame.same_size(&props.frame) {
            events.push(WindowEvent::new(id, WindowSignal::SizeChanged));
        }
        events
    }

    #[cfg(test)]
    pub fn get(&self, window: WindowId) -> Option<&WindowProps> {
        self.windows.get(&window)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl WindowSystem for WindowRegistry {
    fn windows(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    fn class(&self, window: WindowId) -> Option<&str> {
        self.windows.get(&window)?.class.as_deref()
    }

    fn title(&self, window: WindowId) -> Option<&str> {
        self.windows.get(&window)?.title.as_deref()
    }

    fn is_fullscreen(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|w| w.fullscreen)
    }

    fn frame_rect(&self, window: WindowId) -> Option<Rect> {
        self.windows.get(&window).map(|w| w.frame)
    }

    fn render_surface(&self, window: WindowId) -> Option<SurfaceId> {
        self.windows.get(&window)?.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zed(id: u64) -> WindowProps {
        WindowProps::new(WindowId(id))
            .with_class("dev.zed.Zed")
            .with_title("Kodecanter \u{2014} main.rs")
            .with_frame(Rect::new(0, 0, 800, 600))
    }

    fn signals(events: &[WindowEvent]) -> Vec<WindowSignal> {
        events.iter().map(|e| e.signal).collect()
    }

    #[test]
    fn test_new_window_is_created() {
        let mut registry = WindowRegistry::new();
        let events = registry.apply(WindowUpdate::Upsert(zed(1)));
        assert_eq!(signals(&events), vec![WindowSignal::Created]);
        assert_eq!(registry.class(WindowId(1)), Some("dev.zed.Zed"));
    }

    #[test]
    fn test_identical_snapshot_is_silent() {
        let mut registry = WindowRegistry::new();
        registry.apply(WindowUpdate::Upsert(zed(1)));
        assert!(registry.apply(WindowUpdate::Upsert(zed(1))).is_empty());
    }

    #[test]
    fn test_changes_are_diffed() {
        let mut registry = WindowRegistry::new();
        registry.apply(WindowUpdate::Upsert(WindowProps::new(WindowId(1))));

        let events = registry.apply(WindowUpdate::Upsert(
            zed(1).with_fullscreen(true).with_frame(Rect::new(0, 0, 1920, 1080)),
        ));
        assert_eq!(
            signals(&events),
            vec![
                WindowSignal::ClassChanged,
                WindowSignal::TitleChanged,
                WindowSignal::FullscreenChanged,
                WindowSignal::SizeChanged,
            ]
        );
    }

    #[test]
    fn test_move_without_resize_is_not_a_size_change() {
        let mut registry = WindowRegistry::new();
        registry.apply(WindowUpdate::Upsert(zed(1)));
        let events = registry.apply(WindowUpdate::Upsert(zed(1).with_frame(Rect::new(40, 40, 800, 600))));
        assert!(events.is_empty());
        assert_eq!(registry.frame_rect(WindowId(1)), Some(Rect::new(40, 40, 800, 600)));
    }

    #[test]
    fn test_close_removes_window() {
        let mut registry = WindowRegistry::new();
        registry.apply(WindowUpdate::Upsert(zed(1)));

        let events = registry.apply(WindowUpdate::Closed(WindowId(1)));
        assert_eq!(signals(&events), vec![WindowSignal::Unmanaging]);
        assert!(registry.is_empty());
        assert!(registry.apply(WindowUpdate::Closed(WindowId(1))).is_empty());
    }
}
