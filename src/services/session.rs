//! Wires the window registry, the tracker and the decoration manager into
//! one single-threaded pipeline.
//!
//! Backend updates go through the registry, which turns them into window
//! signals. The tracker answers those with tracker events, and every tracker
//! event maps onto exactly one decoration operation.

use crate::debug_if_enabled;
use crate::events::{TrackerEvent, WindowUpdate};
use crate::services::decoration::DecorationManager;
use crate::services::window_system::WindowRegistry;
use crate::services::window_tracker::WindowTracker;
use tracing::info;

pub struct Session {
    registry: WindowRegistry,
    tracker: WindowTracker,
    manager: DecorationManager,
}

impl Session {
    pub fn new(tracker: WindowTracker, manager: DecorationManager) -> Self {
        Self {
            registry: WindowRegistry::new(),
            tracker,
            manager,
        }
    }

    /// Enables tracking and decorates the windows known so far.
    pub fn start(&mut self) {
        let events = self.tracker.enable(&self.registry);
        dispatch(&mut self.manager, &self.registry, events);
        info!(
            "Session started: {} windows known, {} decorated",
            self.registry.len(),
            self.manager.decorated_count()
        );
    }

    pub fn apply(&mut self, update: WindowUpdate) {
        for event in self.registry.apply(update) {
            let events = self.tracker.handle_event(&self.registry, event);
            dispatch(&mut self.manager, &self.registry, events);
        }
    }

    /// Runs one turn of deferred work in both components.
    pub fn run_deferred(&mut self) {
        let events = self.tracker.run_deferred(&self.registry);
        dispatch(&mut self.manager, &self.registry, events);
        self.manager.run_deferred(&self.registry);
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.tracker.has_pending_tasks() || self.manager.has_pending_tasks()
    }

    pub fn on_settings_changed(&mut self) {
        self.manager.on_settings_changed(&self.registry);
    }

    /// Resolves when the decoration settings change.
    pub async fn settings_changed(&mut self) {
        self.manager.settings_changed().await;
    }

    /// Disables the tracker and destroys every decoration.
    pub fn shutdown(&mut self) {
        let events = self.tracker.disable();
        dispatch(&mut self.manager, &self.registry, events);
        self.manager.destroy();
        info!("Session stopped");
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &WindowTracker {
        &self.tracker
    }

    #[cfg(test)]
    pub fn manager(&self) -> &DecorationManager {
        &self.manager
    }
}

fn dispatch(manager: &mut DecorationManager, registry: &WindowRegistry, events: Vec<TrackerEvent>) {
    for event in events {
        debug_if_enabled!("{} -> {:?}", event.window(), event);
        match event {
            TrackerEvent::Tracked { window, project_name } => {
                manager.decorate_window(registry, window, &project_name);
            }
            TrackerEvent::Updated { window, project_name } => {
                manager.update_window(registry, window, &project_name);
            }
            TrackerEvent::Lost { window } => manager.remove_decorations(window),
            TrackerEvent::Fullscreen { window, fullscreen } => manager.set_fullscreen(window, fullscreen),
            TrackerEvent::SizeChanged { window } => manager.reposition_decorations(registry, window),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DecorationSettings, TrackerConfig};
    use crate::events::{Rect, SurfaceId, WindowId, WindowProps};
    use crate::services::decoration::recording::{Op, PrimitiveKind, RecordingFactory};
    use std::sync::Arc;
    use tokio::sync::watch;

    const ZED: &str = "dev.zed.Zed";

    fn title(project: &str) -> String {
        format!("{project} \u{2014} src/main.rs \u{2014} Zed")
    }

    fn zed(id: u64, project: &str) -> WindowProps {
        WindowProps::new(WindowId(id))
            .with_class(ZED)
            .with_title(title(project))
            .with_frame(Rect::new(0, 0, 800, 600))
            .with_surface(SurfaceId(id))
    }

    fn session() -> (Session, RecordingFactory, watch::Sender<Arc<DecorationSettings>>) {
        let factory = RecordingFactory::new();
        let (tx, rx) = watch::channel(Arc::new(DecorationSettings {
            overlay_enabled: true,
            ..DecorationSettings::default()
        }));
        let manager = DecorationManager::new(Box::new(factory.clone()), rx);
        let tracker = WindowTracker::from_config(&TrackerConfig::default());
        (Session::new(tracker, manager), factory, tx)
    }

    #[test]
    fn test_window_lifecycle() {
        let (mut session, factory, _tx) = session();
        session.start();

        session.apply(WindowUpdate::Upsert(zed(1, "alpha")));
        assert_eq!(session.manager().project_name(WindowId(1)), Some("alpha"));
        assert_eq!(factory.live_count(), 4);

        session.apply(WindowUpdate::Upsert(zed(1, "Kodecanter")));
        assert_eq!(session.manager().project_name(WindowId(1)), Some("Kodecanter"));
        assert_eq!(factory.created_count(), 4);

        session.apply(WindowUpdate::Upsert(zed(1, "Kodecanter").with_fullscreen(true)));
        let border = factory.ids_of(PrimitiveKind::Border)[0];
        assert_eq!(factory.ops(border).last(), Some(&Op::Hide));

        session.apply(WindowUpdate::Upsert(
            zed(1, "Kodecanter").with_frame(Rect::new(0, 0, 1024, 768)),
        ));
        assert_eq!(factory.ops(border).last(), Some(&Op::Resize(Rect::new(0, 0, 1024, 768))));

        session.apply(WindowUpdate::Closed(WindowId(1)));
        assert!(!session.manager().is_decorated(WindowId(1)));
        assert!(!session.tracker().is_tracked(WindowId(1)));
        assert_eq!(factory.live_count(), 0);
    }

    #[test]
    fn test_late_metadata_decorates_once() {
        let (mut session, factory, _tx) = session();
        session.start();

        let bare = WindowProps::new(WindowId(7))
            .with_frame(Rect::new(0, 0, 640, 480))
            .with_surface(SurfaceId(7));
        session.apply(WindowUpdate::Upsert(bare.clone()));
        session.apply(WindowUpdate::Upsert(bare.clone().with_class(ZED)));
        assert!(!session.manager().is_decorated(WindowId(7)));

        session.apply(WindowUpdate::Upsert(bare.with_class(ZED).with_title(title("beta"))));
        assert_eq!(session.manager().project_name(WindowId(7)), Some("beta"));
        assert_eq!(factory.created_count(), 4);
    }

    #[test]
    fn test_start_decorates_existing_windows() {
        let (mut session, factory, _tx) = session();
        session.apply(WindowUpdate::Upsert(zed(1, "alpha")));
        session.apply(WindowUpdate::Upsert(zed(2, "beta")));
        assert_eq!(session.manager().decorated_count(), 0);

        session.start();
        assert_eq!(session.manager().decorated_count(), 2);
        assert_eq!(factory.live_count(), 8);
    }

    #[test]
    fn test_reopened_window_does_not_leak() {
        let (mut session, factory, _tx) = session();
        session.start();

        for _ in 0..3 {
            session.apply(WindowUpdate::Upsert(zed(1, "alpha")));
            session.apply(WindowUpdate::Closed(WindowId(1)));
        }
        session.apply(WindowUpdate::Upsert(zed(1, "alpha")));

        assert_eq!(session.manager().decorated_count(), 1);
        assert_eq!(factory.live_count(), 4);
        assert_eq!(factory.created_count(), 16);
    }

    #[test]
    fn test_missing_surface_is_retried() {
        let (mut session, factory, _tx) = session();
        session.start();

        let mut props = zed(3, "gamma");
        props.surface = None;
        session.apply(WindowUpdate::Upsert(props));
        assert!(session.tracker().is_tracked(WindowId(3)));
        assert!(!session.manager().is_decorated(WindowId(3)));
        assert!(session.has_pending_tasks());

        session.apply(WindowUpdate::Upsert(zed(3, "gamma")));
        session.run_deferred();

        assert!(session.manager().is_decorated(WindowId(3)));
        assert_eq!(factory.live_count(), 4);
        assert!(!session.has_pending_tasks());
    }

    #[test]
    fn test_settings_change_rebuilds_decorations() {
        let (mut session, factory, tx) = session();
        session.start();
        session.apply(WindowUpdate::Upsert(zed(1, "alpha")));

        tx.send_replace(Arc::new(DecorationSettings {
            badge_enabled: false,
            ..DecorationSettings::default()
        }));
        session.on_settings_changed();

        assert_eq!(factory.live_count(), 2);
        assert_eq!(factory.created_of(PrimitiveKind::Badge), 1);
        assert!(factory
            .live_ids()
            .iter()
            .all(|id| !factory.ids_of(PrimitiveKind::Badge).contains(id)));
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let (mut session, factory, _tx) = session();
        session.start();
        session.apply(WindowUpdate::Upsert(zed(1, "alpha")));
        session.apply(WindowUpdate::Upsert(zed(2, "beta")));
        let mut no_surface = zed(3, "gamma");
        no_surface.surface = None;
        session.apply(WindowUpdate::Upsert(no_surface));
        assert!(session.has_pending_tasks());

        session.shutdown();

        assert_eq!(factory.live_count(), 0);
        assert_eq!(session.manager().decorated_count(), 0);
        assert!(!session.tracker().is_enabled());
        assert!(!session.has_pending_tasks());

        // a late update after shutdown decorates nothing
        session.apply(WindowUpdate::Upsert(zed(4, "delta")));
        assert_eq!(factory.live_count(), 0);
    }
}
