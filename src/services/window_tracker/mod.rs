//! WindowTracker: decides which windows are project windows and follows
//! them for their whole lifetime.
//!
//! Per window the tracker runs
//! `Unclassified -> PendingTitle -> Tracked -> Removed`, where the first two
//! states may go straight to `Removed` when the window disappears early.
//! Window metadata arrives late and out of order, so every state carries the
//! set of window signals it listens to; moving to another state or losing
//! the window disposes that set (and the window's deferred tasks) in one go.
//!
//! The tracker never draws anything. It reports `TrackerEvent`s and leaves
//! the rest to the decoration layer.

mod title;

pub use title::TitleParser;

use crate::config::TrackerConfig;
use crate::debug_if_enabled;
use crate::events::{TrackerEvent, WindowEvent, WindowId, WindowSignal};
use crate::services::retry_scheduler::{RetryScheduler, TaskId};
use crate::services::window_system::WindowSystem;
use smallvec::{smallvec, SmallVec};
use std::collections::BTreeMap;
use tracing::info;

type Subscriptions = SmallVec<[WindowSignal; 4]>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TrackState {
    /// Class unknown or not ours (yet).
    Unclassified { recheck: Option<TaskId> },
    /// Ours, but the title names no project yet.
    PendingTitle,
    Tracked { project_name: String },
}

#[derive(Debug)]
struct WindowEntry {
    state: TrackState,
    subscriptions: Subscriptions,
}

impl WindowEntry {
    fn is_tracked(&self) -> bool {
        matches!(self.state, TrackState::Tracked { .. })
    }

    fn listens_to(&self, signal: WindowSignal) -> bool {
        self.subscriptions.contains(&signal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackerTask {
    /// One-shot class check for backends that never announce a late class.
    RecheckClass,
}

pub struct WindowTracker {
    window_classes: Vec<String>,
    parser: TitleParser,
    windows: BTreeMap<WindowId, WindowEntry>,
    scheduler: RetryScheduler<TrackerTask>,
    enabled: bool,
}

impl WindowTracker {
    pub fn new(window_classes: Vec<String>, parser: TitleParser) -> Self {
        Self {
            window_classes,
            parser,
            windows: BTreeMap::new(),
            scheduler: RetryScheduler::new(),
            enabled: false,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.window_classes.clone(), TitleParser::from_config(config))
    }

    /// Starts accepting window notifications and classifies every window
    /// that already exists.
    pub fn enable(&mut self, ws: &dyn WindowSystem) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        if self.enabled {
            return events;
        }
        self.enabled = true;

        for window in ws.windows() {
            self.on_window_created(ws, window, &mut events);
        }

        info!("WindowTracker enabled ({} windows tracked)", self.tracked_count());
        events
    }

    /// Stops listening, drops every pending task and reports every tracked
    /// window as lost.
    pub fn disable(&mut self) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        if !self.enabled {
            return events;
        }
        self.enabled = false;

        let cancelled = self.scheduler.cancel_all();
        for (window, entry) in std::mem::take(&mut self.windows) {
            if entry.is_tracked() {
                events.push(TrackerEvent::Lost { window });
            }
        }

        info!(
            "WindowTracker disabled ({} windows released, {} tasks cancelled)",
            events.len(),
            cancelled
        );
        events
    }

    pub fn handle_event(&mut self, ws: &dyn WindowSystem, event: WindowEvent) -> Vec<TrackerEvent> {
        let mut events = Vec::new();
        if !self.enabled {
            return events;
        }

        let window = event.window;
        if event.signal == WindowSignal::Created {
            self.on_window_created(ws, window, &mut events);
            return events;
        }

        let subscribed = self
            .windows
            .get(&window)
            .is_some_and(|entry| entry.listens_to(event.signal));
        if !subscribed {
            return events;
        }

        match event.signal {
            WindowSignal::ClassChanged => {
                if self.is_project_class(ws, window) {
                    self.dispose(window);
                    self.try_track(ws, window, &mut events);
                }
            }
            WindowSignal::TitleChanged => self.on_title_changed(ws, window, &mut events),
            WindowSignal::SizeChanged => events.push(TrackerEvent::SizeChanged { window }),
            WindowSignal::FullscreenChanged => events.push(TrackerEvent::Fullscreen {
                window,
                fullscreen: ws.is_fullscreen(window),
            }),
            WindowSignal::Unmanaging => self.on_unmanaging(window, &mut events),
            WindowSignal::Created => {}
        }

        events
    }

    /// Runs the deferred tasks that are due this turn.
    pub fn run_deferred(&mut self, ws: &dyn WindowSystem) -> Vec<TrackerEvent> {
        let mut events = Vec::new();

        for scheduled in self.scheduler.take_due() {
            let window = scheduled.owner;
            match scheduled.task {
                TrackerTask::RecheckClass => {
                    let Some(entry) = self.windows.get_mut(&window) else {
                        continue;
                    };
                    let TrackState::Unclassified { recheck } = &mut entry.state else {
                        continue;
                    };
                    *recheck = None;

                    if self.is_project_class(ws, window) {
                        debug_if_enabled!("{} classified by deferred check", window);
                        self.dispose(window);
                        self.try_track(ws, window, &mut events);
                    }
                }
            }
        }

        events
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.scheduler.is_empty()
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_tracked(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(WindowEntry::is_tracked)
    }

    #[cfg(test)]
    pub fn project_name(&self, window: WindowId) -> Option<&str> {
        match &self.windows.get(&window)?.state {
            TrackState::Tracked { project_name } => Some(project_name),
            _ => None,
        }
    }

    pub fn tracked_count(&self) -> usize {
        self.windows.values().filter(|entry| entry.is_tracked()).count()
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.windows.len() - self.tracked_count()
    }

    fn is_project_class(&self, ws: &dyn WindowSystem, window: WindowId) -> bool {
        ws.class(window)
            .is_some_and(|class| self.window_classes.iter().any(|c| c == class))
    }

    /// Forgets the window's state, subscriptions and deferred recheck.
    fn dispose(&mut self, window: WindowId) -> Option<WindowEntry> {
        let entry = self.windows.remove(&window)?;
        if let TrackState::Unclassified { recheck: Some(task) } = &entry.state {
            if self.scheduler.cancel(*task) {
                debug_if_enabled!("Cancelled class recheck {} of {}", task, window);
            }
        }
        Some(entry)
    }

    fn on_window_created(&mut self, ws: &dyn WindowSystem, window: WindowId, events: &mut Vec<TrackerEvent>) {
        if self.windows.contains_key(&window) {
            return;
        }

        if self.is_project_class(ws, window) {
            self.try_track(ws, window, events);
            return;
        }

        // class may still arrive; a missing one also gets a single recheck
        let recheck = ws
            .class(window)
            .is_none()
            .then(|| self.scheduler.schedule(window, TrackerTask::RecheckClass));

        self.windows.insert(
            window,
            WindowEntry {
                state: TrackState::Unclassified { recheck },
                subscriptions: smallvec![WindowSignal::ClassChanged, WindowSignal::Unmanaging],
            },
        );
    }

    fn try_track(&mut self, ws: &dyn WindowSystem, window: WindowId, events: &mut Vec<TrackerEvent>) {
        if self.is_tracked(window) {
            return;
        }

        match self.parser.parse(ws.title(window)) {
            Some(project_name) => self.track_window(ws, window, project_name, events),
            None => {
                debug_if_enabled!("{} has no project title yet, waiting for a title", window);
                self.dispose(window);
                self.windows.insert(
                    window,
                    WindowEntry {
                        state: TrackState::PendingTitle,
                        subscriptions: smallvec![WindowSignal::TitleChanged, WindowSignal::Unmanaging],
                    },
                );
            }
        }
    }

    fn track_window(
        &mut self,
        ws: &dyn WindowSystem,
        window: WindowId,
        project_name: String,
        events: &mut Vec<TrackerEvent>,
    ) {
        if self.is_tracked(window) {
            return;
        }

        self.dispose(window);
        self.windows.insert(
            window,
            WindowEntry {
                state: TrackState::Tracked {
                    project_name: project_name.clone(),
                },
                subscriptions: smallvec![
                    WindowSignal::TitleChanged,
                    WindowSignal::SizeChanged,
                    WindowSignal::FullscreenChanged,
                    WindowSignal::Unmanaging,
                ],
            },
        );

        info!("Tracking {}: {}", window, project_name);
        events.push(TrackerEvent::Tracked { window, project_name });

        if ws.is_fullscreen(window) {
            events.push(TrackerEvent::Fullscreen { window, fullscreen: true });
        }
    }

    fn on_title_changed(&mut self, ws: &dyn WindowSystem, window: WindowId, events: &mut Vec<TrackerEvent>) {
        let Some(name) = self.parser.parse(ws.title(window)) else {
            return;
        };
        let Some(entry) = self.windows.get_mut(&window) else {
            return;
        };

        if let TrackState::Tracked { project_name } = &mut entry.state {
            if *project_name != name {
                info!("{} switched project: {} -> {}", window, project_name, name);
                *project_name = name.clone();
                events.push(TrackerEvent::Updated { window, project_name: name });
            }
            return;
        }

        if entry.state == TrackState::PendingTitle {
            self.track_window(ws, window, name, events);
        }
    }

    fn on_unmanaging(&mut self, window: WindowId, events: &mut Vec<TrackerEvent>) {
        if let Some(entry) = self.dispose(window) {
            if entry.is_tracked() {
                info!("Lost {}", window);
                events.push(TrackerEvent::Lost { window });
            } else {
                debug_if_enabled!("{} went away before it was classified", window);
            }
        }
    }
}
