use super::primitives::{
    BadgeConfig, BadgePrimitive, BorderConfig, FrameEffectConfig, OverlayConfig, Primitive, PrimitiveFactory,
};
use crate::config::{DecorationSettings, DEFAULT_MAX_RETRIES};
use crate::debug_if_enabled;
use crate::events::WindowId;
use crate::services::color::{self, ProjectColor};
use crate::services::retry_scheduler::{RetryScheduler, TaskId};
use crate::services::window_system::WindowSystem;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Distance of the badge from the top and right window edges.
pub const BADGE_INSET: i32 = 8;

pub type SettingsReceiver = watch::Receiver<Arc<DecorationSettings>>;

struct WindowDecoration {
    border: Option<Box<dyn Primitive>>,
    overlay: Option<Box<dyn Primitive>>,
    badge: Option<Box<dyn BadgePrimitive>>,
    frame: Option<Box<dyn Primitive>>,
    color: ProjectColor,
    project_name: String,
    hidden: bool,
    badge_task: Option<TaskId>,
}

/// One operation fanned out over every primitive of a decoration.
#[derive(Clone, Copy)]
enum PrimitiveOp<'a> {
    Recolor(&'a ProjectColor),
    Show,
    Hide,
    Destroy,
}

impl PrimitiveOp<'_> {
    fn apply<P: Primitive + ?Sized>(self, primitive: &mut P) {
        match self {
            PrimitiveOp::Recolor(color) => primitive.set_color(color),
            PrimitiveOp::Show => primitive.show(),
            PrimitiveOp::Hide => primitive.hide(),
            PrimitiveOp::Destroy => primitive.destroy(),
        }
    }
}

impl WindowDecoration {
    fn apply(&mut self, op: PrimitiveOp<'_>) {
        for primitive in [
            self.border.as_deref_mut(),
            self.overlay.as_deref_mut(),
            self.frame.as_deref_mut(),
        ]
        .into_iter()
        .flatten()
        {
            op.apply(primitive);
        }
        if let Some(badge) = self.badge.as_deref_mut() {
            op.apply(badge);
        }
    }

    fn primitive_count(&self) -> usize {
        [self.border.is_some(), self.overlay.is_some(), self.frame.is_some(), self.badge.is_some()]
            .iter()
            .filter(|present| **present)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeferredDecoration {
    /// The render surface was missing; `attempt` counts retries from 1.
    Decorate { project_name: String, attempt: u32 },
    /// The badge had no measured width yet.
    RepositionBadge { attempt: u32 },
}

/// Keeps the decoration of every tracked window in line with the tracker and
/// with the live settings.
pub struct DecorationManager {
    factory: Box<dyn PrimitiveFactory>,
    settings: SettingsReceiver,
    changes: Option<SettingsReceiver>,
    decorated: BTreeMap<WindowId, WindowDecoration>,
    scheduler: RetryScheduler<DeferredDecoration>,
    max_retries: u32,
}

impl DecorationManager {
    pub fn new(factory: Box<dyn PrimitiveFactory>, settings: SettingsReceiver) -> Self {
        let mut changes = settings.clone();
        changes.mark_unchanged();

        Self {
            factory,
            settings,
            changes: Some(changes),
            decorated: BTreeMap::new(),
            scheduler: RetryScheduler::new(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Settings as they are right now. Callers must not hold on to it past
    /// the current operation.
    fn snapshot(&self) -> Arc<DecorationSettings> {
        self.settings.borrow().clone()
    }

    /// (Re)builds the decoration of `window` from scratch.
    pub fn decorate_window(&mut self, ws: &dyn WindowSystem, window: WindowId, project_name: &str) {
        self.remove_decorations(window);
        self.build(ws, window, project_name, 0);
    }

    fn build(&mut self, ws: &dyn WindowSystem, window: WindowId, project_name: &str, attempt: u32) {
        let Some(surface) = ws.render_surface(window) else {
            if attempt < self.max_retries {
                debug_if_enabled!("{} has no render surface yet, retry {}", window, attempt + 1);
                self.scheduler.schedule(
                    window,
                    DeferredDecoration::Decorate {
                        project_name: project_name.to_string(),
                        attempt: attempt + 1,
                    },
                );
            } else {
                warn!(
                    "Giving up on decorating {} ({}): no render surface after {} retries",
                    window, project_name, attempt
                );
            }
            return;
        };

        let settings = self.snapshot();
        let color = color::resolve(project_name, &settings.color_overrides);

        let mut decoration = WindowDecoration {
            border: None,
            overlay: None,
            badge: None,
            frame: None,
            color: color.clone(),
            project_name: project_name.to_string(),
            hidden: false,
            badge_task: None,
        };

        if settings.border_enabled {
            decoration.border = Some(self.factory.create_border(
                surface,
                BorderConfig {
                    color: color.clone(),
                    width: settings.border_width,
                    radius: settings.border_radius,
                },
            ));
            decoration.frame = Some(
                self.factory
                    .create_frame_effect(surface, FrameEffectConfig { color: color.clone() }),
            );
        }

        if settings.overlay_enabled {
            decoration.overlay = Some(self.factory.create_overlay(
                surface,
                OverlayConfig {
                    color: color.clone(),
                    opacity: settings.overlay_opacity.clamp(0, 100),
                },
            ));
        }

        if settings.badge_enabled {
            decoration.badge = Some(self.factory.create_badge(
                surface,
                BadgeConfig {
                    text: project_name.to_string(),
                    color,
                },
            ));
        }

        if ws.is_fullscreen(window) {
            decoration.hidden = true;
            decoration.apply(PrimitiveOp::Hide);
        }

        info!(
            "Decorated {} ({}) with {} primitives in {}",
            window,
            project_name,
            decoration.primitive_count(),
            decoration.color.hex
        );
        self.decorated.insert(window, decoration);
        self.reposition_decorations(ws, window);
    }

    /// Applies a new project name in place, without recreating primitives.
    pub fn update_window(&mut self, ws: &dyn WindowSystem, window: WindowId, project_name: &str) {
        if !self.decorated.contains_key(&window) {
            self.decorate_window(ws, window, project_name);
            return;
        }

        let settings = self.snapshot();
        let Some(decoration) = self.decorated.get_mut(&window) else {
            return;
        };
        let color = color::resolve(project_name, &settings.color_overrides);
        decoration.apply(PrimitiveOp::Recolor(&color));
        if let Some(badge) = decoration.badge.as_mut() {
            badge.set_text(project_name);
        }
        decoration.color = color;
        decoration.project_name = project_name.to_string();

        debug!("Updated {} to {} ({})", window, project_name, decoration.color.hex);
        self.reposition_badge(ws, window);
    }

    /// Fits border, overlay and frame to the window and re-anchors the badge.
    pub fn reposition_decorations(&mut self, ws: &dyn WindowSystem, window: WindowId) {
        let Some(rect) = ws.frame_rect(window) else {
            return;
        };
        let Some(decoration) = self.decorated.get_mut(&window) else {
            return;
        };

        let area = rect.at_origin();
        for primitive in [
            decoration.border.as_deref_mut(),
            decoration.overlay.as_deref_mut(),
            decoration.frame.as_deref_mut(),
        ]
        .into_iter()
        .flatten()
        {
            primitive.resize_to(area);
        }

        self.reposition_badge(ws, window);
    }

    pub fn reposition_badge(&mut self, ws: &dyn WindowSystem, window: WindowId) {
        self.position_badge(ws, window, 0);
    }

    fn position_badge(&mut self, ws: &dyn WindowSystem, window: WindowId, attempt: u32) {
        let Some(rect) = ws.frame_rect(window) else {
            return;
        };
        let Some(decoration) = self.decorated.get_mut(&window) else {
            return;
        };
        let Some(badge) = decoration.badge.as_mut() else {
            return;
        };

        let width = badge.measured_width();
        if width > 0 {
            badge.move_to(rect.width - width - BADGE_INSET, BADGE_INSET);
            return;
        }

        // one pending reposition per window is enough
        if decoration.badge_task.is_some_and(|id| self.scheduler.is_scheduled(id)) {
            return;
        }
        if attempt >= self.max_retries {
            debug!("Badge of {} never got a width, leaving it in place", window);
            return;
        }
        decoration.badge_task = Some(
            self.scheduler
                .schedule(window, DeferredDecoration::RepositionBadge { attempt: attempt + 1 }),
        );
    }

    /// Hides or shows the decoration without touching primitive identity.
    pub fn set_fullscreen(&mut self, window: WindowId, fullscreen: bool) {
        let Some(decoration) = self.decorated.get_mut(&window) else {
            return;
        };
        if decoration.hidden == fullscreen {
            return;
        }

        decoration.hidden = fullscreen;
        if fullscreen {
            decoration.apply(PrimitiveOp::Hide);
        } else {
            decoration.apply(PrimitiveOp::Show);
        }
    }

    /// Destroys everything owned by `window`'s decoration. No-op when the
    /// window has none.
    pub fn remove_decorations(&mut self, window: WindowId) {
        let cancelled = self.scheduler.cancel_owner(window);
        if cancelled > 0 {
            debug_if_enabled!("Cancelled {} deferred tasks of {}", cancelled, window);
        }

        if let Some(mut decoration) = self.decorated.remove(&window) {
            decoration.apply(PrimitiveOp::Destroy);
            debug!("Removed decorations of {} ({})", window, decoration.project_name);
        }
    }

    /// Rebuilds every decoration from the current settings.
    pub fn on_settings_changed(&mut self, ws: &dyn WindowSystem) {
        let windows: Vec<(WindowId, String)> = self
            .decorated
            .iter()
            .map(|(window, decoration)| (*window, decoration.project_name.clone()))
            .collect();

        info!("Settings changed, redecorating {} windows", windows.len());
        for (window, project_name) in windows {
            self.decorate_window(ws, window, &project_name);
        }
    }

    /// Resolves when the settings change. Never resolves once detached.
    pub async fn settings_changed(&mut self) {
        if let Some(changes) = self.changes.as_mut() {
            if changes.changed().await.is_ok() {
                return;
            }
            debug!("Settings source went away");
            self.changes = None;
        }
        std::future::pending::<()>().await
    }

    /// Runs the retries and repositions that are due this turn.
    pub fn run_deferred(&mut self, ws: &dyn WindowSystem) {
        for scheduled in self.scheduler.take_due() {
            let window = scheduled.owner;
            match scheduled.task {
                DeferredDecoration::Decorate { project_name, attempt } => {
                    self.build(ws, window, &project_name, attempt);
                }
                DeferredDecoration::RepositionBadge { attempt } => {
                    if let Some(decoration) = self.decorated.get_mut(&window) {
                        decoration.badge_task = None;
                    }
                    self.position_badge(ws, window, attempt);
                }
            }
        }
    }

    /// Tears down every decoration and detaches from the settings.
    pub fn destroy(&mut self) {
        let windows: Vec<WindowId> = self.decorated.keys().copied().collect();
        for window in windows {
            self.remove_decorations(window);
        }
        let cancelled = self.scheduler.cancel_all();
        self.changes = None;

        info!("DecorationManager destroyed ({} pending tasks cancelled)", cancelled);
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.scheduler.is_empty()
    }

    #[cfg(test)]
    pub fn is_decorated(&self, window: WindowId) -> bool {
        self.decorated.contains_key(&window)
    }

    pub fn decorated_count(&self) -> usize {
        self.decorated.len()
    }

    #[cfg(test)]
    pub fn project_name(&self, window: WindowId) -> Option<&str> {
        self.decorated.get(&window).map(|d| d.project_name.as_str())
    }

    #[cfg(test)]
    pub fn color(&self, window: WindowId) -> Option<&ProjectColor> {
        self.decorated.get(&window).map(|d| &d.color)
    }
}
