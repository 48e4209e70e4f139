//! Primitive backend that renders decorations as structured log records.
//!
//! Used when no compositor-side renderer is attached: every primitive
//! operation shows up under the `kodecanter::render` target.

use super::primitives::{
    BadgeConfig, BadgePrimitive, BorderConfig, FrameEffectConfig, OverlayConfig, Primitive, PrimitiveFactory,
};
use crate::events::{Rect, SurfaceId};
use crate::services::color::ProjectColor;
use tracing::{debug, info};

/// Rough glyph advance and padding of the badge label.
const BADGE_CHAR_WIDTH: i32 = 8;
const BADGE_PADDING: i32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Border { width: i32, radius: i32 },
    Overlay { opacity: i32 },
    Badge,
    FrameEffect,
}

struct LoggedPrimitive {
    kind: Kind,
    surface: SurfaceId,
    color: String,
    visible: bool,
    destroyed: bool,
}

impl LoggedPrimitive {
    fn new(kind: Kind, surface: SurfaceId, color: &ProjectColor) -> Self {
        info!(target: "kodecanter::render", surface = surface.0, ?kind, color = %color.hex, "create");
        Self {
            kind,
            surface,
            color: color.hex.clone(),
            visible: true,
            destroyed: false,
        }
    }
}

impl Primitive for LoggedPrimitive {
    fn set_color(&mut self, color: &ProjectColor) {
        if self.destroyed || self.color == color.hex {
            return;
        }
        self.color = color.hex.clone();
        match self.kind {
            Kind::Overlay { opacity } => {
                let rgba = color.with_alpha(f64::from(opacity) / 100.0);
                debug!(target: "kodecanter::render", surface = self.surface.0, ?rgba, "overlay color");
            }
            _ => debug!(target: "kodecanter::render", surface = self.surface.0, color = %self.color, "color"),
        }
    }

    fn resize_to(&mut self, rect: Rect) {
        if !self.destroyed {
            debug!(target: "kodecanter::render", surface = self.surface.0, kind = ?self.kind, ?rect, "resize");
        }
    }

    fn show(&mut self) {
        if !self.destroyed && !self.visible {
            self.visible = true;
            debug!(target: "kodecanter::render", surface = self.surface.0, kind = ?self.kind, "show");
        }
    }

    fn hide(&mut self) {
        if !self.destroyed && self.visible {
            self.visible = false;
            debug!(target: "kodecanter::render", surface = self.surface.0, kind = ?self.kind, "hide");
        }
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            info!(target: "kodecanter::render", surface = self.surface.0, kind = ?self.kind, "destroy");
        }
    }
}

struct LoggedBadge {
    inner: LoggedPrimitive,
    text: String,
}

impl Primitive for LoggedBadge {
    fn set_color(&mut self, color: &ProjectColor) {
        self.inner.set_color(color);
    }

    fn resize_to(&mut self, rect: Rect) {
        self.inner.resize_to(rect);
    }

    fn show(&mut self) {
        self.inner.show();
    }

    fn hide(&mut self) {
        self.inner.hide();
    }

    fn destroy(&mut self) {
        self.inner.destroy();
    }
}

impl BadgePrimitive for LoggedBadge {
    fn set_text(&mut self, text: &str) {
        if !self.inner.destroyed && self.text != text {
            self.text = text.to_string();
            debug!(target: "kodecanter::render", surface = self.inner.surface.0, text, "badge text");
        }
    }

    fn measured_width(&self) -> i32 {
        if self.text.is_empty() {
            return 0;
        }
        let chars = i32::try_from(self.text.chars().count()).unwrap_or(i32::MAX / BADGE_CHAR_WIDTH);
        chars.saturating_mul(BADGE_CHAR_WIDTH).saturating_add(BADGE_PADDING)
    }

    fn move_to(&mut self, x: i32, y: i32) {
        if !self.inner.destroyed {
            debug!(target: "kodecanter::render", surface = self.inner.surface.0, x, y, "badge position");
        }
    }
}

/// Factory for [`LoggedPrimitive`]s.
#[derive(Debug, Default)]
pub struct TracingPrimitives;

impl TracingPrimitives {
    pub fn new() -> Self {
        Self
    }
}

impl PrimitiveFactory for TracingPrimitives {
    fn create_border(&mut self, surface: SurfaceId, config: BorderConfig) -> Box<dyn Primitive> {
        Box::new(LoggedPrimitive::new(
            Kind::Border {
                width: config.width,
                radius: config.radius,
            },
            surface,
            &config.color,
        ))
    }

    fn create_overlay(&mut self, surface: SurfaceId, config: OverlayConfig) -> Box<dyn Primitive> {
        Box::new(LoggedPrimitive::new(
            Kind::Overlay {
                opacity: config.opacity,
            },
            surface,
            &config.color,
        ))
    }

    fn create_badge(&mut self, surface: SurfaceId, config: BadgeConfig) -> Box<dyn BadgePrimitive> {
        Box::new(LoggedBadge {
            inner: LoggedPrimitive::new(Kind::Badge, surface, &config.color),
            text: config.text,
        })
    }

    fn create_frame_effect(&mut self, surface: SurfaceId, config: FrameEffectConfig) -> Box<dyn Primitive> {
        Box::new(LoggedPrimitive::new(Kind::FrameEffect, surface, &config.color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::color::resolve;
    use std::collections::HashMap;

    #[test]
    fn test_badge_width_follows_text() {
        let mut factory = TracingPrimitives::new();
        let color = resolve("alpha", &HashMap::new());
        let mut badge = factory.create_badge(
            SurfaceId(1),
            BadgeConfig {
                text: "alpha".to_string(),
                color,
            },
        );

        assert_eq!(badge.measured_width(), 5 * BADGE_CHAR_WIDTH + BADGE_PADDING);
        badge.set_text("");
        assert_eq!(badge.measured_width(), 0);
    }

    #[test]
    fn test_operations_are_safe_after_destroy() {
        let mut factory = TracingPrimitives::new();
        let color = resolve("alpha", &HashMap::new());
        let mut border = factory.create_border(
            SurfaceId(1),
            BorderConfig {
                color: color.clone(),
                width: 3,
                radius: 12,
            },
        );

        border.hide();
        border.destroy();
        border.destroy();
        border.show();
        border.set_color(&color);
        border.resize_to(Rect::new(0, 0, 10, 10));
    }
}
