use crate::events::{Rect, SurfaceId};
use crate::services::color::ProjectColor;

/// A visual element attached to one window's render surface.
///
/// Every operation may be called redundantly. `destroy` is valid in any
/// state, including on a primitive that is hidden or was never shown.
pub trait Primitive {
    fn set_color(&mut self, color: &ProjectColor);
    fn resize_to(&mut self, rect: Rect);
    fn show(&mut self);
    fn hide(&mut self);
    fn destroy(&mut self);
}

/// The project label in a window corner.
pub trait BadgePrimitive: Primitive {
    fn set_text(&mut self, text: &str);
    /// Width after layout, `<= 0` while the label is not measured yet.
    fn measured_width(&self) -> i32;
    fn move_to(&mut self, x: i32, y: i32);
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorderConfig {
    pub color: ProjectColor,
    pub width: i32,
    pub radius: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    pub color: ProjectColor,
    /// Percent, 0..=100.
    pub opacity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadgeConfig {
    pub text: String,
    pub color: ProjectColor,
}

/// Frame painted only when the window is drawn as a thumbnail.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameEffectConfig {
    pub color: ProjectColor,
}

/// Creates primitives attached to a render surface.
pub trait PrimitiveFactory {
    fn create_border(&mut self, surface: SurfaceId, config: BorderConfig) -> Box<dyn Primitive>;
    fn create_overlay(&mut self, surface: SurfaceId, config: OverlayConfig) -> Box<dyn Primitive>;
    fn create_badge(&mut self, surface: SurfaceId, config: BadgeConfig) -> Box<dyn BadgePrimitive>;
    fn create_frame_effect(&mut self, surface: SurfaceId, config: FrameEffectConfig) -> Box<dyn Primitive>;
}
