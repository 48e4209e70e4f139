pub mod window;

pub use window::{
    Rect, SurfaceId, TrackerEvent, WindowEvent, WindowId, WindowProps, WindowSignal, WindowUpdate,
};
