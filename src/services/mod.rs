pub mod color;
pub mod decoration;
pub mod retry_scheduler;
pub mod session;
pub mod settings;
pub mod window_system;
pub mod window_tracker;

pub use decoration::{DecorationManager, TracingPrimitives};
pub use session::Session;
pub use settings::SettingsStore;
pub use window_system::create_window_source;
pub use window_tracker::WindowTracker;
