pub mod manager;
pub mod primitives;
#[cfg(test)]
pub mod recording;
mod tracing_primitives;

pub use manager::{DecorationManager, SettingsReceiver};
pub use tracing_primitives::TracingPrimitives;
