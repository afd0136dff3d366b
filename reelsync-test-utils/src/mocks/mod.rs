//! Mock implementations of the sync core's collaborator seams

pub mod backend;
pub mod realtime;
pub mod ui;

pub use backend::MockBackend;
pub use realtime::MockChannel;
pub use ui::{MemoryKv, RecordingNotifier, StaticCatalog};
