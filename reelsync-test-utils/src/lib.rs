//! Test utilities for the reelsync workspace
//!
//! This crate provides mock implementations, test builders and fixtures
//! for testing the sync core without a real backend or realtime socket.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::{media, paged, playlist_item, profile, reco, watchlist_entry};
pub use mocks::{MemoryKv, MockBackend, MockChannel, RecordingNotifier, StaticCatalog};
