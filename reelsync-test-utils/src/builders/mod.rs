//! Builders for test data

pub mod test_data;

pub use test_data::{
    media, paged, playlist, playlist_item, profile, reco, reco_target, watchlist_entry,
};
