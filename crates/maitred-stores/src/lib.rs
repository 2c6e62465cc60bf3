//! # Maitred Stores
//!
//! Persistence collaborators. The only implementation today writes one
//! JSON snapshot per finished negotiation to a local directory.

mod snapshot;

pub use snapshot::JsonSnapshotStore;
