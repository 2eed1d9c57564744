//! # Progression Module
//!
//! The boundary to the authoritative player store. The combat loop only
//! ever talks to [`ProgressionStore`]; the in-memory implementation backs
//! the shipped binary and the test suites, and applies the exact leveling
//! formula the remote store uses.

pub mod store;

pub use store::*;
