//! In-memory rule store keyed by monotonically increasing identifiers

mod rule_store;


pub use rule_store::*;
