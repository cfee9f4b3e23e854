//! Retrieval policy selection.
//!
//! The rack's store-order sequence is the only source of LIFO/FIFO
//! semantics; removals drop ids from it by value, so arrival order is kept
//! across interleaved retrievals.

mod policy;
mod selector;

pub use policy::{RetrievalMode, RetrievalPolicy, RetrievalRequest};
pub use selector::RetrievalSelector;
