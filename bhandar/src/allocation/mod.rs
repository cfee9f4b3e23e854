//! Slot allocation for incoming boxes.

mod slot;

pub use slot::SlotAllocator;
