//! Core value types shared by every layer.
//!
//! - [`GridCell`]: a (row, col) cell on the rack grid
//! - [`Footprint`]: the rectangular extent of a box (width rows × length columns)
//! - [`BoxId`] / [`ModelId`]: identifiers for stored boxes and catalog models
//! - [`LocationCode`]: numbered rack locations ("pcode-N")

mod cell;
mod footprint;
mod ids;
mod location;

pub use cell::GridCell;
pub use footprint::Footprint;
pub use ids::{BoxId, ModelId};
pub use location::LocationCode;
