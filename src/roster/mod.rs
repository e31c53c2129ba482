//! Source and destination roster types.
//!
//! The source side mirrors the save being converted: armies holding
//! aggregate per-category strengths. The destination side holds the
//! discrete regiments the engine produces.

pub mod category;
pub mod dest;
pub mod source;

pub use category::{UnitCategory, ALL_CATEGORIES, CATEGORY_COUNT, CATEGORY_INFO};
pub use dest::{DestinationArmy, Regiment, EXCLUDED_REMAINDER};
pub use source::{SourceArmy, SourceUnitGroup};
