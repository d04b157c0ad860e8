mod conflict_set;
mod credit;

pub use conflict_set::*;
pub use credit::*;
