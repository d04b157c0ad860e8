mod enumerative;
mod functions;
mod milp;

pub use enumerative::*;
pub use functions::*;
pub use milp::*;
