mod diagnosis_function;

pub use diagnosis_function::*;
