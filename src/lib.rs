#![doc = include_str!("../README.md")]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(
    clippy::similar_names,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

/// Batch evaluation of diagnosis runs over multiple reports and seeds.
pub mod batch;
/// Tools for analyzing collections of minimal conflict sets.
pub mod explanations;
/// Types and datastructures to represent and manage formulas effectively.
pub mod formulas;
/// Directed relation graphs over formula identifiers.
pub mod graphs;
/// Handlers for more control during some calculations.
pub mod handlers;
/// Functions for reading conflict-set reports from files.
pub mod io;
/// The abstract binary-program solver and the diagnosis functions on top of it.
pub mod solver;
mod util;
