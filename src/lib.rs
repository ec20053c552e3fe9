//! Jacobi relaxation for the stationary membrane deflection problem `Δu = θ` on a
//! square grid, decomposed into row stripes over ranks that only communicate by
//! message passing.

pub mod assemble;
pub mod cli;
pub mod comm;
pub mod config;
pub mod csv_writer;
pub mod error;
pub mod halo;
pub mod partition;
pub mod reference;
pub mod reporter;
pub mod solver;
pub mod stencil;
pub mod timer;
pub mod types;

pub use error::{SolverError, SolverResult};
