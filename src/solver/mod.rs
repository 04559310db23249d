//! Time integration for Model Exchange instances. The solver owns the state
//! and indicator buffers and drives the instance through the
//! [`ModelExchange`] primitives.

mod euler;

pub use euler::Euler;

use crate::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("model returned {0} during a solver step")]
    Model(#[from] ModelError),
}

pub trait Solver<Inst> {
    fn new(start_time: f64, tolerance: Option<f64>, nx: usize, nz: usize) -> Self;

    /// Advance the instance to `next_time`. Returns the reached time and
    /// whether a state event occurred over the step.
    fn step(&mut self, inst: &mut Inst, next_time: f64) -> Result<(f64, bool), SolverError>;

    /// Re-read states and indicators from the instance. Must be called once
    /// after initialization and after every event that changed states.
    fn reset(&mut self, inst: &mut Inst, time: f64) -> Result<(), SolverError>;
}
