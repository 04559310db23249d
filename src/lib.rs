//! The `fmu` crate is a fixed-step hybrid simulation runtime for exportable
//! FMU-style models. A user model implements the [`Model`] trait (start
//! values, derivatives, event indicators, discrete event handling) and is
//! wrapped in a [`ModelInstance`], which provides the mode state machine and
//! the execution engine: Co-Simulation stepping via
//! [`CoSimulation::do_step`], the externally driven Model Exchange surface,
//! and clocked partition activation for Scheduled Execution.
//!
//! ## Example
//!
//! ```rust,no_run
//! use fmu::{CoSimulation as _, Common as _, CoSimulationOptions, EventFlags, Model, ModelInstance};
//!
//! /// Exponential decay, `der(x) = -k * x`.
//! #[derive(Default, Debug)]
//! struct Decay {
//!     x: f64,
//!     k: f64,
//! }
//!
//! impl Model for Decay {
//!     const NAME: &'static str = "Decay";
//!     const INSTANTIATION_TOKEN: &'static str = "{decay-example}";
//!     const N_STATES: usize = 1;
//!     const N_EVENT_INDICATORS: usize = 0;
//!     const FIXED_SOLVER_STEP: f64 = 0.1;
//!     const DEFAULT_STOP_TIME: f64 = 10.0;
//!     type LoggingCategory = fmu::DefaultLoggingCategory;
//!
//!     fn set_start_values(&mut self, _event_flags: &mut EventFlags) {
//!         self.x = 1.0;
//!         self.k = 1.0;
//!     }
//!
//!     fn get_continuous_states(&self, x: &mut [f64]) {
//!         x[0] = self.x;
//!     }
//!
//!     fn set_continuous_states(&mut self, x: &[f64]) {
//!         self.x = x[0];
//!     }
//!
//!     fn get_derivatives(&self, dx: &mut [f64]) -> Result<fmu::Res, fmu::ModelError> {
//!         dx[0] = -self.k * self.x;
//!         Ok(fmu::Res::OK)
//!     }
//! }
//!
//! fn main() -> Result<(), fmu::ModelError> {
//!     let mut inst = ModelInstance::<Decay>::new_co_simulation(
//!         "decay1",
//!         Decay::INSTANTIATION_TOKEN,
//!         false,
//!         CoSimulationOptions::default(),
//!     )?;
//!     inst.enter_initialization_mode(None, 0.0, Some(10.0))?;
//!     inst.exit_initialization_mode()?;
//!     let result = inst.do_step(0.0, 1.0, true)?;
//!     assert!(!result.terminate_simulation);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![deny(clippy::all)]

pub mod event_flags;
pub mod events;
pub mod instance;
#[cfg(feature = "me")]
pub mod solver;
pub mod status;
pub mod traits;

pub use event_flags::EventFlags;
#[cfg(feature = "cs")]
pub use instance::{CoSimulationOptions, DoStepResult, EarlyReturn, IntermediateUpdate};
pub use instance::{ModelContext, ModelInstance, ModelState};
#[cfg(feature = "se")]
pub use instance::ScheduledExecutionOptions;
pub use status::{ModelError, Res, Status};
#[cfg(feature = "cs")]
pub use traits::CoSimulation;
#[cfg(feature = "me")]
pub use traits::ModelExchange;
#[cfg(feature = "se")]
pub use traits::ScheduledExecution;
pub use traits::{Common, DefaultLoggingCategory, Model, ModelLoggingCategory};

/// Identifies a clock variable in Scheduled Execution.
pub type ValueReference = u32;

/// The interface type an instance was created for.
///
/// Every operation of the instance API belongs to one (or all) of these;
/// calling an operation of a different interface is a protocol error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceType {
    ModelExchange,
    CoSimulation,
    ScheduledExecution,
}

impl std::fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelExchange => write!(f, "Model Exchange"),
            Self::CoSimulation => write!(f, "Co-Simulation"),
            Self::ScheduledExecution => write!(f, "Scheduled Execution"),
        }
    }
}
