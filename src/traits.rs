//! Traits at the seams of the runtime: the model equations provider and the
//! instance interfaces exposed to an orchestrator.

use std::{fmt::Display, str::FromStr};

use crate::{
    event_flags::EventFlags,
    instance::ModelContext,
    status::{ModelError, Res},
    ValueReference,
};

#[cfg(feature = "cs")]
use crate::instance::DoStepResult;

/// Logging category type of a model, an enum mapping category names to the
/// instance-level enable flags toggled by `set_debug_logging`.
pub trait ModelLoggingCategory: Display + FromStr + Ord + Copy + Default + 'static {
    /// All categories the model declares.
    fn all_categories() -> impl Iterator<Item = Self>;
    /// Category used for tracing API calls and events.
    fn trace_category() -> Self;
    /// Category used for error reporting. Enabled by default.
    fn error_category() -> Self;
}

/// The standard category set of the reference models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum DefaultLoggingCategory {
    /// Event detection and handling.
    #[default]
    Events,
    /// Non-OK statuses returned by any operation.
    StatusError,
    /// Call tracing.
    Trace,
}

impl Display for DefaultLoggingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Events => write!(f, "logEvents"),
            Self::StatusError => write!(f, "logStatusError"),
            Self::Trace => write!(f, "logTrace"),
        }
    }
}

impl FromStr for DefaultLoggingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "logEvents" => Ok(Self::Events),
            "logStatusError" => Ok(Self::StatusError),
            "logTrace" => Ok(Self::Trace),
            _ => Err(format!("Unknown logging category: {s}")),
        }
    }
}

impl ModelLoggingCategory for DefaultLoggingCategory {
    fn all_categories() -> impl Iterator<Item = Self> {
        [Self::Events, Self::StatusError, Self::Trace].into_iter()
    }

    fn trace_category() -> Self {
        Self::Trace
    }

    fn error_category() -> Self {
        Self::StatusError
    }
}

/// Model equations provider.
///
/// Implementations hold the model variables and expose the per-model math:
/// start values, derivatives, event indicators and the discrete event
/// handler. They carry no time-stepping knowledge; the surrounding
/// [`crate::ModelInstance`] owns time, the mode state machine and the solver
/// buffers.
///
/// Models with no continuous states or no event indicators keep the default
/// no-op implementations for the respective methods.
pub trait Model: Default + Sized {
    /// Model name used in the instance metadata and logging.
    const NAME: &'static str;
    /// Token checked at instantiation against the caller-supplied token.
    const INSTANTIATION_TOKEN: &'static str;
    /// Number of continuous states.
    const N_STATES: usize;
    /// Number of event indicators.
    const N_EVENT_INDICATORS: usize;
    /// Internal fixed solver step for Co-Simulation.
    const FIXED_SOLVER_STEP: f64;
    /// Default experiment stop time.
    const DEFAULT_STOP_TIME: f64;

    type LoggingCategory: ModelLoggingCategory;

    /// Initialize all model variables. Called at instantiation and on reset.
    /// An initial time event may be armed through `event_flags`.
    fn set_start_values(&mut self, event_flags: &mut EventFlags);

    /// Recompute derived and output variables. Called lazily before a get
    /// when values are dirty.
    fn calculate_values(&mut self, _context: &ModelContext<Self>) -> Result<Res, ModelError> {
        Ok(Res::OK)
    }

    /// Write the continuous state vector into `x` (length `N_STATES`).
    fn get_continuous_states(&self, _x: &mut [f64]) {}

    /// Overwrite the continuous state vector from `x` (length `N_STATES`).
    fn set_continuous_states(&mut self, _x: &[f64]) {}

    /// Derivatives of the continuous states at the current state and time.
    fn get_derivatives(&self, _dx: &mut [f64]) -> Result<Res, ModelError> {
        Ok(Res::OK)
    }

    /// Event indicator values at the current state and time.
    fn get_event_indicators(
        &self,
        _context: &ModelContext<Self>,
        z: &mut [f64],
    ) -> Result<Res, ModelError> {
        z.fill(0.0);
        Ok(Res::OK)
    }

    /// Discrete event handler. Updates discrete variables and reports what
    /// changed through `event_flags`, which have been reset beforehand.
    fn event_update(
        &mut self,
        _context: &ModelContext<Self>,
        _event_flags: &mut EventFlags,
    ) -> Result<Res, ModelError> {
        Ok(Res::OK)
    }

    /// Nominal values of the continuous states, 1.0 by default.
    fn get_nominals_of_continuous_states(&self, nominals: &mut [f64]) {
        nominals.fill(1.0);
    }

    /// Names of the observable outputs, in the order `get_outputs` fills them.
    fn output_names() -> &'static [&'static str] {
        &[]
    }

    /// Current output values (length `output_names().len()`).
    fn get_outputs(&self, _values: &mut [f64]) {}

    /// Activate a clocked model partition (Scheduled Execution only).
    fn activate_model_partition(
        &mut self,
        _context: &ModelContext<Self>,
        _clock: ValueReference,
        _activation_time: f64,
    ) -> Result<Res, ModelError> {
        Err(ModelError::Error)
    }
}

/// Operations common to all interface types, gated by the mode state machine.
pub trait Common {
    /// Enable or disable logging categories. An empty `categories` slice
    /// applies `logging_on` to every category.
    fn set_debug_logging(&mut self, logging_on: bool, categories: &[&str])
        -> Result<Res, ModelError>;

    fn enter_initialization_mode(
        &mut self,
        tolerance: Option<f64>,
        start_time: f64,
        stop_time: Option<f64>,
    ) -> Result<Res, ModelError>;

    fn exit_initialization_mode(&mut self) -> Result<Res, ModelError>;

    fn enter_event_mode(&mut self) -> Result<Res, ModelError>;

    /// One event iteration: run the model's event update and return the
    /// resulting flags. The caller keeps iterating while
    /// `discrete_states_need_update` is set.
    fn update_discrete_states(&mut self) -> Result<EventFlags, ModelError>;

    fn enter_configuration_mode(&mut self) -> Result<Res, ModelError>;

    fn exit_configuration_mode(&mut self) -> Result<Res, ModelError>;

    /// Read the model's observable outputs, recomputing dirty values first.
    fn get_outputs(&mut self, values: &mut [f64]) -> Result<Res, ModelError>;

    fn terminate(&mut self) -> Result<Res, ModelError>;

    /// Return the instance to the `Instantiated` state with start values.
    fn reset(&mut self) -> Result<Res, ModelError>;
}

/// Model Exchange: the orchestrator owns the integration loop and drives the
/// instance through these primitives.
#[cfg(feature = "me")]
pub trait ModelExchange: Common {
    fn enter_continuous_time_mode(&mut self) -> Result<Res, ModelError>;

    /// Notification after each completed integrator step. Returns
    /// `(enter_event_mode, terminate_simulation)`.
    fn completed_integrator_step(
        &mut self,
        no_set_state_prior: bool,
    ) -> Result<(bool, bool), ModelError>;

    fn set_time(&mut self, time: f64) -> Result<Res, ModelError>;

    fn set_continuous_states(&mut self, states: &[f64]) -> Result<Res, ModelError>;

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Result<Res, ModelError>;

    fn get_continuous_state_derivatives(
        &mut self,
        derivatives: &mut [f64],
    ) -> Result<Res, ModelError>;

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Result<Res, ModelError>;

    fn get_nominals_of_continuous_states(&mut self, nominals: &mut [f64])
        -> Result<Res, ModelError>;

    fn get_number_of_continuous_states(&self) -> usize;

    fn get_number_of_event_indicators(&self) -> usize;
}

/// Co-Simulation: the instance owns its internal fixed-step integration loop
/// and is advanced through communication points.
#[cfg(feature = "cs")]
pub trait CoSimulation: Common {
    fn enter_step_mode(&mut self) -> Result<Res, ModelError>;

    /// Advance from `current_communication_point` by
    /// `communication_step_size`, handling events along the way. See
    /// [`DoStepResult`] for the possible outcomes.
    fn do_step(
        &mut self,
        current_communication_point: f64,
        communication_step_size: f64,
        no_set_state_prior: bool,
    ) -> Result<DoStepResult, ModelError>;
}

/// Scheduled Execution: the orchestrator activates clocked model partitions.
#[cfg(feature = "se")]
pub trait ScheduledExecution: Common {
    fn activate_model_partition(
        &mut self,
        clock: ValueReference,
        activation_time: f64,
    ) -> Result<Res, ModelError>;
}
