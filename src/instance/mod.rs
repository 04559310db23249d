//! The model instance: per-instance context, the mode state machine and the
//! execution engine wrapping a [`Model`].

use std::collections::BTreeMap;

use crate::{
    event_flags::EventFlags,
    status::{ModelError, Res, Status},
    traits::{Model, ModelLoggingCategory},
    InterfaceType,
};

mod common;
#[cfg(feature = "cs")]
mod co_simulation;
#[cfg(feature = "me")]
mod model_exchange;
#[cfg(feature = "se")]
mod scheduled_execution;

#[cfg(feature = "cs")]
pub use co_simulation::DoStepResult;

/// States of the instance mode state machine.
///
/// Every operation names the states it is allowed in; a call outside that set
/// moves the instance to [`ModelState::Error`] and fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Instantiated,
    ConfigurationMode,
    ReconfigurationMode,
    InitializationMode,
    EventMode,
    ContinuousTimeMode,
    StepMode,
    ClockActivationMode,
    IntermediateUpdateMode,
    Terminated,
    /// Terminal failure state. Only `reset` or dropping the instance leave it.
    Error,
}

/// Logging callback: receives the status the message is reported under, the
/// category name and the formatted message.
pub type LogMessageClosure = Box<dyn Fn(Status, &str, std::fmt::Arguments<'_>) + Send + Sync>;

/// Advisory callback pair used by preemptive Scheduled Execution schedulers to
/// protect variables shared between model partitions.
pub type PreemptionClosure = Box<dyn Fn() + Send + Sync>;

/// Callback invoked by the Co-Simulation engine at internal solver steps and
/// detected events. Returning `Some` requests an early return when the
/// instance allows it.
pub type IntermediateUpdateClosure = Box<dyn FnMut(&IntermediateUpdate) -> Option<EarlyReturn> + Send>;

/// Information passed to the intermediate update callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntermediateUpdate {
    /// Internal solver time the callback is invoked at.
    pub time: f64,
    /// An event was detected at `time`.
    pub event_occurred: bool,
    pub clocks_ticked: bool,
    pub intermediate_variable_set_requested: bool,
    pub intermediate_variable_get_allowed: bool,
    /// The internal solver step ending at `time` has completed.
    pub intermediate_step_finished: bool,
    /// Whether the instance honors an early-return request.
    pub can_return_early: bool,
}

/// Early-return request produced by the intermediate update callback.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EarlyReturn {
    /// Time the caller would like the step to halt at. Advisory: the engine
    /// always halts at the detection time of the current callback.
    pub requested_time: Option<f64>,
}

/// Options for a Co-Simulation instance.
#[derive(Default)]
pub struct CoSimulationOptions {
    /// The importer handles events itself: `do_step` returns at detected
    /// events instead of running the event update internally.
    pub event_mode_used: bool,
    /// `do_step` may return before reaching the communication point.
    pub early_return_allowed: bool,
    pub intermediate_update: Option<IntermediateUpdateClosure>,
}

/// Options for a Scheduled Execution instance.
#[derive(Default)]
pub struct ScheduledExecutionOptions {
    pub lock_preemption: Option<PreemptionClosure>,
    pub unlock_preemption: Option<PreemptionClosure>,
}

/// Per-instance environment handed to the [`Model`] callbacks: simulation
/// time, the experiment bounds, category-filtered logging and the preemption
/// lock pair.
pub struct ModelContext<M: Model> {
    instance_name: String,
    logging_on: BTreeMap<M::LoggingCategory, bool>,
    log_message: LogMessageClosure,
    time: f64,
    stop_time: Option<f64>,
    tolerance: Option<f64>,
    lock_preemption: Option<PreemptionClosure>,
    unlock_preemption: Option<PreemptionClosure>,
}

impl<M: Model> ModelContext<M> {
    fn new(instance_name: &str, logging_on: bool, log_message: Option<LogMessageClosure>) -> Self {
        let log_message = log_message.unwrap_or_else(|| {
            let name = instance_name.to_string();
            Box::new(move |status: Status, category: &str, args: std::fmt::Arguments<'_>| {
                let level = match status {
                    Status::OK => log::Level::Debug,
                    Status::Warning | Status::Discard => log::Level::Warn,
                    Status::Error | Status::Fatal => log::Level::Error,
                };
                log::log!(target: "fmu", level, "[{name}] {category}: {args}");
            })
        });
        Self {
            instance_name: instance_name.to_string(),
            logging_on: M::LoggingCategory::all_categories()
                .map(|category| (category, logging_on))
                .collect(),
            log_message,
            time: 0.0,
            stop_time: None,
            tolerance: None,
            lock_preemption: None,
            unlock_preemption: None,
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Current simulation time as seen by the model callbacks.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub(crate) fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Stop time of the current experiment, if one was given.
    pub fn stop_time(&self) -> Option<f64> {
        self.stop_time
    }

    /// Solver tolerance of the current experiment, if one was given.
    pub fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }

    /// Log a message under `category`, dropped unless the category is enabled.
    pub fn log(
        &self,
        status: impl Into<Status>,
        category: M::LoggingCategory,
        args: std::fmt::Arguments<'_>,
    ) {
        if self.logging_on.get(&category).copied().unwrap_or_default() {
            (self.log_message)(status.into(), &category.to_string(), args);
        }
    }

    /// Enter the critical section protecting variables shared between model
    /// partitions. No-op unless the scheduler registered the callback pair.
    pub fn lock_preemption(&self) {
        if let Some(lock) = &self.lock_preemption {
            lock();
        }
    }

    /// Leave the critical section entered by [`Self::lock_preemption`].
    pub fn unlock_preemption(&self) {
        if let Some(unlock) = &self.unlock_preemption {
            unlock();
        }
    }
}

/// An instantiated model: the [`Model`] equations plus everything the runtime
/// tracks for it.
///
/// Created through one of the per-interface constructors; driven through the
/// [`crate::Common`] operations and the interface-specific trait.
pub struct ModelInstance<M: Model> {
    context: ModelContext<M>,
    interface_type: InterfaceType,
    state: ModelState,
    event_flags: EventFlags,
    /// Continuous states and their derivatives.
    x: Vec<f64>,
    dx: Vec<f64>,
    /// Event indicators of the current and the previous micro-step.
    z: Vec<f64>,
    prez: Vec<f64>,
    start_time: f64,
    /// Completed internal solver steps since `start_time`. Time is always
    /// recomputed as `start_time + n_steps * h` to avoid accumulating
    /// round-off.
    n_steps: usize,
    /// Derived values are stale and must be recomputed before the next get.
    is_dirty_values: bool,
    next_communication_point: f64,
    event_mode_used: bool,
    early_return_allowed: bool,
    intermediate_update: Option<IntermediateUpdateClosure>,
    model: M,
}

impl<M: Model> ModelInstance<M> {
    fn new(
        instance_name: &str,
        instantiation_token: &str,
        interface_type: InterfaceType,
        logging_on: bool,
    ) -> Result<Self, ModelError> {
        let context = ModelContext::new(instance_name, logging_on, None);
        if instance_name.is_empty() {
            context.log(
                ModelError::Error,
                M::LoggingCategory::error_category(),
                format_args!("Missing instance name"),
            );
            return Err(ModelError::Error);
        }
        if instantiation_token != M::INSTANTIATION_TOKEN {
            context.log(
                ModelError::Error,
                M::LoggingCategory::error_category(),
                format_args!("Wrong instantiation token for model {}", M::NAME),
            );
            return Err(ModelError::Error);
        }

        let mut model = M::default();
        let mut event_flags = EventFlags::default();
        model.set_start_values(&mut event_flags);

        Ok(Self {
            context,
            interface_type,
            state: ModelState::Instantiated,
            event_flags,
            x: vec![0.0; M::N_STATES],
            dx: vec![0.0; M::N_STATES],
            z: vec![0.0; M::N_EVENT_INDICATORS],
            prez: vec![0.0; M::N_EVENT_INDICATORS],
            start_time: 0.0,
            n_steps: 0,
            is_dirty_values: true,
            next_communication_point: 0.0,
            event_mode_used: false,
            early_return_allowed: false,
            intermediate_update: None,
            model,
        })
    }

    /// Create a Model Exchange instance.
    #[cfg(feature = "me")]
    pub fn new_model_exchange(
        instance_name: &str,
        instantiation_token: &str,
        logging_on: bool,
    ) -> Result<Self, ModelError> {
        Self::new(
            instance_name,
            instantiation_token,
            InterfaceType::ModelExchange,
            logging_on,
        )
    }

    /// Create a Co-Simulation instance.
    #[cfg(feature = "cs")]
    pub fn new_co_simulation(
        instance_name: &str,
        instantiation_token: &str,
        logging_on: bool,
        options: CoSimulationOptions,
    ) -> Result<Self, ModelError> {
        let mut instance = Self::new(
            instance_name,
            instantiation_token,
            InterfaceType::CoSimulation,
            logging_on,
        )?;
        instance.event_mode_used = options.event_mode_used;
        instance.early_return_allowed = options.early_return_allowed;
        instance.intermediate_update = options.intermediate_update;
        Ok(instance)
    }

    /// Create a Scheduled Execution instance.
    #[cfg(feature = "se")]
    pub fn new_scheduled_execution(
        instance_name: &str,
        instantiation_token: &str,
        logging_on: bool,
        options: ScheduledExecutionOptions,
    ) -> Result<Self, ModelError> {
        let mut instance = Self::new(
            instance_name,
            instantiation_token,
            InterfaceType::ScheduledExecution,
            logging_on,
        )?;
        instance.context.lock_preemption = options.lock_preemption;
        instance.context.unlock_preemption = options.unlock_preemption;
        Ok(instance)
    }

    pub fn instance_name(&self) -> &str {
        self.context.instance_name()
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.context.time()
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn context(&self) -> &ModelContext<M> {
        &self.context
    }

    /// Internal solver steps completed since the start of the experiment.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the model, for setting parameters and inputs.
    /// Marks derived values dirty.
    pub fn model_mut(&mut self) -> &mut M {
        self.is_dirty_values = true;
        &mut self.model
    }

    /// Check that the current state allows `function`; otherwise log, move to
    /// the `Error` state and fail.
    fn require_state(
        &mut self,
        function: &'static str,
        allowed: &[ModelState],
    ) -> Result<(), ModelError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        self.context.log(
            ModelError::Error,
            M::LoggingCategory::error_category(),
            format_args!("{function}: illegal call sequence in state {:?}", self.state),
        );
        self.state = ModelState::Error;
        Err(ModelError::Error)
    }

    /// Check that the instance was created for `expected`.
    fn require_interface(
        &mut self,
        function: &'static str,
        expected: InterfaceType,
    ) -> Result<(), ModelError> {
        if self.interface_type == expected {
            return Ok(());
        }
        self.context.log(
            ModelError::Error,
            M::LoggingCategory::error_category(),
            format_args!(
                "{function} is a {expected} operation, but the instance was created for {}",
                self.interface_type
            ),
        );
        self.state = ModelState::Error;
        Err(ModelError::Error)
    }

    /// Check a caller-supplied buffer length against the declared dimension.
    fn expect_len(
        &self,
        function: &'static str,
        actual: usize,
        expected: usize,
    ) -> Result<(), ModelError> {
        if actual == expected {
            return Ok(());
        }
        self.context.log(
            ModelError::Error,
            M::LoggingCategory::error_category(),
            format_args!("{function}: expected a buffer of length {expected}, got {actual}"),
        );
        Err(ModelError::Error)
    }

    /// Recompute derived values if a set has invalidated them.
    fn update_dirty_values(&mut self) -> Result<Res, ModelError> {
        let mut res = Res::OK;
        if self.is_dirty_values {
            res = self.model.calculate_values(&self.context)?;
            self.is_dirty_values = false;
        }
        Ok(res)
    }

    /// Establish the event indicator baseline for crossing detection.
    fn prime_event_indicators(&mut self) -> Result<Res, ModelError> {
        if M::N_EVENT_INDICATORS > 0 {
            self.model.get_event_indicators(&self.context, &mut self.prez)
        } else {
            Ok(Res::OK)
        }
    }

    /// Run one discrete event update of the model.
    fn event_update(&mut self) -> Result<Res, ModelError> {
        self.event_flags.reset();
        let res = self.model.event_update(&self.context, &mut self.event_flags)?;
        self.is_dirty_values = true;
        Ok(res)
    }

    /// Invoke the intermediate update callback, if registered. Returns the
    /// early-return request only when the instance allows early return.
    #[cfg(feature = "cs")]
    fn call_intermediate_update(
        &mut self,
        event_occurred: bool,
        step_finished: bool,
    ) -> Option<EarlyReturn> {
        let callback = self.intermediate_update.as_mut()?;
        let info = IntermediateUpdate {
            time: self.context.time(),
            event_occurred,
            clocks_ticked: false,
            intermediate_variable_set_requested: false,
            intermediate_variable_get_allowed: true,
            intermediate_step_finished: step_finished,
            can_return_early: self.early_return_allowed,
        };
        let previous_state = self.state;
        self.state = ModelState::IntermediateUpdateMode;
        let early_return = callback(&info);
        self.state = previous_state;
        early_return.filter(|_| self.early_return_allowed)
    }
}
