//! Operations shared by all interface types.

use crate::{
    event_flags::EventFlags,
    status::{ModelError, Res},
    traits::{Common, Model, ModelLoggingCategory},
    InterfaceType,
};

use super::{ModelInstance, ModelState};

impl<M: Model> Common for ModelInstance<M> {
    fn set_debug_logging(
        &mut self,
        logging_on: bool,
        categories: &[&str],
    ) -> Result<Res, ModelError> {
        if categories.is_empty() {
            for enabled in self.context.logging_on.values_mut() {
                *enabled = logging_on;
            }
            return Ok(Res::OK);
        }
        for name in categories {
            match name.parse::<M::LoggingCategory>() {
                Ok(category) => {
                    self.context.logging_on.insert(category, logging_on);
                }
                Err(_) => {
                    self.context.log(
                        ModelError::Error,
                        M::LoggingCategory::error_category(),
                        format_args!("Unknown logging category: {name}"),
                    );
                    return Err(ModelError::Error);
                }
            }
        }
        Ok(Res::OK)
    }

    fn enter_initialization_mode(
        &mut self,
        tolerance: Option<f64>,
        start_time: f64,
        stop_time: Option<f64>,
    ) -> Result<Res, ModelError> {
        self.require_state("enter_initialization_mode", &[ModelState::Instantiated])?;
        self.context.log(
            Res::OK,
            M::LoggingCategory::trace_category(),
            format_args!(
                "enter_initialization_mode(tolerance = {tolerance:?}, start_time = {start_time}, stop_time = {stop_time:?})"
            ),
        );

        self.start_time = start_time;
        self.n_steps = 0;
        self.next_communication_point = start_time;
        self.context.set_time(start_time);
        self.context.tolerance = tolerance;
        self.context.stop_time = stop_time;
        self.state = ModelState::InitializationMode;
        Ok(Res::OK)
    }

    fn exit_initialization_mode(&mut self) -> Result<Res, ModelError> {
        self.require_state("exit_initialization_mode", &[ModelState::InitializationMode])?;

        self.update_dirty_values()?;
        self.prime_event_indicators()?;

        self.state = match self.interface_type {
            InterfaceType::ModelExchange => ModelState::EventMode,
            InterfaceType::CoSimulation => {
                if self.event_mode_used {
                    ModelState::EventMode
                } else {
                    ModelState::StepMode
                }
            }
            InterfaceType::ScheduledExecution => ModelState::ClockActivationMode,
        };
        Ok(Res::OK)
    }

    fn enter_event_mode(&mut self) -> Result<Res, ModelError> {
        self.require_state(
            "enter_event_mode",
            &[ModelState::ContinuousTimeMode, ModelState::StepMode],
        )?;
        if self.interface_type == InterfaceType::CoSimulation && !self.event_mode_used {
            self.context.log(
                ModelError::Error,
                M::LoggingCategory::error_category(),
                format_args!("enter_event_mode: the instance was created without event mode"),
            );
            self.state = ModelState::Error;
            return Err(ModelError::Error);
        }
        self.state = ModelState::EventMode;
        Ok(Res::OK)
    }

    fn update_discrete_states(&mut self) -> Result<EventFlags, ModelError> {
        self.require_state("update_discrete_states", &[ModelState::EventMode])?;

        self.event_update()?;
        // The event may have moved state variables; re-baseline the
        // indicators so the jump itself is not re-detected as a crossing.
        self.prime_event_indicators()?;

        self.context.log(
            Res::OK,
            M::LoggingCategory::trace_category(),
            format_args!("update_discrete_states -> {:?}", self.event_flags),
        );
        Ok(self.event_flags)
    }

    fn enter_configuration_mode(&mut self) -> Result<Res, ModelError> {
        self.require_state(
            "enter_configuration_mode",
            &[
                ModelState::Instantiated,
                ModelState::EventMode,
                ModelState::StepMode,
                ModelState::ClockActivationMode,
            ],
        )?;
        self.state = if self.state == ModelState::Instantiated {
            ModelState::ConfigurationMode
        } else {
            ModelState::ReconfigurationMode
        };
        Ok(Res::OK)
    }

    fn exit_configuration_mode(&mut self) -> Result<Res, ModelError> {
        self.require_state(
            "exit_configuration_mode",
            &[ModelState::ConfigurationMode, ModelState::ReconfigurationMode],
        )?;
        self.state = match (self.state, self.interface_type) {
            (ModelState::ConfigurationMode, _) => ModelState::Instantiated,
            (_, InterfaceType::ModelExchange) => ModelState::EventMode,
            (_, InterfaceType::CoSimulation) => ModelState::StepMode,
            (_, InterfaceType::ScheduledExecution) => ModelState::ClockActivationMode,
        };
        // Structural parameters may have changed the model dimensions' worth
        // of derived values; recompute lazily on the next get.
        self.is_dirty_values = true;
        Ok(Res::OK)
    }

    fn get_outputs(&mut self, values: &mut [f64]) -> Result<Res, ModelError> {
        self.expect_len("get_outputs", values.len(), M::output_names().len())?;
        let res = self.update_dirty_values()?;
        self.model.get_outputs(values);
        Ok(res)
    }

    fn terminate(&mut self) -> Result<Res, ModelError> {
        self.require_state(
            "terminate",
            &[
                ModelState::EventMode,
                ModelState::ContinuousTimeMode,
                ModelState::StepMode,
                ModelState::ClockActivationMode,
            ],
        )?;
        self.context.log(
            Res::OK,
            M::LoggingCategory::trace_category(),
            format_args!("terminate at t = {}", self.context.time()),
        );
        self.state = ModelState::Terminated;
        Ok(Res::OK)
    }

    fn reset(&mut self) -> Result<Res, ModelError> {
        self.context.log(
            Res::OK,
            M::LoggingCategory::trace_category(),
            format_args!("reset"),
        );

        self.model = M::default();
        self.event_flags.reset();
        self.model.set_start_values(&mut self.event_flags);

        self.x.fill(0.0);
        self.dx.fill(0.0);
        self.z.fill(0.0);
        self.prez.fill(0.0);
        self.start_time = 0.0;
        self.n_steps = 0;
        self.next_communication_point = 0.0;
        self.context.set_time(0.0);
        self.context.stop_time = None;
        self.context.tolerance = None;
        self.is_dirty_values = true;
        self.state = ModelState::Instantiated;
        Ok(Res::OK)
    }
}
