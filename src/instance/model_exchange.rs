//! The Model Exchange surface: the orchestrator integrates the model itself
//! and drives the instance through state getters/setters and mode changes.

use crate::{
    status::{ModelError, Res, Status},
    traits::{Model, ModelExchange},
    InterfaceType,
};

use super::{ModelInstance, ModelState};

impl<M: Model> ModelExchange for ModelInstance<M> {
    fn enter_continuous_time_mode(&mut self) -> Result<Res, ModelError> {
        self.require_interface("enter_continuous_time_mode", InterfaceType::ModelExchange)?;
        self.require_state("enter_continuous_time_mode", &[ModelState::EventMode])?;
        self.state = ModelState::ContinuousTimeMode;
        Ok(Res::OK)
    }

    fn completed_integrator_step(
        &mut self,
        _no_set_state_prior: bool,
    ) -> Result<(bool, bool), ModelError> {
        self.require_interface("completed_integrator_step", InterfaceType::ModelExchange)?;
        self.require_state("completed_integrator_step", &[ModelState::ContinuousTimeMode])?;
        // The reference models never request a mode change or termination
        // from the step notification; events surface through the indicators.
        Ok((false, false))
    }

    fn set_time(&mut self, time: f64) -> Result<Res, ModelError> {
        self.require_interface("set_time", InterfaceType::ModelExchange)?;
        self.require_state(
            "set_time",
            &[ModelState::EventMode, ModelState::ContinuousTimeMode],
        )?;
        self.context.set_time(time);
        Ok(Res::OK)
    }

    fn set_continuous_states(&mut self, states: &[f64]) -> Result<Res, ModelError> {
        self.require_interface("set_continuous_states", InterfaceType::ModelExchange)?;
        self.require_state("set_continuous_states", &[ModelState::ContinuousTimeMode])?;
        self.expect_len("set_continuous_states", states.len(), M::N_STATES)?;
        self.model.set_continuous_states(states);
        self.is_dirty_values = true;
        Ok(Res::OK)
    }

    fn get_continuous_states(&mut self, states: &mut [f64]) -> Result<Res, ModelError> {
        self.require_interface("get_continuous_states", InterfaceType::ModelExchange)?;
        self.require_state(
            "get_continuous_states",
            &[
                ModelState::InitializationMode,
                ModelState::EventMode,
                ModelState::ContinuousTimeMode,
                ModelState::Terminated,
            ],
        )?;
        self.expect_len("get_continuous_states", states.len(), M::N_STATES)?;
        self.model.get_continuous_states(states);
        Ok(Res::OK)
    }

    fn get_continuous_state_derivatives(
        &mut self,
        derivatives: &mut [f64],
    ) -> Result<Res, ModelError> {
        self.require_interface(
            "get_continuous_state_derivatives",
            InterfaceType::ModelExchange,
        )?;
        self.require_state(
            "get_continuous_state_derivatives",
            &[
                ModelState::InitializationMode,
                ModelState::EventMode,
                ModelState::ContinuousTimeMode,
                ModelState::Terminated,
            ],
        )?;
        self.expect_len(
            "get_continuous_state_derivatives",
            derivatives.len(),
            M::N_STATES,
        )?;
        // A warning from the lazy recalculation must not be masked by a
        // clean result from the getter itself.
        let recalc = Status::from(self.update_dirty_values()?);
        let res = self.model.get_derivatives(derivatives)?;
        recalc.max(res.into()).ok()
    }

    fn get_event_indicators(&mut self, indicators: &mut [f64]) -> Result<Res, ModelError> {
        self.require_interface("get_event_indicators", InterfaceType::ModelExchange)?;
        self.require_state(
            "get_event_indicators",
            &[
                ModelState::InitializationMode,
                ModelState::EventMode,
                ModelState::ContinuousTimeMode,
                ModelState::Terminated,
            ],
        )?;
        self.expect_len("get_event_indicators", indicators.len(), M::N_EVENT_INDICATORS)?;
        let recalc = Status::from(self.update_dirty_values()?);
        let res = self.model.get_event_indicators(&self.context, indicators)?;
        recalc.max(res.into()).ok()
    }

    fn get_nominals_of_continuous_states(
        &mut self,
        nominals: &mut [f64],
    ) -> Result<Res, ModelError> {
        self.require_interface(
            "get_nominals_of_continuous_states",
            InterfaceType::ModelExchange,
        )?;
        self.require_state(
            "get_nominals_of_continuous_states",
            &[
                ModelState::InitializationMode,
                ModelState::EventMode,
                ModelState::ContinuousTimeMode,
                ModelState::Terminated,
            ],
        )?;
        self.expect_len(
            "get_nominals_of_continuous_states",
            nominals.len(),
            M::N_STATES,
        )?;
        self.model.get_nominals_of_continuous_states(nominals);
        Ok(Res::OK)
    }

    fn get_number_of_continuous_states(&self) -> usize {
        M::N_STATES
    }

    fn get_number_of_event_indicators(&self) -> usize {
        M::N_EVENT_INDICATORS
    }
}
