//! The Scheduled Execution surface: the orchestrator activates clocked model
//! partitions at their tick times.

use crate::{
    status::{ModelError, Res},
    traits::{Model, ScheduledExecution},
    InterfaceType, ValueReference,
};

use super::{ModelInstance, ModelState};

impl<M: Model> ScheduledExecution for ModelInstance<M> {
    fn activate_model_partition(
        &mut self,
        clock: ValueReference,
        activation_time: f64,
    ) -> Result<Res, ModelError> {
        self.require_interface("activate_model_partition", InterfaceType::ScheduledExecution)?;
        self.require_state("activate_model_partition", &[ModelState::ClockActivationMode])?;
        // Partitions may be activated out of order by a preemptive scheduler;
        // the activation time is the clock tick, not a global clock.
        self.context.set_time(activation_time);
        let res = self
            .model
            .activate_model_partition(&self.context, clock, activation_time)?;
        self.is_dirty_values = true;
        Ok(res)
    }
}
