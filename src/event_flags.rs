//! Event information produced by a model's event update.

/// Flags set by [`crate::Model::event_update`] and returned from
/// `update_discrete_states` during event iteration.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct EventFlags {
    /// The importer must stay in Event Mode for another event iteration,
    /// starting a new super-dense time instant.
    pub discrete_states_need_update: bool,
    /// The model requests to stop the simulation. This is a cooperative
    /// shutdown request the orchestrator must honor, not an error.
    pub terminate_simulation: bool,
    /// At least one nominal value of the continuous states has changed and
    /// can be inquired with `get_nominals_of_continuous_states`.
    pub nominals_of_continuous_states_changed: bool,
    /// At least one continuous state was re-initialized by the event; the
    /// orchestrator must re-fetch the state vector.
    pub values_of_continuous_states_changed: bool,
    /// Absolute time of the next scheduled time event, if one is armed.
    /// Consumed by the time-event check and cleared after firing.
    pub next_event_time: Option<f64>,
}

impl EventFlags {
    /// Reset all flags to their default state. Called at the start of every
    /// event update so the model only reports what changed in this event.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
