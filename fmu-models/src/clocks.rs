//! Clocked model partitions for Scheduled Execution. Three input clocks drive
//! three partitions; the partitions share a total tick counter that is
//! protected by the scheduler's preemption lock, since a preemptive scheduler
//! may interrupt one partition with another.

use fmu::{EventFlags, Model, ModelContext, ModelError, Res, ValueReference};

/// 1 s periodic clock.
pub const IN_CLOCK_1: ValueReference = 1001;
/// 2 s periodic clock.
pub const IN_CLOCK_2: ValueReference = 1002;
/// Aperiodic clock, ticked by the environment.
pub const IN_CLOCK_3: ValueReference = 1003;

#[derive(Debug, Clone, Default)]
pub struct Clocks {
    /// Ticks seen by each partition, indexed by clock.
    pub in_clock_ticks: [u64; 3],
    /// Ticks across all partitions. Shared between partitions, so updated
    /// only inside the preemption lock.
    pub total_ticks: u64,
}

impl Model for Clocks {
    const NAME: &'static str = "Clocks";
    const INSTANTIATION_TOKEN: &'static str = "{bf22b5b1-4c7a-4a3f-9de4-55cf4765f62e}";
    const N_STATES: usize = 0;
    const N_EVENT_INDICATORS: usize = 0;
    const FIXED_SOLVER_STEP: f64 = 1.0;
    const DEFAULT_STOP_TIME: f64 = 10.0;
    type LoggingCategory = fmu::DefaultLoggingCategory;

    fn set_start_values(&mut self, _event_flags: &mut EventFlags) {
        *self = Self::default();
    }

    fn activate_model_partition(
        &mut self,
        context: &ModelContext<Self>,
        clock: ValueReference,
        activation_time: f64,
    ) -> Result<Res, ModelError> {
        let partition = match clock {
            IN_CLOCK_1 => 0,
            IN_CLOCK_2 => 1,
            IN_CLOCK_3 => 2,
            _ => {
                context.log(
                    ModelError::Error,
                    fmu::DefaultLoggingCategory::StatusError,
                    format_args!("unknown clock {clock}"),
                );
                return Err(ModelError::Error);
            }
        };

        self.in_clock_ticks[partition] += 1;

        context.lock_preemption();
        self.total_ticks += 1;
        context.unlock_preemption();

        context.log(
            Res::OK,
            fmu::DefaultLoggingCategory::Events,
            format_args!("clock {clock} ticked at t = {activation_time}"),
        );
        Ok(Res::OK)
    }

    fn output_names() -> &'static [&'static str] {
        &["ticks1", "ticks2", "ticks3", "total_ticks"]
    }

    fn get_outputs(&self, values: &mut [f64]) {
        values[0] = self.in_clock_ticks[0] as f64;
        values[1] = self.in_clock_ticks[1] as f64;
        values[2] = self.in_clock_ticks[2] as f64;
        values[3] = self.total_ticks as f64;
    }
}
