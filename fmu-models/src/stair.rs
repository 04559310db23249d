//! A purely discrete model: a counter incremented by a time event at every
//! whole second, requesting termination when it reaches its limit.

use fmu::{EventFlags, Model, ModelContext, ModelError, Res};

const COUNTER_LIMIT: i32 = 10;

#[derive(Debug, Clone)]
pub struct Stair {
    pub counter: i32,
    /// Absolute time of the next counter increment.
    next_tick: f64,
}

impl Default for Stair {
    fn default() -> Self {
        Self {
            counter: 1,
            next_tick: 1.0,
        }
    }
}

impl Model for Stair {
    const NAME: &'static str = "Stair";
    const INSTANTIATION_TOKEN: &'static str = "{c9d2b1f3-6a0e-48b5-9f3e-0d4a9b6f5a11}";
    const N_STATES: usize = 0;
    const N_EVENT_INDICATORS: usize = 0;
    const FIXED_SOLVER_STEP: f64 = 0.2;
    const DEFAULT_STOP_TIME: f64 = 10.0;
    type LoggingCategory = fmu::DefaultLoggingCategory;

    fn set_start_values(&mut self, event_flags: &mut EventFlags) {
        *self = Self::default();
        event_flags.next_event_time = Some(self.next_tick);
    }

    fn event_update(
        &mut self,
        context: &ModelContext<Self>,
        event_flags: &mut EventFlags,
    ) -> Result<Res, ModelError> {
        // An event iteration may also run before the first tick is due, e.g.
        // right after initialization; only count when the tick was reached.
        if self.next_tick <= context.time() + 1e-9 {
            self.counter += 1;
            self.next_tick += 1.0;

            context.log(
                Res::OK,
                fmu::DefaultLoggingCategory::Events,
                format_args!("counter = {} at t = {}", self.counter, context.time()),
            );
        }

        if self.counter >= COUNTER_LIMIT {
            event_flags.terminate_simulation = true;
        } else {
            event_flags.next_event_time = Some(self.next_tick);
        }
        Ok(Res::OK)
    }

    fn output_names() -> &'static [&'static str] {
        &["counter"]
    }

    fn get_outputs(&self, values: &mut [f64]) {
        values[0] = f64::from(self.counter);
    }
}
