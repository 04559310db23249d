//! A ball bouncing on the ground under gravity, with a partially inelastic
//! contact. The classic minimal hybrid model: two continuous states and one
//! event indicator.

use fmu::{EventFlags, Model, ModelContext, ModelError, Res};

/// Velocity magnitude below which the ball is considered at rest. Without
/// this threshold the event times form a geometric series and the simulation
/// never gets past the accumulation point.
const V_MIN: f64 = 0.1;

/// Hysteresis applied to the event indicator right after a bounce, so the
/// re-initialized state at `h` just above zero is not detected again.
const EVENT_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone)]
pub struct BouncingBall {
    /// Position of the ball above the ground.
    pub h: f64,
    /// Velocity, positive upwards.
    pub v: f64,
    /// Gravity. Zeroed once the ball comes to rest.
    pub g: f64,
    /// Coefficient of restitution.
    pub e: f64,
}

impl Default for BouncingBall {
    fn default() -> Self {
        Self {
            h: 1.0,
            v: 0.0,
            g: -9.81,
            e: 0.7,
        }
    }
}

impl Model for BouncingBall {
    const NAME: &'static str = "BouncingBall";
    const INSTANTIATION_TOKEN: &'static str = "{7d4337b6-e6c0-4b7a-9c7e-3f2a41c0f6d2}";
    const N_STATES: usize = 2;
    const N_EVENT_INDICATORS: usize = 1;
    const FIXED_SOLVER_STEP: f64 = 1e-3;
    const DEFAULT_STOP_TIME: f64 = 3.0;
    type LoggingCategory = fmu::DefaultLoggingCategory;

    fn set_start_values(&mut self, _event_flags: &mut EventFlags) {
        *self = Self::default();
    }

    fn get_continuous_states(&self, x: &mut [f64]) {
        x[0] = self.h;
        x[1] = self.v;
    }

    fn set_continuous_states(&mut self, x: &[f64]) {
        self.h = x[0];
        self.v = x[1];
    }

    fn get_derivatives(&self, dx: &mut [f64]) -> Result<Res, ModelError> {
        dx[0] = self.v;
        dx[1] = self.g;
        Ok(Res::OK)
    }

    fn get_event_indicators(
        &self,
        _context: &ModelContext<Self>,
        z: &mut [f64],
    ) -> Result<Res, ModelError> {
        z[0] = if self.h > -EVENT_EPSILON && self.h <= 0.0 && self.v > 0.0 {
            // Just bounced, still within the contact band.
            -EVENT_EPSILON
        } else {
            self.h
        };
        Ok(Res::OK)
    }

    fn event_update(
        &mut self,
        context: &ModelContext<Self>,
        event_flags: &mut EventFlags,
    ) -> Result<Res, ModelError> {
        if self.h <= 0.0 && self.v < 0.0 {
            self.h = f64::MIN_POSITIVE;
            self.v = -self.v * self.e;

            if self.v < V_MIN {
                // The ball has come to rest.
                self.v = 0.0;
                self.g = 0.0;
            }

            context.log(
                Res::OK,
                fmu::DefaultLoggingCategory::Events,
                format_args!("bounce at t = {}, rebound velocity {}", context.time(), self.v),
            );
            event_flags.values_of_continuous_states_changed = true;
        }
        Ok(Res::OK)
    }

    fn output_names() -> &'static [&'static str] {
        &["h", "v"]
    }

    fn get_outputs(&self, values: &mut [f64]) {
        values[0] = self.h;
        values[1] = self.v;
    }
}
