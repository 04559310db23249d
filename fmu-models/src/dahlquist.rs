//! The Dahlquist test equation, `der(x) = -k * x`. One continuous state, no
//! events; the smallest useful model for exercising the solver.

use fmu::{EventFlags, Model, ModelError, Res};

#[derive(Debug, Clone)]
pub struct Dahlquist {
    pub x: f64,
    /// Decay rate.
    pub k: f64,
}

impl Default for Dahlquist {
    fn default() -> Self {
        Self { x: 1.0, k: 1.0 }
    }
}

impl Model for Dahlquist {
    const NAME: &'static str = "Dahlquist";
    const INSTANTIATION_TOKEN: &'static str = "{221063f8-8a35-4d35-b9a6-4e22b6d0e163}";
    const N_STATES: usize = 1;
    const N_EVENT_INDICATORS: usize = 0;
    const FIXED_SOLVER_STEP: f64 = 0.1;
    const DEFAULT_STOP_TIME: f64 = 10.0;
    type LoggingCategory = fmu::DefaultLoggingCategory;

    fn set_start_values(&mut self, _event_flags: &mut EventFlags) {
        *self = Self::default();
    }

    fn get_continuous_states(&self, x: &mut [f64]) {
        x[0] = self.x;
    }

    fn set_continuous_states(&mut self, x: &[f64]) {
        self.x = x[0];
    }

    fn get_derivatives(&self, dx: &mut [f64]) -> Result<Res, ModelError> {
        dx[0] = -self.k * self.x;
        Ok(Res::OK)
    }

    fn output_names() -> &'static [&'static str] {
        &["x"]
    }

    fn get_outputs(&self, values: &mut [f64]) {
        values[0] = self.x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_is_proportional_decay() {
        let model = Dahlquist { x: 2.0, k: 3.0 };
        let mut dx = [0.0];
        model.get_derivatives(&mut dx).unwrap();
        assert_eq!(dx[0], -6.0);
    }
}
