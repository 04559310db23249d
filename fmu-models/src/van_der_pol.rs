//! The Van der Pol oscillator, a stiff-ish nonlinear system with two
//! continuous states and no events.

use fmu::{EventFlags, Model, ModelError, Res};

#[derive(Debug, Clone)]
pub struct VanDerPol {
    pub x0: f64,
    pub x1: f64,
    /// Damping parameter.
    pub mu: f64,
}

impl Default for VanDerPol {
    fn default() -> Self {
        Self {
            x0: 2.0,
            x1: 0.0,
            mu: 1.0,
        }
    }
}

impl Model for VanDerPol {
    const NAME: &'static str = "VanDerPol";
    const INSTANTIATION_TOKEN: &'static str = "{51e01ab4-6bc4-4c2a-86c5-27b3a2ebe56c}";
    const N_STATES: usize = 2;
    const N_EVENT_INDICATORS: usize = 0;
    const FIXED_SOLVER_STEP: f64 = 1e-2;
    const DEFAULT_STOP_TIME: f64 = 20.0;
    type LoggingCategory = fmu::DefaultLoggingCategory;

    fn set_start_values(&mut self, _event_flags: &mut EventFlags) {
        *self = Self::default();
    }

    fn get_continuous_states(&self, x: &mut [f64]) {
        x[0] = self.x0;
        x[1] = self.x1;
    }

    fn set_continuous_states(&mut self, x: &[f64]) {
        self.x0 = x[0];
        self.x1 = x[1];
    }

    fn get_derivatives(&self, dx: &mut [f64]) -> Result<Res, ModelError> {
        dx[0] = self.x1;
        dx[1] = self.mu * ((1.0 - self.x0 * self.x0) * self.x1) - self.x0;
        Ok(Res::OK)
    }

    fn output_names() -> &'static [&'static str] {
        &["x0", "x1"]
    }

    fn get_outputs(&self, values: &mut [f64]) {
        values[0] = self.x0;
        values[1] = self.x1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivatives_at_the_start_point() {
        let model = VanDerPol::default();
        let mut dx = [0.0; 2];
        model.get_derivatives(&mut dx).unwrap();
        assert_eq!(dx[0], 0.0);
        assert_eq!(dx[1], -2.0);
    }
}
