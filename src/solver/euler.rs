//! Fixed-step forward Euler.

use crate::{events, ModelExchange};

use super::{Solver, SolverError};

pub struct Euler {
    time: f64,
    x: Vec<f64>,
    dx: Vec<f64>,
    z: Vec<f64>,
    prez: Vec<f64>,
}

impl<Inst: ModelExchange> Solver<Inst> for Euler {
    fn new(start_time: f64, _tolerance: Option<f64>, nx: usize, nz: usize) -> Self {
        Self {
            time: start_time,
            x: vec![0.0; nx],
            dx: vec![0.0; nx],
            z: vec![0.0; nz],
            prez: vec![0.0; nz],
        }
    }

    fn step(&mut self, inst: &mut Inst, next_time: f64) -> Result<(f64, bool), SolverError> {
        let dt = next_time - self.time;

        if !self.x.is_empty() {
            // Derivatives are evaluated at the start of the step.
            inst.get_continuous_state_derivatives(&mut self.dx)?;
            for (x, dx) in self.x.iter_mut().zip(self.dx.iter()) {
                *x += dt * dx;
            }
        }

        inst.set_time(next_time)?;
        if !self.x.is_empty() {
            inst.set_continuous_states(&self.x)?;
        }

        let state_event = if self.z.is_empty() {
            false
        } else {
            inst.get_event_indicators(&mut self.z)?;
            let fired = events::state_event(&self.prez, &self.z);
            std::mem::swap(&mut self.prez, &mut self.z);
            fired
        };

        self.time = next_time;
        Ok((self.time, state_event))
    }

    fn reset(&mut self, inst: &mut Inst, time: f64) -> Result<(), SolverError> {
        if !self.x.is_empty() {
            inst.get_continuous_states(&mut self.x)?;
        }
        if !self.z.is_empty() {
            inst.get_event_indicators(&mut self.prez)?;
        }
        self.time = time;
        Ok(())
    }
}
