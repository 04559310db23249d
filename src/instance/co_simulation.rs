//! The Co-Simulation engine: an internal fixed-step forward Euler loop with
//! event detection, driven through communication points.

use crate::{
    events,
    status::{ModelError, Res},
    traits::{CoSimulation, Model, ModelLoggingCategory},
    InterfaceType,
};

use super::{ModelInstance, ModelState};

/// Tolerance for comparing communication points, absolute and relative.
const COMMUNICATION_POINT_EPSILON: f64 = 1e-5;

fn is_close(a: f64, b: f64) -> bool {
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= COMMUNICATION_POINT_EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Outcome of a successful [`CoSimulation::do_step`].
///
/// `last_successful_time` is where the instance actually stopped: the
/// communication point in the regular case, or earlier when an event was
/// encountered with the importer handling events, when the intermediate
/// update callback requested an early return, or when the model asked to
/// terminate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DoStepResult {
    /// An event is waiting for the importer, which must now run an event
    /// iteration via `enter_event_mode` / `update_discrete_states` /
    /// `enter_step_mode`. Only set on instances created with
    /// `event_mode_used`; otherwise events are handled internally and never
    /// surface here.
    pub event_encountered: bool,
    /// The model requested to stop the simulation. Not an error; the
    /// importer should call `terminate`.
    pub terminate_simulation: bool,
    /// The step returned before reaching the communication point.
    pub early_return: bool,
    /// Simulation time the instance stopped at.
    pub last_successful_time: f64,
}

impl<M: Model> CoSimulation for ModelInstance<M> {
    fn enter_step_mode(&mut self) -> Result<Res, ModelError> {
        self.require_interface("enter_step_mode", InterfaceType::CoSimulation)?;
        self.require_state(
            "enter_step_mode",
            &[ModelState::InitializationMode, ModelState::EventMode],
        )?;
        self.state = ModelState::StepMode;
        Ok(Res::OK)
    }

    fn do_step(
        &mut self,
        current_communication_point: f64,
        communication_step_size: f64,
        _no_set_state_prior: bool,
    ) -> Result<DoStepResult, ModelError> {
        self.require_interface("do_step", InterfaceType::CoSimulation)?;
        self.require_state("do_step", &[ModelState::StepMode])?;

        if !is_close(current_communication_point, self.next_communication_point) {
            self.context.log(
                ModelError::Error,
                M::LoggingCategory::error_category(),
                format_args!(
                    "do_step: current communication point {current_communication_point} differs from the expected {}",
                    self.next_communication_point
                ),
            );
            return Err(ModelError::Error);
        }

        if communication_step_size <= 0.0 {
            self.context.log(
                ModelError::Error,
                M::LoggingCategory::error_category(),
                format_args!(
                    "do_step: communication step size must be positive, got {communication_step_size}"
                ),
            );
            return Err(ModelError::Error);
        }

        let target = current_communication_point + communication_step_size;

        if let Some(stop_time) = self.context.stop_time() {
            if target > stop_time && !is_close(target, stop_time) {
                self.context.log(
                    ModelError::Error,
                    M::LoggingCategory::error_category(),
                    format_args!(
                        "do_step: communication point {target} is past the stop time {stop_time}"
                    ),
                );
                return Err(ModelError::Error);
            }
        }

        let h = M::FIXED_SOLVER_STEP;
        let mut result = DoStepResult {
            last_successful_time: self.context.time(),
            ..Default::default()
        };

        // Event detected at the end of a micro-step but not yet handled.
        // With `event_mode_used` the handling is deferred: to the importer
        // when the loop stops at the event or the communication point,
        // otherwise to the top of the next loop iteration.
        let mut event_pending = false;
        let reached;

        loop {
            let time = self.context.time();
            let next_solver_time = self.start_time + (self.n_steps + 1) as f64 * h;

            // Communication point reached. The bound is widened by a
            // round-off guard so an exact hit never runs a spurious step and
            // a target an ulp short of the solver grid never stalls.
            let guard = ((1.0 + time.abs()) * f64::EPSILON).max(h * 1e-9);
            if next_solver_time > target + guard {
                reached = true;
                break;
            }

            if event_pending {
                // The importer cannot take the early return, so the pending
                // event is handled here before advancing past it.
                self.event_update()?;
                self.prime_event_indicators()?;
                event_pending = false;
            }

            // One forward Euler micro-step.
            if M::N_STATES > 0 {
                self.model.get_continuous_states(&mut self.x);
                self.model.get_derivatives(&mut self.dx)?;
                for (x, dx) in self.x.iter_mut().zip(self.dx.iter()) {
                    *x += h * dx;
                }
                self.model.set_continuous_states(&self.x);
                self.is_dirty_values = true;
            }

            // Time is derived from the step count, not accumulated.
            self.n_steps += 1;
            let time = self.start_time + self.n_steps as f64 * h;
            self.context.set_time(time);

            let state_event = if M::N_EVENT_INDICATORS > 0 {
                self.model.get_event_indicators(&self.context, &mut self.z)?;
                let fired = events::state_event(&self.prez, &self.z);
                std::mem::swap(&mut self.prez, &mut self.z);
                fired
            } else {
                false
            };

            let time_event = events::time_event(self.event_flags.next_event_time, time, h);

            let event = state_event || time_event;
            if event {
                self.context.log(
                    Res::OK,
                    M::LoggingCategory::trace_category(),
                    format_args!(
                        "do_step: event at t = {time} (state_event = {state_event}, time_event = {time_event})"
                    ),
                );

                if self.event_mode_used {
                    event_pending = true;
                } else {
                    self.event_update()?;
                    self.prime_event_indicators()?;
                }

                if self.early_return_allowed {
                    reached = false;
                    break;
                }
            }

            if self.event_flags.terminate_simulation {
                reached = false;
                break;
            }

            if self.call_intermediate_update(event, true).is_some() {
                result.event_encountered = event_pending;
                result.last_successful_time = time;
                result.early_return = true;
                self.next_communication_point = time;
                return Ok(result);
            }
        }

        result.event_encountered = event_pending;
        result.terminate_simulation = self.event_flags.terminate_simulation;
        result.early_return = self.early_return_allowed && !reached;
        result.last_successful_time = self.context.time();
        self.next_communication_point = if reached { target } else { self.context.time() };
        Ok(result)
    }
}
