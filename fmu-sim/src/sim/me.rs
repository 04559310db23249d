//! Model Exchange driver: owns a fixed-step Euler solver and hands detected
//! events back to the instance for the event iteration.

use fmu::{
    events,
    solver::{Euler, Solver},
    Common as _, Model, ModelExchange as _, ModelInstance,
};

use super::{io::Recording, params::SimParams};
use crate::Error;

struct EventIteration {
    terminate: bool,
    next_event_time: Option<f64>,
}

fn event_iteration<M: Model>(inst: &mut ModelInstance<M>) -> Result<EventIteration, Error> {
    loop {
        let flags = inst.update_discrete_states()?;
        if flags.terminate_simulation {
            return Ok(EventIteration {
                terminate: true,
                next_event_time: flags.next_event_time,
            });
        }
        if !flags.discrete_states_need_update {
            return Ok(EventIteration {
                terminate: false,
                next_event_time: flags.next_event_time,
            });
        }
    }
}

pub fn model_exchange<M: Model>(params: &SimParams) -> Result<Recording, Error> {
    let mut inst =
        ModelInstance::<M>::new_model_exchange("instance", M::INSTANTIATION_TOKEN, false)?;

    inst.enter_initialization_mode(None, params.start_time, Some(params.stop_time))?;
    inst.exit_initialization_mode()?;

    let mut recording = Recording::new::<M>();

    // Initial event iteration, still in Event Mode.
    let iteration = event_iteration(&mut inst)?;
    let mut next_event_time = iteration.next_event_time;
    if iteration.terminate {
        recording.sample(&mut inst)?;
        inst.terminate()?;
        return Ok(recording);
    }

    inst.enter_continuous_time_mode()?;

    let h = M::FIXED_SOLVER_STEP;
    let mut solver = <Euler as Solver<ModelInstance<M>>>::new(
        params.start_time,
        None,
        M::N_STATES,
        M::N_EVENT_INDICATORS,
    );
    solver.reset(&mut inst, params.start_time)?;

    recording.sample(&mut inst)?;

    let mut n_steps = 0u64;
    let mut next_output = params.start_time + params.output_interval;

    loop {
        let time = params.start_time + n_steps as f64 * h;
        if time >= params.stop_time - (1.0 + time.abs()) * f64::EPSILON {
            break;
        }

        n_steps += 1;
        let next_time = params.start_time + n_steps as f64 * h;
        let (reached, state_event) = solver.step(&mut inst, next_time)?;

        let time_event = events::time_event(next_event_time, reached, h);
        let (step_event, terminate) = inst.completed_integrator_step(true)?;

        if terminate {
            recording.sample(&mut inst)?;
            break;
        }

        if state_event || time_event || step_event {
            inst.enter_event_mode()?;
            let iteration = event_iteration(&mut inst)?;
            next_event_time = iteration.next_event_time;
            recording.sample(&mut inst)?;
            if iteration.terminate {
                inst.terminate()?;
                return Ok(recording);
            }
            inst.enter_continuous_time_mode()?;
            // Events may re-initialize states; restart from them.
            solver.reset(&mut inst, reached)?;
        }

        if reached + h * 1e-9 >= next_output {
            recording.sample(&mut inst)?;
            next_output += params.output_interval;
        }
    }

    recording.sample(&mut inst)?;
    inst.terminate()?;
    Ok(recording)
}
