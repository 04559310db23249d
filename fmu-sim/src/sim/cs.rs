//! Co-Simulation driver: advances the instance through regular output points
//! and runs the event iterations when the instance is configured to hand
//! events back to the driver.

use fmu::{CoSimulation as _, CoSimulationOptions, Common as _, Model, ModelInstance};

use super::{io::Recording, params::SimParams};
use crate::Error;

/// Run one event iteration in Event Mode. Returns `true` when the model
/// requested termination.
fn event_iteration<M: Model>(inst: &mut ModelInstance<M>) -> Result<bool, Error> {
    loop {
        let flags = inst.update_discrete_states()?;
        if flags.terminate_simulation {
            return Ok(true);
        }
        if !flags.discrete_states_need_update {
            return Ok(false);
        }
    }
}

pub fn co_simulate<M: Model>(params: &SimParams) -> Result<Recording, Error> {
    let mut inst = ModelInstance::<M>::new_co_simulation(
        "instance",
        M::INSTANTIATION_TOKEN,
        false,
        CoSimulationOptions {
            event_mode_used: params.event_mode_used,
            early_return_allowed: params.early_return_allowed,
            intermediate_update: None,
        },
    )?;

    inst.enter_initialization_mode(None, params.start_time, Some(params.stop_time))?;
    inst.exit_initialization_mode()?;

    let mut recording = Recording::new::<M>();
    let mut terminated = false;

    if params.event_mode_used {
        terminated = event_iteration(&mut inst)?;
        if !terminated {
            inst.enter_step_mode()?;
        }
    }

    recording.sample(&mut inst)?;

    let mut communication_point = params.start_time;
    let mut n_output_points = 0u64;
    // Tolerance for deciding that an output point has been passed.
    let tiny = params.output_interval * 1e-9;

    while !terminated && communication_point < params.stop_time - tiny {
        // Next regular output point strictly past the current time.
        while params.start_time + (n_output_points + 1) as f64 * params.output_interval
            <= communication_point + tiny
        {
            n_output_points += 1;
        }
        let next = (params.start_time + (n_output_points + 1) as f64 * params.output_interval)
            .min(params.stop_time);

        let result = inst.do_step(communication_point, next - communication_point, true)?;

        let halted_early = result.early_return
            || result.terminate_simulation
            || (result.event_encountered && params.event_mode_used);
        communication_point = if halted_early {
            result.last_successful_time
        } else {
            next
        };

        if result.terminate_simulation {
            terminated = true;
        } else if result.event_encountered && params.event_mode_used {
            inst.enter_event_mode()?;
            terminated = event_iteration(&mut inst)?;
            if !terminated {
                inst.enter_step_mode()?;
            }
        }

        recording.sample(&mut inst)?;
    }

    inst.terminate()?;
    Ok(recording)
}
