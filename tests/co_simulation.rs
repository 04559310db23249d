//! Co-Simulation behavior of the engine, driven through the reference models.

use fmu::{
    CoSimulation as _, CoSimulationOptions, Common as _, Model, ModelInstance, ModelState,
};
use fmu_models::{BouncingBall, Dahlquist, Stair};

fn co_simulation<M: Model>(options: CoSimulationOptions, stop_time: Option<f64>) -> ModelInstance<M> {
    let mut inst =
        ModelInstance::<M>::new_co_simulation("instance", M::INSTANTIATION_TOKEN, false, options)
            .unwrap();
    inst.enter_initialization_mode(None, 0.0, stop_time).unwrap();
    inst.exit_initialization_mode().unwrap();
    if inst.state() == ModelState::EventMode {
        inst.enter_step_mode().unwrap();
    }
    inst
}

/// Stateless model with an exactly representable solver step, so the time
/// bookkeeping can be checked without rounding slack.
#[derive(Default)]
struct Idle;

impl Model for Idle {
    const NAME: &'static str = "Idle";
    const INSTANTIATION_TOKEN: &'static str = "{idle}";
    const N_STATES: usize = 0;
    const N_EVENT_INDICATORS: usize = 0;
    const FIXED_SOLVER_STEP: f64 = 0.125;
    const DEFAULT_STOP_TIME: f64 = 1.0;
    type LoggingCategory = fmu::DefaultLoggingCategory;

    fn set_start_values(&mut self, _event_flags: &mut fmu::EventFlags) {}
}

#[test_log::test]
fn simulation_time_does_not_drift() {
    let mut inst = co_simulation::<Idle>(CoSimulationOptions::default(), None);
    let mut t = 0.0;
    for _ in 0..10_000 {
        t = inst
            .do_step(t, Idle::FIXED_SOLVER_STEP, true)
            .unwrap()
            .last_successful_time;
    }
    assert_eq!(inst.n_steps(), 10_000);
    assert_eq!(inst.time(), 1250.0);
}

#[test_log::test]
fn trajectory_is_independent_of_communication_step_partitioning() {
    let mut one_step = co_simulation::<Dahlquist>(CoSimulationOptions::default(), Some(10.0));
    one_step.do_step(0.0, 10.0, true).unwrap();

    let mut many_steps = co_simulation::<Dahlquist>(CoSimulationOptions::default(), Some(10.0));
    let mut t = 0.0;
    for _ in 0..100 {
        t = many_steps
            .do_step(t, 0.1, true)
            .unwrap()
            .last_successful_time;
    }

    // Bitwise equal: the internal micro-step sequence is identical.
    assert_eq!(one_step.model().x, many_steps.model().x);
    assert_eq!(one_step.time(), many_steps.time());
}

#[test_log::test]
fn model_requested_termination_is_not_an_error() {
    let mut inst = co_simulation::<Stair>(CoSimulationOptions::default(), Some(10.0));
    let result = inst.do_step(0.0, 10.0, true).unwrap();
    assert!(result.terminate_simulation);
    assert_eq!(result.last_successful_time, 9.0);
    assert_eq!(inst.model().counter, 10);

    inst.terminate().unwrap();
    assert_eq!(inst.state(), ModelState::Terminated);
}

#[test_log::test]
fn early_return_halts_at_the_first_bounce() {
    let mut inst = co_simulation::<BouncingBall>(
        CoSimulationOptions {
            event_mode_used: true,
            early_return_allowed: true,
            intermediate_update: None,
        },
        Some(3.0),
    );
    let result = inst.do_step(0.0, 3.0, true).unwrap();
    assert!(result.event_encountered);
    assert!(result.early_return);
    // Free fall from h = 1: impact at sqrt(2 / 9.81) = 0.4515..., located on
    // the millisecond solver grid.
    assert!(
        (0.43..0.47).contains(&result.last_successful_time),
        "bounce at {}",
        result.last_successful_time
    );
    assert_eq!(inst.time(), result.last_successful_time);
}

#[test_log::test]
fn bounce_reverses_and_damps_the_velocity() {
    let mut inst = co_simulation::<BouncingBall>(
        CoSimulationOptions {
            event_mode_used: true,
            early_return_allowed: true,
            intermediate_update: None,
        },
        Some(3.0),
    );
    let result = inst.do_step(0.0, 3.0, true).unwrap();
    assert!(result.event_encountered);

    let v_before = inst.model().v;
    assert!(v_before < 0.0, "ball must be falling at the impact");

    inst.enter_event_mode().unwrap();
    let flags = inst.update_discrete_states().unwrap();
    assert!(flags.values_of_continuous_states_changed);
    inst.enter_step_mode().unwrap();

    let v_after = inst.model().v;
    assert_eq!(v_after, -inst.model().e * v_before);
    assert!(inst.model().h > 0.0);
}

#[test_log::test]
fn bounce_times_increase_and_obey_restitution() {
    let mut inst = co_simulation::<BouncingBall>(
        CoSimulationOptions {
            event_mode_used: true,
            early_return_allowed: true,
            intermediate_update: None,
        },
        Some(3.0),
    );

    let stop = 3.0;
    let mut t = 0.0;
    let mut bounce_times: Vec<f64> = Vec::new();
    let mut at_rest = false;

    while t < stop {
        let result = inst.do_step(t, stop - t, true).unwrap();
        t = result.last_successful_time;

        if result.event_encountered {
            assert!(!at_rest, "no events may fire once the ball is at rest");
            if let Some(&previous) = bounce_times.last() {
                assert!(t > previous, "bounce at {t} does not follow {previous}");
            }
            bounce_times.push(t);

            let v_before = inst.model().v;
            assert!(v_before < 0.0, "ball must be falling at the impact");

            inst.enter_event_mode().unwrap();
            let flags = inst.update_discrete_states().unwrap();
            assert!(!flags.discrete_states_need_update);
            inst.enter_step_mode().unwrap();

            let v_after = inst.model().v;
            if v_after == 0.0 {
                // Rebound fell below the rest threshold.
                assert_eq!(inst.model().g, 0.0);
                at_rest = true;
            } else {
                assert_eq!(v_after, -inst.model().e * v_before);
            }
        }
        if result.terminate_simulation {
            break;
        }
    }

    assert!(
        bounce_times.len() >= 5,
        "expected a bounce cascade, got {bounce_times:?}"
    );
    assert!(at_rest, "the ball never came to rest");
    assert_eq!(t, stop);
}

#[test_log::test]
fn intermediate_update_reports_every_solver_step() {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    let calls = Arc::new(AtomicUsize::new(0));
    let options = CoSimulationOptions {
        event_mode_used: false,
        early_return_allowed: false,
        intermediate_update: Some(Box::new({
            let calls = calls.clone();
            move |update| {
                assert!(update.intermediate_step_finished);
                assert!(!update.can_return_early);
                calls.fetch_add(1, Ordering::SeqCst);
                None
            }
        })),
    };
    let mut inst = co_simulation::<Dahlquist>(options, Some(10.0));
    inst.do_step(0.0, 1.0, true).unwrap();
    // h = 0.1, so one communication step of 1.0 is ten solver steps.
    assert_eq!(calls.load(Ordering::SeqCst), 10);
}
