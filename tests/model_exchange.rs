//! Model Exchange behavior: state access gating and an externally driven
//! integration loop.

use fmu::{
    events,
    solver::{Euler, Solver},
    Common as _, Model, ModelContext, ModelError, ModelExchange as _, ModelInstance, ModelState,
    Res,
};
use fmu_models::BouncingBall;

/// One decaying state whose dependent-value recalculation reports a warning.
#[derive(Default)]
struct Flaky {
    x: f64,
}

impl Model for Flaky {
    const NAME: &'static str = "Flaky";
    const INSTANTIATION_TOKEN: &'static str = "{flaky}";
    const N_STATES: usize = 1;
    const N_EVENT_INDICATORS: usize = 0;
    const FIXED_SOLVER_STEP: f64 = 0.1;
    const DEFAULT_STOP_TIME: f64 = 1.0;
    type LoggingCategory = fmu::DefaultLoggingCategory;

    fn set_start_values(&mut self, _event_flags: &mut fmu::EventFlags) {
        self.x = 1.0;
    }

    fn calculate_values(&mut self, _context: &ModelContext<Self>) -> Result<Res, ModelError> {
        Ok(Res::Warning)
    }

    fn get_continuous_states(&self, x: &mut [f64]) {
        x[0] = self.x;
    }

    fn set_continuous_states(&mut self, x: &[f64]) {
        self.x = x[0];
    }

    fn get_derivatives(&self, dx: &mut [f64]) -> Result<Res, ModelError> {
        dx[0] = -self.x;
        Ok(Res::OK)
    }
}

#[test_log::test]
fn state_access_is_rejected_before_initialization() {
    let mut inst = ModelInstance::<BouncingBall>::new_model_exchange(
        "ball",
        BouncingBall::INSTANTIATION_TOKEN,
        false,
    )
    .unwrap();

    let mut states = [7.0, 7.0];
    assert!(inst.get_continuous_states(&mut states).is_err());
    // The output buffer is untouched on failure.
    assert_eq!(states, [7.0, 7.0]);
}

#[test_log::test]
fn interface_mismatch_is_rejected() {
    let mut inst = ModelInstance::<BouncingBall>::new_co_simulation(
        "ball",
        BouncingBall::INSTANTIATION_TOKEN,
        false,
        fmu::CoSimulationOptions::default(),
    )
    .unwrap();
    inst.enter_initialization_mode(None, 0.0, None).unwrap();
    assert!(inst.set_time(1.0).is_err());
    assert_eq!(inst.state(), ModelState::Error);
}

#[test_log::test]
fn continuous_time_mode_requires_event_mode() {
    let mut inst = ModelInstance::<BouncingBall>::new_model_exchange(
        "ball",
        BouncingBall::INSTANTIATION_TOKEN,
        false,
    )
    .unwrap();
    assert!(inst.enter_continuous_time_mode().is_err());
}

#[test_log::test]
fn wrong_buffer_length_is_rejected() {
    let mut inst = ModelInstance::<BouncingBall>::new_model_exchange(
        "ball",
        BouncingBall::INSTANTIATION_TOKEN,
        false,
    )
    .unwrap();
    inst.enter_initialization_mode(None, 0.0, None).unwrap();
    assert_eq!(inst.get_number_of_continuous_states(), 2);
    let mut too_short = [0.0];
    assert!(inst.get_continuous_states(&mut too_short).is_err());
}

#[test_log::test]
fn recalculation_warning_is_not_masked_by_a_clean_getter() {
    let mut inst =
        ModelInstance::<Flaky>::new_model_exchange("flaky", Flaky::INSTANTIATION_TOKEN, false)
            .unwrap();
    inst.enter_initialization_mode(None, 0.0, None).unwrap();
    inst.exit_initialization_mode().unwrap();

    // Touching the model marks the derived values dirty again.
    inst.model_mut();
    let mut dx = [0.0];
    assert_eq!(inst.get_continuous_state_derivatives(&mut dx), Ok(Res::Warning));

    // With the values clean, the getter's own status comes through.
    assert_eq!(inst.get_continuous_state_derivatives(&mut dx), Ok(Res::OK));
    assert_eq!(dx[0], -1.0);
}

#[test_log::test]
fn external_euler_loop_reproduces_the_first_bounce() {
    let mut inst = ModelInstance::<BouncingBall>::new_model_exchange(
        "ball",
        BouncingBall::INSTANTIATION_TOKEN,
        false,
    )
    .unwrap();
    inst.enter_initialization_mode(None, 0.0, Some(3.0)).unwrap();
    inst.exit_initialization_mode().unwrap();

    // Initial event iteration.
    let mut next_event_time = None;
    loop {
        let flags = inst.update_discrete_states().unwrap();
        assert!(!flags.terminate_simulation);
        next_event_time = flags.next_event_time;
        if !flags.discrete_states_need_update {
            break;
        }
    }
    inst.enter_continuous_time_mode().unwrap();

    let h = BouncingBall::FIXED_SOLVER_STEP;
    let mut solver = <Euler as Solver<ModelInstance<BouncingBall>>>::new(0.0, None, 2, 1);
    solver.reset(&mut inst, 0.0).unwrap();

    let mut bounce_time = None;
    for n in 1..=3000u32 {
        let next_time = f64::from(n) * h;
        let (reached, state_event) = solver.step(&mut inst, next_time).unwrap();
        let time_event = events::time_event(next_event_time, reached, h);
        let (step_event, terminate) = inst.completed_integrator_step(true).unwrap();
        assert!(!terminate);

        if state_event || time_event || step_event {
            bounce_time = Some(reached);
            break;
        }
    }

    let bounce_time = bounce_time.expect("the ball never hit the ground");
    // Free fall from h = 1: impact at sqrt(2 / 9.81) = 0.4515...
    assert!(
        (0.43..0.47).contains(&bounce_time),
        "bounce at {bounce_time}"
    );

    let v_before = inst.model().v;
    inst.enter_event_mode().unwrap();
    let flags = inst.update_discrete_states().unwrap();
    assert!(flags.values_of_continuous_states_changed);
    inst.enter_continuous_time_mode().unwrap();
    solver.reset(&mut inst, bounce_time).unwrap();

    // The bounce reversed and damped the velocity.
    assert!(v_before < 0.0);
    assert!(inst.model().v > 0.0);
    assert_eq!(inst.model().v, -inst.model().e * v_before);

    inst.terminate().unwrap();
    assert_eq!(inst.state(), ModelState::Terminated);
}
