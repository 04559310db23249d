//! Whole-simulation runs of the reference models through the Co-Simulation
//! interface.

use assert_approx_eq::assert_approx_eq;
use fmu::{
    CoSimulation as _, CoSimulationOptions, Common as _, Model, ModelInstance,
};
use fmu_models::{BouncingBall, Dahlquist, VanDerPol};
use rstest::rstest;

fn co_simulation<M: Model>(name: &str, stop_time: f64) -> ModelInstance<M> {
    let mut inst = ModelInstance::<M>::new_co_simulation(
        name,
        M::INSTANTIATION_TOKEN,
        false,
        CoSimulationOptions::default(),
    )
    .unwrap();
    inst.enter_initialization_mode(None, 0.0, Some(stop_time)).unwrap();
    inst.exit_initialization_mode().unwrap();
    inst
}

/// Explicit Euler on `der(x) = -x`, using the same operation order as the
/// engine so the comparison can be bitwise.
fn euler_reference(h: f64, n_steps: usize) -> f64 {
    let mut x = 1.0f64;
    for _ in 0..n_steps {
        x += h * -x;
    }
    x
}

#[test_log::test]
fn dahlquist_matches_the_explicit_euler_solution() {
    let mut inst = co_simulation::<Dahlquist>("dahlquist1", 10.0);
    let mut t = 0.0;
    while t < 10.0 {
        let result = inst.do_step(t, 1.0, true).unwrap();
        assert!(!result.event_encountered);
        t = result.last_successful_time;
    }
    assert_eq!(inst.model().x, euler_reference(0.1, 100));
}

#[rstest]
#[case(0.1)]
#[case(0.5)]
#[case(2.0)]
fn dahlquist_result_is_independent_of_the_communication_interval(#[case] interval: f64) {
    let mut inst = co_simulation::<Dahlquist>("dahlquist1", 10.0);
    let mut n = 0u32;
    loop {
        let t = f64::from(n) * interval;
        if t >= 10.0 {
            break;
        }
        let step = interval.min(10.0 - t);
        inst.do_step(t, step, true).unwrap();
        n += 1;
    }
    // The internal fixed step makes the trajectory exactly reproducible.
    assert_eq!(inst.model().x, euler_reference(0.1, 100));
}

#[test_log::test]
fn bouncing_ball_bounces_and_stays_in_the_physical_range() {
    let mut inst = co_simulation::<BouncingBall>("ball1", BouncingBall::DEFAULT_STOP_TIME);
    let mut t = 0.0;
    while t < BouncingBall::DEFAULT_STOP_TIME {
        let result = inst
            .do_step(t, BouncingBall::DEFAULT_STOP_TIME - t, true)
            .unwrap();
        // Contact events are handled internally, so nothing surfaces here.
        assert!(!result.event_encountered);
        t = result.last_successful_time;

        let ball = inst.model();
        // One solver step of penetration is possible before detection.
        assert!(ball.h > -0.05, "ball fell through the floor: h = {}", ball.h);
        assert!(ball.h <= 1.0 + 1e-9, "ball rose above its drop height");
        assert!(t > 0.0, "no progress");
    }
    // Past the accumulation point of the bounces the ball is at rest; the
    // zeroed gravity proves the contact events were processed.
    let ball = inst.model();
    assert_eq!(ball.g, 0.0);
    assert_approx_eq!(ball.v, 0.0);
}

#[test_log::test]
fn van_der_pol_stays_on_the_limit_cycle() {
    let mut inst = co_simulation::<VanDerPol>("vdp1", VanDerPol::DEFAULT_STOP_TIME);
    let mut t = 0.0;
    while t < VanDerPol::DEFAULT_STOP_TIME {
        let result = inst.do_step(t, 1.0, true).unwrap();
        t = result.last_successful_time;
        let model = inst.model();
        assert!(model.x0.is_finite() && model.x1.is_finite());
        assert!(model.x0.abs() < 5.0 && model.x1.abs() < 5.0);
    }
    // The limit cycle of mu = 1 has amplitude close to 2.
    assert!(inst.model().x0.abs() <= 2.1);
}
