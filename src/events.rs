//! Event detection: zero-crossings of event indicators and scheduled time
//! events. Pure functions of their inputs, shared by the Co-Simulation engine
//! and the external Model Exchange solver.

/// Fraction of the solver step used as tolerance for the time-event check.
///
/// Must not be zero (floating round-off would skip exact-hit events) and must
/// stay well below one (an event would fire a full step early). Tuned
/// empirically for the reference models; re-tune when changing step sizes.
pub const TIME_EVENT_TOLERANCE: f64 = 1e-2;

/// Returns `true` if any indicator crossed zero between the previous and the
/// current micro-step.
///
/// A crossing is `prez[i] <= 0 && z[i] > 0` or `prez[i] > 0 && z[i] <= 0`.
/// Two consecutive zeros signal nothing: there is no previous sign to compare
/// against, and indicator functions are expected to apply their own
/// hysteresis around zero.
pub fn state_event(prez: &[f64], z: &[f64]) -> bool {
    prez.iter()
        .zip(z.iter())
        .any(|(&pre, &cur)| (pre <= 0.0 && cur > 0.0) || (pre > 0.0 && cur <= 0.0))
}

/// Returns `true` if a scheduled time event is due within the upcoming step.
pub fn time_event(next_event_time: Option<f64>, time: f64, step: f64) -> bool {
    match next_event_time {
        Some(t_next) => time + step * TIME_EVENT_TOLERANCE >= t_next,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_crossing_sign_rule() {
        // Synthetic indicator sequence: only the positive -> non-positive
        // transition at the third sample is an event.
        let prez = [2.0, 1.0, 0.5, -0.1];
        let z = [1.0, 0.5, -0.1, -0.5];
        for (i, (&pre, &cur)) in prez.iter().zip(z.iter()).enumerate() {
            let fired = state_event(&[pre], &[cur]);
            assert_eq!(fired, i == 2, "unexpected detection at index {i}");
        }
    }

    #[test]
    fn crossing_is_detected_in_both_directions() {
        assert!(state_event(&[-1.0], &[0.5]));
        assert!(state_event(&[1.0], &[0.0]));
        assert!(state_event(&[1.0], &[-0.5]));
        assert!(!state_event(&[-1.0], &[-0.5]));
        assert!(!state_event(&[1.0], &[0.5]));
    }

    #[test]
    fn resting_at_zero_is_not_a_crossing() {
        assert!(!state_event(&[0.0], &[0.0]));
    }

    #[test]
    fn any_indicator_triggers() {
        assert!(state_event(&[1.0, 1.0, -1.0], &[0.5, 1.0, 0.5]));
        assert!(!state_event(&[1.0, 1.0, -1.0], &[0.5, 1.0, -0.5]));
    }

    #[test]
    fn time_event_fires_within_tolerance() {
        let step = 0.2;
        assert!(!time_event(None, 1.0, step));
        assert!(!time_event(Some(1.0), 0.8, step));
        assert!(time_event(Some(1.0), 1.0, step));
        // Slightly short of the event but within 1% of the step.
        assert!(time_event(Some(1.0), 1.0 - step * TIME_EVENT_TOLERANCE, step));
        // A full step early must not fire.
        assert!(!time_event(Some(1.0), 1.0 - step, step));
    }
}
