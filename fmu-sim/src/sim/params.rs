use fmu::Model;

use crate::options::SimOptions;

/// Resolved run parameters: CLI options with the model's default experiment
/// filled in.
#[derive(Debug, Clone, Copy)]
pub struct SimParams {
    pub start_time: f64,
    pub stop_time: f64,
    pub output_interval: f64,
    pub event_mode_used: bool,
    pub early_return_allowed: bool,
}

impl SimParams {
    pub fn for_model<M: Model>(options: &SimOptions) -> Self {
        let start_time = options.start_time;
        let stop_time = options.stop_time.unwrap_or(M::DEFAULT_STOP_TIME);
        let output_interval = options
            .output_interval
            .unwrap_or((stop_time - start_time) / 500.0);
        Self {
            start_time,
            stop_time,
            output_interval,
            event_mode_used: options.event_mode,
            early_return_allowed: options.early_return,
        }
    }
}
