//! Simulation driver for the `fmu` reference models: resolves run parameters,
//! dispatches to the Co-Simulation or Model Exchange loop and records output
//! samples.

pub mod options;
pub mod sim;

use fmu_models::{BouncingBall, Dahlquist, Stair, VanDerPol};

use options::{InterfaceKind, ModelName, SimOptions};
use sim::{io::Recording, params::SimParams};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model returned {0}")]
    Model(#[from] fmu::ModelError),
    #[error(transparent)]
    Solver(#[from] fmu::solver::SolverError),
    #[error("writing output failed: {0}")]
    Csv(#[from] csv::Error),
}

pub fn simulate(options: &SimOptions) -> Result<Recording, Error> {
    macro_rules! run {
        ($model:ty) => {{
            let params = SimParams::for_model::<$model>(options);
            log::info!(
                "simulating {} from {} to {} via {:?}",
                <$model as fmu::Model>::NAME,
                params.start_time,
                params.stop_time,
                options.interface
            );
            match options.interface {
                InterfaceKind::Cs => sim::cs::co_simulate::<$model>(&params),
                InterfaceKind::Me => sim::me::model_exchange::<$model>(&params),
            }
        }};
    }

    match options.model {
        ModelName::BouncingBall => run!(BouncingBall),
        ModelName::Dahlquist => run!(Dahlquist),
        ModelName::Stair => run!(Stair),
        ModelName::VanDerPol => run!(VanDerPol),
    }
}
