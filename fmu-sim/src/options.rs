use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelName {
    BouncingBall,
    Dahlquist,
    Stair,
    VanDerPol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum InterfaceKind {
    /// Co-Simulation: the instance steps itself between communication points.
    #[default]
    Cs,
    /// Model Exchange: the driver integrates the model with its own solver.
    Me,
}

/// Simulate one of the reference models.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct SimOptions {
    /// Model to simulate
    #[arg(value_enum)]
    pub model: ModelName,

    /// Interface type to drive the model through
    #[arg(long, value_enum, default_value_t = InterfaceKind::Cs)]
    pub interface: InterfaceKind,

    /// Simulation start time
    #[arg(long, default_value_t = 0.0)]
    pub start_time: f64,

    /// Simulation stop time [default: the model's default experiment]
    #[arg(long)]
    pub stop_time: Option<f64>,

    /// Interval between recorded output samples [default: (stop - start) / 500]
    #[arg(long)]
    pub output_interval: Option<f64>,

    /// Let the driver run the event iterations instead of the instance
    /// (Co-Simulation only)
    #[arg(long)]
    pub event_mode: bool,

    /// Allow the instance to return early from a communication step
    /// (Co-Simulation only)
    #[arg(long)]
    pub early_return: bool,

    /// Write the recorded samples as CSV to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: clap_verbosity_flag::Verbosity<clap_verbosity_flag::WarnLevel>,
}
