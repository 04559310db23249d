//! Reference models for the [`fmu`] runtime.
//!
//! Each model implements [`fmu::Model`] and can be instantiated for any of
//! the interface types it supports:
//!
//! * [`BouncingBall`] — two continuous states with a state event (the bounce)
//! * [`Dahlquist`] — the linear test equation `der(x) = -k * x`
//! * [`VanDerPol`] — a nonlinear oscillator, no events
//! * [`Stair`] — purely discrete, a counter driven by time events
//! * [`Clocks`] — clocked model partitions for Scheduled Execution

pub mod bouncing_ball;
pub mod clocks;
pub mod dahlquist;
pub mod stair;
pub mod van_der_pol;

pub use bouncing_ball::BouncingBall;
pub use clocks::Clocks;
pub use dahlquist::Dahlquist;
pub use stair::Stair;
pub use van_der_pol::VanDerPol;
