pub mod cs;
pub mod io;
pub mod me;
pub mod params;
