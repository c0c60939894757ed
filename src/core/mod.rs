pub mod sun_path;
pub mod tilt_optimisation;
pub mod units;
