pub mod scaling_error;

pub use scaling_error::{PreflightCheck, ScalingError, ScalingResult};
