// Shared kernel used by every bounded context

pub mod errors; // Shared error types
pub mod infrastructure; // Shared infrastructure (configuration, database pools)
pub mod utils; // Shared utilities (logging)

// Re-exports for convenience
pub use errors::{ScalingError, ScalingResult};
pub use infrastructure::ScalingConfig;
