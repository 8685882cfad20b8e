pub mod jobs;
pub mod preflight;
pub mod registry;
