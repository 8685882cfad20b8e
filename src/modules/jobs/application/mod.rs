pub mod service;

pub use service::ScalingJobService;
