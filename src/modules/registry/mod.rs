/// Registry access for scaling job state
///
/// The registry is the single source of truth shared by every coordinator
/// process: job configuration and per-shard positions live under
/// `/scaling/job/{jobId}`.
///
/// Architecture:
/// - Domain: repository trait and key layout
/// - Infrastructure: in-memory and Consul KV implementations
pub mod domain;
pub mod infrastructure;

// Re-exports for easy access
pub use domain::{paths, RegistryRepository};
pub use infrastructure::{ConsulRegistryRepository, InMemoryRegistryRepository};
