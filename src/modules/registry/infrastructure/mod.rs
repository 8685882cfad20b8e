pub mod consul;
pub mod in_memory;

pub use consul::ConsulRegistryRepository;
pub use in_memory::InMemoryRegistryRepository;
