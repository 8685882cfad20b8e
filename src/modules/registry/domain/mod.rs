pub mod paths;
pub mod repository;

pub use repository::RegistryRepository;
