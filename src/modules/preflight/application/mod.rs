pub mod preflight_checker;

pub use preflight_checker::PreflightChecker;
