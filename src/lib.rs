pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
