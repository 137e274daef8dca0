#[cfg(feature = "ui")]
pub mod desktop;
pub mod web;
