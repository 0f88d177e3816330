pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::ProbeConfig;

pub use crate::adapters::NativeSodium;
pub use crate::config::packaging::PackagingConfig;
pub use crate::core::{
    packaging::{PackagePlan, ReleaseVersion},
    probe::Probe,
};
pub use crate::domain::{
    model::{InitStatus, ProbeReport},
    ports::SodiumApi,
};
pub use crate::utils::error::{ProbeError, Result};
