pub mod packaging;
pub mod probe;

pub use crate::domain::model::{InitStatus, ProbeReport};
pub use crate::domain::ports::SodiumApi;
pub use crate::utils::error::Result;
