// Adapters layer: concrete implementations of domain ports.

pub mod native;

pub use native::NativeSodium;
