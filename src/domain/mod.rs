// Domain layer: probe values and the port the native binding implements.

pub mod model;
pub mod ports;
