// Domain layer: wire models and the ports the job engine talks through.

pub mod model;
pub mod ports;
