// Domain layer: core models, the event stream, and ports (interfaces).

pub mod events;
pub mod model;
pub mod ports;
