// Domain layer: request/credential types and the upstream port. No server framework types here.

pub mod model;
pub mod ports;
