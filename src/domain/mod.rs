// Domain layer: task model, ports (interfaces) and the task service.

pub mod model;
pub mod ports;
pub mod services;
