// Domain layer: models, ports (interfaces) and the pure transformations.
// Nothing in here touches the network or the filesystem.

pub mod model;
pub mod ports;

pub mod services;
