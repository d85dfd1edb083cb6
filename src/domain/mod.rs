// Domain layer: wire model and the two seams (transport, capability set).

pub mod model;
pub mod ports;
