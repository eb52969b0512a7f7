// Domain layer: card models and the store port. No backend dependencies here.

pub mod model;
pub mod ports;
