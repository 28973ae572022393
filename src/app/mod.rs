// Application layer: concrete pipelines wiring adapters to domain services.

pub mod pipelines;
