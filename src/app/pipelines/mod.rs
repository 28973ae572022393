pub mod cleaning_pipeline;
pub mod flatten_pipeline;
pub mod harvest_pipeline;

pub use cleaning_pipeline::CleaningPipeline;
pub use flatten_pipeline::FlattenPipeline;
pub use harvest_pipeline::HarvestPipeline;
