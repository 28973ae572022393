pub mod accumulator;
pub mod etl;

pub use crate::domain::model::{Page, RawRecord, Record, Table};
pub use crate::domain::ports::{PageSource, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use accumulator::{HarvestOutcome, HarvestStop, ResultAccumulator};
