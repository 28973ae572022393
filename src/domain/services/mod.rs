pub mod cleaner;
pub mod flattener;
pub mod path;
pub mod projector;

pub use cleaner::{CleaningRules, CustomerCleaner};
pub use flattener::{FlattenIter, FlattenedRow, TreeFlattener};
pub use projector::RecordProjector;
