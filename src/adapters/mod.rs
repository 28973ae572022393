// Adapters layer: concrete implementations for external systems.

pub mod http;
pub mod sink;
pub mod storage;

pub use http::PageFetcher;
pub use sink::TabularSink;
pub use storage::LocalStorage;
