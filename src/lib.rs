pub mod aggregate;
pub mod charts;
pub mod cleaner;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod source;
pub mod stats;
