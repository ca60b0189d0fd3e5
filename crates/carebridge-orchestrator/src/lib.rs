pub mod error;
pub mod orchestrator;
pub mod report;

pub use error::*;
pub use orchestrator::*;
pub use report::*;
