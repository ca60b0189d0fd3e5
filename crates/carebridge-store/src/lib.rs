pub mod memory;
pub mod query;
pub mod snapshot;
pub mod traits;

pub use memory::*;
pub use query::*;
pub use snapshot::*;
pub use traits::*;
