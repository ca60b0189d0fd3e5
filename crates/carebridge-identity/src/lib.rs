pub mod registry;
pub mod traits;

pub use registry::*;
pub use traits::*;
