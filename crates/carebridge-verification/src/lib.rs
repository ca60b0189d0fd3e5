pub mod gateway;
pub mod parse;
pub mod prompt;
pub mod traits;

pub use gateway::*;
pub use parse::*;
pub use prompt::*;
pub use traits::*;
