pub mod error;
pub mod outcome;
pub mod profile;
pub mod resource;
pub mod submission;

pub use error::*;
pub use outcome::*;
pub use profile::*;
pub use resource::*;
pub use submission::*;
