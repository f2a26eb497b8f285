pub mod incident;
pub mod comment;
pub mod page;
pub mod stats;

pub use incident::*;
pub use comment::*;
pub use page::*;
pub use stats::*;
