//! Project domain models and repository contracts.

mod column;
mod model;
mod repository;

pub use column::*;
pub use model::*;
pub use repository::*;
