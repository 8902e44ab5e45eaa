//! SQLite storage for the `all_ana_projects` table.

mod model;
mod repository;

pub use model::{AnaProjectDB, NewAnaProjectDB};
pub use repository::AnaProjectRepository;
