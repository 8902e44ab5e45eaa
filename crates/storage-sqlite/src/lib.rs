//! SQLite storage for evapro: the local project-tracking database.

pub mod ana_projects;
pub mod db;
pub mod errors;
pub mod projects;
pub mod schema;

pub use ana_projects::AnaProjectRepository;
pub use db::{create_pool, get_connection, run_migrations, DbPool};
pub use projects::ProjectRepository;
