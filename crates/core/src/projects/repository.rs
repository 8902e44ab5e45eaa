//! Repository contracts implemented by the SQLite storage crate.

use crate::errors::Result;

use super::{AnaProject, AnaProjectColumn, NewAnaProject, NewProject, Project, ProjectColumn};

/// Operations on the `projects` table.
pub trait ProjectRepositoryTrait {
    /// Insert a newly registered project with default status flags.
    fn insert(&self, new_project: NewProject) -> Result<Project>;

    /// Load all rows whose `column` equals `value`.
    fn find_by(&self, column: ProjectColumn, value: &str) -> Result<Vec<Project>>;

    /// Set one named column for the row identified by `proid`. Returns the
    /// number of affected rows.
    fn update_column(&self, proid: &str, column: ProjectColumn, value: &str) -> Result<usize>;

    /// Delete a project row, scoped to the requesting user. Rows owned by
    /// someone else are left untouched (returns 0).
    fn delete_owned(&self, proid: &str, user: &str) -> Result<usize>;
}

/// Operations on the `all_ana_projects` table.
pub trait AnaProjectRepositoryTrait {
    /// Insert one synced project (`isadd2annoeva` starts at `N`).
    fn insert(&self, new_project: NewAnaProject) -> Result<AnaProject>;

    /// Load all rows whose `column` equals `value`.
    fn find_by(&self, column: AnaProjectColumn, value: &str) -> Result<Vec<AnaProject>>;

    /// Set one named column for the row identified by `proid`.
    fn update_column(&self, proid: &str, column: AnaProjectColumn, value: &str) -> Result<usize>;

    /// Rows for `user` that have not been forwarded yet and carry a
    /// non-empty workdir.
    fn pending_for_user(&self, user: &str) -> Result<Vec<AnaProject>>;

    /// Flip `isadd2annoeva` to `Y` for one row. Monotonic, never reversed.
    fn mark_forwarded(&self, proid: &str) -> Result<usize>;

    /// Project ids synced without a workdir, for the back-fill pass.
    fn proids_missing_workdir(&self) -> Result<Vec<String>>;

    /// Project ids synced without a user, for the back-fill pass.
    fn proids_missing_user(&self) -> Result<Vec<String>>;
}
