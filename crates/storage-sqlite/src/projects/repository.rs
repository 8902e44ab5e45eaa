//! Repository for the `projects` table.

use diesel::prelude::*;
use log::warn;

use evapro_core::errors::{DatabaseError, Error};
use evapro_core::projects::{NewProject, Project, ProjectColumn, ProjectRepositoryTrait};
use evapro_core::Result;

use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::projects;

use super::model::{NewProjectDB, ProjectDB};

pub struct ProjectRepository {
    pool: DbPool,
}

impl ProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        ProjectRepository { pool }
    }
}

fn parse_int(column: ProjectColumn, value: &str) -> Result<i32> {
    value.parse::<i32>().map_err(|_| {
        Error::Database(DatabaseError::QueryFailed(format!(
            "invalid integer '{value}' for column {}",
            column.as_str()
        )))
    })
}

impl ProjectRepositoryTrait for ProjectRepository {
    fn insert(&self, new_project: NewProject) -> Result<Project> {
        let mut conn = get_connection(&self.pool)?;
        let new_db: NewProjectDB = new_project.into();
        let row = diesel::insert_into(projects::table)
            .values(&new_db)
            .returning(ProjectDB::as_returning())
            .get_result(&mut conn)
            .map_err(StorageError::from)?;
        Ok(Project::from(row))
    }

    fn find_by(&self, column: ProjectColumn, value: &str) -> Result<Vec<Project>> {
        use crate::schema::projects::dsl;

        let mut conn = get_connection(&self.pool)?;
        let mut query = projects::table.into_boxed();
        query = match column {
            ProjectColumn::Id => query.filter(dsl::id.eq(parse_int(column, value)?)),
            ProjectColumn::User => query.filter(dsl::user.eq(value)),
            ProjectColumn::Proid => query.filter(dsl::proid.eq(value)),
            ProjectColumn::Ptype => query.filter(dsl::ptype.eq(value)),
            ProjectColumn::Workdir => query.filter(dsl::workdir.eq(value)),
            ProjectColumn::Dirstat => query.filter(dsl::dirstat.eq(value)),
            ProjectColumn::Info => query.filter(dsl::info.eq(value)),
            ProjectColumn::Data => query.filter(dsl::data.eq(value)),
            ProjectColumn::Autoconf => query.filter(dsl::autoconf.eq(value)),
            ProjectColumn::ConfStde => query.filter(dsl::conf_stde.eq(value)),
            ProjectColumn::Worksh => query.filter(dsl::worksh.eq(value)),
            ProjectColumn::Pid => query.filter(dsl::pid.eq(parse_int(column, value)?)),
            ProjectColumn::PArgs => query.filter(dsl::p_args.eq(value)),
            ProjectColumn::Stime => query.filter(dsl::stime.eq(value)),
            ProjectColumn::Etime => query.filter(dsl::etime.eq(value)),
            ProjectColumn::Pstat => query.filter(dsl::pstat.eq(value)),
            ProjectColumn::RunNum => query.filter(dsl::run_num.eq(parse_int(column, value)?)),
        };
        let rows = query
            .load::<ProjectDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    fn update_column(&self, target: &str, column: ProjectColumn, value: &str) -> Result<usize> {
        use crate::schema::projects::dsl;

        let mut conn = get_connection(&self.pool)?;
        let row = dsl::projects.filter(dsl::proid.eq(target));
        let affected = match column {
            // The primary key is not updatable by name.
            ProjectColumn::Id => {
                return Err(Error::Database(DatabaseError::UnsupportedColumn(
                    "id".to_string(),
                )))
            }
            ProjectColumn::User => diesel::update(row).set(dsl::user.eq(value)).execute(&mut conn),
            ProjectColumn::Proid => diesel::update(row)
                .set(dsl::proid.eq(value))
                .execute(&mut conn),
            ProjectColumn::Ptype => diesel::update(row)
                .set(dsl::ptype.eq(value))
                .execute(&mut conn),
            ProjectColumn::Workdir => diesel::update(row)
                .set(dsl::workdir.eq(value))
                .execute(&mut conn),
            ProjectColumn::Dirstat => diesel::update(row)
                .set(dsl::dirstat.eq(value))
                .execute(&mut conn),
            ProjectColumn::Info => diesel::update(row).set(dsl::info.eq(value)).execute(&mut conn),
            ProjectColumn::Data => diesel::update(row).set(dsl::data.eq(value)).execute(&mut conn),
            ProjectColumn::Autoconf => diesel::update(row)
                .set(dsl::autoconf.eq(value))
                .execute(&mut conn),
            ProjectColumn::ConfStde => diesel::update(row)
                .set(dsl::conf_stde.eq(value))
                .execute(&mut conn),
            ProjectColumn::Worksh => diesel::update(row)
                .set(dsl::worksh.eq(value))
                .execute(&mut conn),
            ProjectColumn::Pid => diesel::update(row)
                .set(dsl::pid.eq(parse_int(column, value)?))
                .execute(&mut conn),
            ProjectColumn::PArgs => diesel::update(row)
                .set(dsl::p_args.eq(value))
                .execute(&mut conn),
            ProjectColumn::Stime => diesel::update(row)
                .set(dsl::stime.eq(value))
                .execute(&mut conn),
            ProjectColumn::Etime => diesel::update(row)
                .set(dsl::etime.eq(value))
                .execute(&mut conn),
            ProjectColumn::Pstat => diesel::update(row)
                .set(dsl::pstat.eq(value))
                .execute(&mut conn),
            ProjectColumn::RunNum => diesel::update(row)
                .set(dsl::run_num.eq(parse_int(column, value)?))
                .execute(&mut conn),
        };
        Ok(affected.map_err(StorageError::from)?)
    }

    fn delete_owned(&self, proid: &str, user: &str) -> Result<usize> {
        use crate::schema::projects::dsl;

        let mut conn = get_connection(&self.pool)?;
        let affected = diesel::delete(
            dsl::projects
                .filter(dsl::proid.eq(proid))
                .filter(dsl::user.eq(user)),
        )
        .execute(&mut conn)
        .map_err(StorageError::from)?;
        if affected == 0 {
            warn!("project {proid} not found or not owned by {user}");
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations};
    use evapro_core::projects::{Flag, RunStatus};

    fn test_repo() -> (tempfile::TempDir, ProjectRepository) {
        let dir = tempfile::tempdir().expect("tempdir");
        let pool = create_pool(&dir.path().join("syncproject.db")).expect("pool");
        run_migrations(&pool).expect("migrations");
        (dir, ProjectRepository::new(pool))
    }

    fn new_project(proid: &str) -> NewProject {
        NewProject {
            user: "u1".to_string(),
            proid: proid.to_string(),
            ptype: "WGS".to_string(),
        }
    }

    #[test]
    fn insert_applies_default_flags() {
        let (_dir, repo) = test_repo();
        let project = repo.insert(new_project("P100")).expect("insert");
        assert_eq!(project.dirstat, Flag::No);
        assert_eq!(project.autoconf, Flag::No);
        assert_eq!(project.pstat, RunStatus::NotStarted);
        assert_eq!(project.run_num, 0);
        assert_eq!(project.workdir, "");
    }

    #[test]
    fn duplicate_proid_is_a_unique_violation() {
        let (_dir, repo) = test_repo();
        repo.insert(new_project("P100")).expect("first insert");
        let err = repo.insert(new_project("P100")).unwrap_err();
        assert!(err.is_unique_violation(), "got {err}");
    }

    #[test]
    fn migrations_run_twice_keep_existing_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pool = create_pool(&dir.path().join("syncproject.db")).expect("pool");
        run_migrations(&pool).expect("first run");
        let repo = ProjectRepository::new(pool.clone());
        repo.insert(new_project("P100")).expect("insert");

        run_migrations(&pool).expect("second run");
        let rows = repo
            .find_by(ProjectColumn::Proid, "P100")
            .expect("query");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn update_column_is_scoped_to_proid() {
        let (_dir, repo) = test_repo();
        repo.insert(new_project("P100")).expect("insert");
        repo.insert(new_project("P200")).expect("insert");

        let affected = repo
            .update_column("P100", ProjectColumn::Pstat, "run")
            .expect("update");
        assert_eq!(affected, 1);

        let rows = repo.find_by(ProjectColumn::Pstat, "run").expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].proid, "P100");
    }

    #[test]
    fn update_of_primary_key_is_rejected() {
        let (_dir, repo) = test_repo();
        repo.insert(new_project("P100")).expect("insert");
        let err = repo
            .update_column("P100", ProjectColumn::Id, "7")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::UnsupportedColumn(_))
        ));
    }

    #[test]
    fn delete_is_scoped_to_owner() {
        let (_dir, repo) = test_repo();
        repo.insert(new_project("P100")).expect("insert");

        assert_eq!(repo.delete_owned("P100", "someone_else").expect("noop"), 0);
        assert_eq!(
            repo.find_by(ProjectColumn::Proid, "P100")
                .expect("query")
                .len(),
            1
        );

        assert_eq!(repo.delete_owned("P100", "u1").expect("delete"), 1);
        assert!(repo
            .find_by(ProjectColumn::Proid, "P100")
            .expect("query")
            .is_empty());
    }

    #[test]
    fn numeric_columns_require_integers() {
        let (_dir, repo) = test_repo();
        repo.insert(new_project("P100")).expect("insert");
        assert!(repo
            .update_column("P100", ProjectColumn::Pid, "not-a-pid")
            .is_err());
        assert_eq!(
            repo.update_column("P100", ProjectColumn::Pid, "4242")
                .expect("update"),
            1
        );
        let rows = repo.find_by(ProjectColumn::Pid, "4242").expect("query");
        assert_eq!(rows[0].pid, Some(4242));
    }
}
