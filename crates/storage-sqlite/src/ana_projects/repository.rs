//! Repository for the `all_ana_projects` table.

use diesel::prelude::*;

use evapro_core::projects::{
    AnaProject, AnaProjectColumn, AnaProjectRepositoryTrait, Flag, NewAnaProject,
};
use evapro_core::Result;

use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::schema::all_ana_projects;

use super::model::{AnaProjectDB, NewAnaProjectDB};

pub struct AnaProjectRepository {
    pool: DbPool,
}

impl AnaProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        AnaProjectRepository { pool }
    }
}

impl AnaProjectRepositoryTrait for AnaProjectRepository {
    fn insert(&self, new_project: NewAnaProject) -> Result<AnaProject> {
        let mut conn = get_connection(&self.pool)?;
        let new_db: NewAnaProjectDB = new_project.into();
        let row = diesel::insert_into(all_ana_projects::table)
            .values(&new_db)
            .returning(AnaProjectDB::as_returning())
            .get_result(&mut conn)
            .map_err(StorageError::from)?;
        Ok(AnaProject::from(row))
    }

    fn find_by(&self, column: AnaProjectColumn, value: &str) -> Result<Vec<AnaProject>> {
        use crate::schema::all_ana_projects::dsl;

        let mut conn = get_connection(&self.pool)?;
        let mut query = all_ana_projects::table.into_boxed();
        query = match column {
            AnaProjectColumn::User => query.filter(dsl::user.eq(value)),
            AnaProjectColumn::Proid => query.filter(dsl::proid.eq(value)),
            AnaProjectColumn::Ptype => query.filter(dsl::ptype.eq(value)),
            AnaProjectColumn::Isautoflow => query.filter(dsl::isautoflow.eq(value)),
            AnaProjectColumn::Workdir => query.filter(dsl::workdir.eq(value)),
            AnaProjectColumn::Isadd2annoeva => query.filter(dsl::isadd2annoeva.eq(value)),
        };
        let rows = query
            .load::<AnaProjectDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(AnaProject::from).collect())
    }

    fn update_column(&self, proid: &str, column: AnaProjectColumn, value: &str) -> Result<usize> {
        use crate::schema::all_ana_projects::dsl;

        let mut conn = get_connection(&self.pool)?;
        let row = dsl::all_ana_projects.filter(dsl::proid.eq(proid));
        let affected = match column {
            AnaProjectColumn::User => diesel::update(row).set(dsl::user.eq(value)).execute(&mut conn),
            AnaProjectColumn::Proid => diesel::update(row)
                .set(dsl::proid.eq(value))
                .execute(&mut conn),
            AnaProjectColumn::Ptype => diesel::update(row)
                .set(dsl::ptype.eq(value))
                .execute(&mut conn),
            AnaProjectColumn::Isautoflow => diesel::update(row)
                .set(dsl::isautoflow.eq(value))
                .execute(&mut conn),
            AnaProjectColumn::Workdir => diesel::update(row)
                .set(dsl::workdir.eq(value))
                .execute(&mut conn),
            AnaProjectColumn::Isadd2annoeva => diesel::update(row)
                .set(dsl::isadd2annoeva.eq(value))
                .execute(&mut conn),
        };
        Ok(affected.map_err(StorageError::from)?)
    }

    fn pending_for_user(&self, user: &str) -> Result<Vec<AnaProject>> {
        use crate::schema::all_ana_projects::dsl;

        let mut conn = get_connection(&self.pool)?;
        // workdir filter is a non-empty check, not an exact match.
        let rows = dsl::all_ana_projects
            .filter(dsl::user.eq(user))
            .filter(dsl::isadd2annoeva.eq(Flag::No.as_db()))
            .filter(dsl::workdir.ne(""))
            .load::<AnaProjectDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(AnaProject::from).collect())
    }

    fn mark_forwarded(&self, proid: &str) -> Result<usize> {
        use crate::schema::all_ana_projects::dsl;

        let mut conn = get_connection(&self.pool)?;
        let affected = diesel::update(dsl::all_ana_projects.filter(dsl::proid.eq(proid)))
            .set(dsl::isadd2annoeva.eq(Flag::Yes.as_db()))
            .execute(&mut conn)
            .map_err(StorageError::from)?;
        Ok(affected)
    }

    fn proids_missing_workdir(&self) -> Result<Vec<String>> {
        use crate::schema::all_ana_projects::dsl;

        let mut conn = get_connection(&self.pool)?;
        let proids = dsl::all_ana_projects
            .filter(dsl::workdir.is_null().or(dsl::workdir.eq("")))
            .select(dsl::proid)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(proids)
    }

    fn proids_missing_user(&self) -> Result<Vec<String>> {
        use crate::schema::all_ana_projects::dsl;

        let mut conn = get_connection(&self.pool)?;
        let proids = dsl::all_ana_projects
            .filter(dsl::user.is_null().or(dsl::user.eq("")))
            .select(dsl::proid)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(proids)
    }
}
