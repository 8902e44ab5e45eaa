//! Database models for the `all_ana_projects` table.

use diesel::prelude::*;

use evapro_core::projects::{AnaProject, Flag, NewAnaProject};
use evapro_core::sync::now_sync_time;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::all_ana_projects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AnaProjectDB {
    pub id: i32,
    pub user: Option<String>,
    pub proid: String,
    pub ptype: Option<String>,
    pub isautoflow: Option<String>,
    pub workdir: Option<String>,
    pub isadd2annoeva: Option<String>,
    pub created_at: Option<String>,
    pub synced_at: Option<String>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::all_ana_projects)]
pub struct NewAnaProjectDB {
    pub user: String,
    pub proid: String,
    pub ptype: String,
    pub isautoflow: String,
    pub workdir: String,
    pub isadd2annoeva: String,
    pub created_at: String,
    pub synced_at: String,
}

impl From<AnaProjectDB> for AnaProject {
    fn from(db: AnaProjectDB) -> Self {
        AnaProject {
            id: db.id,
            user: db.user.unwrap_or_default(),
            proid: db.proid,
            ptype: db.ptype.unwrap_or_default(),
            isautoflow: db
                .isautoflow
                .as_deref()
                .and_then(Flag::from_db)
                .unwrap_or_default(),
            workdir: db.workdir.unwrap_or_default(),
            isadd2annoeva: db
                .isadd2annoeva
                .as_deref()
                .and_then(Flag::from_db)
                .unwrap_or_default(),
            created_at: db.created_at,
            synced_at: db.synced_at,
        }
    }
}

impl From<NewAnaProject> for NewAnaProjectDB {
    fn from(new_project: NewAnaProject) -> Self {
        let now = now_sync_time();
        NewAnaProjectDB {
            user: new_project.user,
            proid: new_project.proid,
            ptype: new_project.ptype,
            isautoflow: new_project.isautoflow.as_db().to_string(),
            workdir: new_project.workdir,
            isadd2annoeva: Flag::No.as_db().to_string(),
            created_at: now.clone(),
            synced_at: now,
        }
    }
}
