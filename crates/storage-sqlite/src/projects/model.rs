//! Database models for the `projects` table.

use diesel::prelude::*;

use evapro_core::projects::{Flag, NewProject, Project, RunStatus};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::projects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProjectDB {
    pub id: i32,
    pub user: Option<String>,
    pub proid: String,
    pub ptype: Option<String>,
    pub workdir: Option<String>,
    pub dirstat: Option<String>,
    pub info: Option<String>,
    pub data: Option<String>,
    pub autoconf: Option<String>,
    pub conf_stde: Option<String>,
    pub worksh: Option<String>,
    pub pid: Option<i32>,
    pub p_args: Option<String>,
    pub stime: Option<String>,
    pub etime: Option<String>,
    pub pstat: Option<String>,
    pub run_num: Option<i32>,
}

/// Insert payload: status flags start at their defaults.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::projects)]
pub struct NewProjectDB {
    pub user: String,
    pub proid: String,
    pub ptype: String,
    pub workdir: String,
    pub dirstat: String,
    pub info: String,
    pub data: String,
    pub autoconf: String,
    pub pstat: String,
    pub run_num: i32,
}

fn flag_from(value: Option<&str>) -> Flag {
    value.and_then(Flag::from_db).unwrap_or_default()
}

impl From<ProjectDB> for Project {
    fn from(db: ProjectDB) -> Self {
        Project {
            id: db.id,
            user: db.user.unwrap_or_default(),
            proid: db.proid,
            ptype: db.ptype.unwrap_or_default(),
            workdir: db.workdir.unwrap_or_default(),
            dirstat: flag_from(db.dirstat.as_deref()),
            info: flag_from(db.info.as_deref()),
            data: flag_from(db.data.as_deref()),
            autoconf: flag_from(db.autoconf.as_deref()),
            conf_stde: db.conf_stde,
            worksh: db.worksh,
            pid: db.pid,
            p_args: db.p_args,
            stime: db.stime,
            etime: db.etime,
            pstat: db
                .pstat
                .as_deref()
                .and_then(RunStatus::from_db)
                .unwrap_or_default(),
            run_num: db.run_num.unwrap_or(0),
        }
    }
}

impl From<NewProject> for NewProjectDB {
    fn from(new_project: NewProject) -> Self {
        NewProjectDB {
            user: new_project.user,
            proid: new_project.proid,
            ptype: new_project.ptype,
            workdir: String::new(),
            dirstat: Flag::No.as_db().to_string(),
            info: Flag::No.as_db().to_string(),
            data: Flag::No.as_db().to_string(),
            autoconf: Flag::No.as_db().to_string(),
            pstat: RunStatus::NotStarted.as_db().to_string(),
            run_num: 0,
        }
    }
}
