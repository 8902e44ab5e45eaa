//! Allow-list enums for by-name column access.
//!
//! Update/query operations take one of these instead of a raw column
//! string, so identifiers never reach the SQL layer as text.

use serde::{Deserialize, Serialize};

/// Updatable/queryable columns of the `projects` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectColumn {
    Id,
    User,
    Proid,
    Ptype,
    Workdir,
    Dirstat,
    Info,
    Data,
    Autoconf,
    ConfStde,
    Worksh,
    Pid,
    PArgs,
    Stime,
    Etime,
    Pstat,
    RunNum,
}

impl ProjectColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectColumn::Id => "id",
            ProjectColumn::User => "user",
            ProjectColumn::Proid => "proid",
            ProjectColumn::Ptype => "ptype",
            ProjectColumn::Workdir => "workdir",
            ProjectColumn::Dirstat => "dirstat",
            ProjectColumn::Info => "info",
            ProjectColumn::Data => "data",
            ProjectColumn::Autoconf => "autoconf",
            ProjectColumn::ConfStde => "conf_stde",
            ProjectColumn::Worksh => "worksh",
            ProjectColumn::Pid => "pid",
            ProjectColumn::PArgs => "p_args",
            ProjectColumn::Stime => "stime",
            ProjectColumn::Etime => "etime",
            ProjectColumn::Pstat => "pstat",
            ProjectColumn::RunNum => "run_num",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(ProjectColumn::Id),
            "user" => Some(ProjectColumn::User),
            "proid" => Some(ProjectColumn::Proid),
            "ptype" => Some(ProjectColumn::Ptype),
            "workdir" => Some(ProjectColumn::Workdir),
            "dirstat" => Some(ProjectColumn::Dirstat),
            "info" => Some(ProjectColumn::Info),
            "data" => Some(ProjectColumn::Data),
            "autoconf" => Some(ProjectColumn::Autoconf),
            "conf_stde" => Some(ProjectColumn::ConfStde),
            "worksh" => Some(ProjectColumn::Worksh),
            "pid" => Some(ProjectColumn::Pid),
            "p_args" => Some(ProjectColumn::PArgs),
            "stime" => Some(ProjectColumn::Stime),
            "etime" => Some(ProjectColumn::Etime),
            "pstat" => Some(ProjectColumn::Pstat),
            "run_num" => Some(ProjectColumn::RunNum),
            _ => None,
        }
    }
}

/// Updatable/queryable columns of the `all_ana_projects` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnaProjectColumn {
    User,
    Proid,
    Ptype,
    Isautoflow,
    Workdir,
    Isadd2annoeva,
}

impl AnaProjectColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnaProjectColumn::User => "user",
            AnaProjectColumn::Proid => "proid",
            AnaProjectColumn::Ptype => "ptype",
            AnaProjectColumn::Isautoflow => "isautoflow",
            AnaProjectColumn::Workdir => "workdir",
            AnaProjectColumn::Isadd2annoeva => "isadd2annoeva",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "user" => Some(AnaProjectColumn::User),
            "proid" => Some(AnaProjectColumn::Proid),
            "ptype" => Some(AnaProjectColumn::Ptype),
            "isautoflow" => Some(AnaProjectColumn::Isautoflow),
            "workdir" => Some(AnaProjectColumn::Workdir),
            "isadd2annoeva" => Some(AnaProjectColumn::Isadd2annoeva),
            _ => None,
        }
    }
}
