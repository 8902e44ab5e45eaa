//! Domain models for the two local tracking tables.

use serde::{Deserialize, Serialize};

/// Tri-state status flag persisted as `Y`/`N`/`err` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    Yes,
    #[default]
    No,
    Err,
}

impl Flag {
    pub fn as_db(&self) -> &'static str {
        match self {
            Flag::Yes => "Y",
            Flag::No => "N",
            Flag::Err => "err",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "Y" => Some(Flag::Yes),
            "N" => Some(Flag::No),
            "err" => Some(Flag::Err),
            _ => None,
        }
    }
}

/// work.sh lifecycle status persisted as `run`/`done`/`err`/`-` text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Run,
    Done,
    Err,
    #[default]
    NotStarted,
}

impl RunStatus {
    pub fn as_db(&self) -> &'static str {
        match self {
            RunStatus::Run => "run",
            RunStatus::Done => "done",
            RunStatus::Err => "err",
            RunStatus::NotStarted => "-",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "run" => Some(RunStatus::Run),
            "done" => Some(RunStatus::Done),
            "err" => Some(RunStatus::Err),
            "-" => Some(RunStatus::NotStarted),
            _ => None,
        }
    }
}

/// One row of the `projects` table. Rows are created on registration and
/// mutated by external tooling as the project progresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i32,
    pub user: String,
    pub proid: String,
    pub ptype: String,
    pub workdir: String,
    pub dirstat: Flag,
    pub info: Flag,
    pub data: Flag,
    pub autoconf: Flag,
    pub conf_stde: Option<String>,
    pub worksh: Option<String>,
    pub pid: Option<i32>,
    pub p_args: Option<String>,
    pub stime: Option<String>,
    pub etime: Option<String>,
    pub pstat: RunStatus,
    pub run_num: i32,
}

/// Payload for registering a new project. Status flags start at their
/// defaults (`N`, pstat `-`, run_num 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub user: String,
    pub proid: String,
    pub ptype: String,
}

/// One row of the `all_ana_projects` table, written by the LIMS sync job
/// and consumed by the forwarding job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnaProject {
    pub id: i32,
    pub user: String,
    pub proid: String,
    pub ptype: String,
    pub isautoflow: Flag,
    pub workdir: String,
    pub isadd2annoeva: Flag,
    pub created_at: Option<String>,
    pub synced_at: Option<String>,
}

/// Payload produced by the sync job for one remote project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnaProject {
    pub user: String,
    pub proid: String,
    pub ptype: String,
    pub isautoflow: Flag,
    pub workdir: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_db_round_trip() {
        for flag in [Flag::Yes, Flag::No, Flag::Err] {
            assert_eq!(Flag::from_db(flag.as_db()), Some(flag));
        }
        assert_eq!(Flag::from_db("maybe"), None);
    }

    #[test]
    fn run_status_db_round_trip() {
        for status in [
            RunStatus::Run,
            RunStatus::Done,
            RunStatus::Err,
            RunStatus::NotStarted,
        ] {
            assert_eq!(RunStatus::from_db(status.as_db()), Some(status));
        }
    }
}
