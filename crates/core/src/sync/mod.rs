//! LIMS → local synchronization job.
//!
//! Pulls analysis-project billing rows newer than the persisted cursor,
//! resolves product names and backup paths, classifies auto-flow products,
//! and inserts the result into `all_ana_projects`. Per-row failures are
//! logged and skipped so one bad record cannot abort the batch.

use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use log::{debug, info, warn};

use crate::errors::Result;
use crate::projects::{AnaProjectColumn, AnaProjectRepositoryTrait, Flag, NewAnaProject};

/// Timestamp format of the `syn_lims_time` cursor and the remote
/// `create_date` comparison.
pub const SYNC_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in the cursor format.
pub fn now_sync_time() -> String {
    Local::now().format(SYNC_TIME_FORMAT).to_string()
}

/// One analysis project from the remote billing table, with the composite
/// product id (`parent-child`) already assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingProject {
    pub project_code: String,
    pub product_id: String,
    pub user: String,
}

/// Remote LIMS access used by the sync job. Implemented over MySQL by the
/// `evapro-lims` crate; tests use an in-memory fake.
pub trait LimsClientTrait {
    /// Billing rows with `create_date > since` and analysis type 1.
    fn analysis_projects_since(&mut self, since: &str) -> Result<Vec<BillingProject>>;

    /// LIMS product id -> human-readable product name.
    fn product_types(&mut self) -> Result<HashMap<String, String>>;

    /// Sub-project id -> backup pathway for recently finished missions.
    fn backup_paths(&mut self) -> Result<HashMap<String, String>>;

    /// Backup pathways for just the given project ids (back-fill pass).
    fn backup_paths_for(&mut self, proids: &[String]) -> Result<HashMap<String, String>>;

    /// Billing users for just the given project ids (back-fill pass).
    fn users_for(&mut self, proids: &[String]) -> Result<HashMap<String, String>>;
}

/// Counters reported by one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub unmatched: usize,
}

pub struct LimsSyncJob<'a> {
    repo: &'a dyn AnaProjectRepositoryTrait,
    lims: &'a mut dyn LimsClientTrait,
    autoflow_products: HashSet<String>,
    report_path: PathBuf,
}

impl<'a> LimsSyncJob<'a> {
    pub fn new(
        repo: &'a dyn AnaProjectRepositoryTrait,
        lims: &'a mut dyn LimsClientTrait,
        autoflow_products: HashSet<String>,
        report_path: PathBuf,
    ) -> Self {
        Self {
            repo,
            lims,
            autoflow_products,
            report_path,
        }
    }

    /// Run one sync pass for billing rows newer than `since`.
    pub fn run(&mut self, since: &str) -> Result<SyncSummary> {
        let projects = self.lims.analysis_projects_since(since)?;
        if projects.is_empty() {
            info!("no new analysis projects since {since}");
            return Ok(SyncSummary::default());
        }
        debug!("{} billing row(s) since {since}", projects.len());

        let product_names = self.lims.product_types()?;
        let backup_paths = self.lims.backup_paths()?;

        let mut summary = SyncSummary::default();
        let mut unmatched: Vec<(String, String)> = Vec::new();

        for row in projects {
            let Some(ptype) = product_names.get(&row.product_id) else {
                warn!(
                    "project {}: product id {} has no product-type match",
                    row.project_code, row.product_id
                );
                unmatched.push((row.project_code, row.product_id));
                summary.unmatched += 1;
                continue;
            };

            let workdir = backup_paths
                .get(&row.project_code)
                .cloned()
                .unwrap_or_default();
            let isautoflow = if self.autoflow_products.contains(ptype.as_str()) {
                Flag::Yes
            } else {
                Flag::No
            };

            let new_project = NewAnaProject {
                user: row.user,
                proid: row.project_code.clone(),
                ptype: ptype.clone(),
                isautoflow,
                workdir,
            };
            match self.repo.insert(new_project) {
                Ok(_) => summary.inserted += 1,
                Err(e) => {
                    warn!("skipping project {}: {e}", row.project_code);
                    summary.skipped += 1;
                }
            }
        }

        if !unmatched.is_empty() {
            self.write_unmatched_report(&unmatched)?;
        }

        info!(
            "sync done: {} inserted, {} skipped, {} without product type",
            summary.inserted, summary.skipped, summary.unmatched
        );
        Ok(summary)
    }

    /// Re-query backup paths for rows synced without a workdir.
    pub fn backfill_workdirs(&mut self) -> Result<usize> {
        let proids = self.repo.proids_missing_workdir()?;
        if proids.is_empty() {
            return Ok(0);
        }
        let paths = self.lims.backup_paths_for(&proids)?;
        let mut updated = 0;
        for (proid, path) in paths {
            if path.is_empty() {
                continue;
            }
            match self
                .repo
                .update_column(&proid, AnaProjectColumn::Workdir, &path)
            {
                Ok(n) => updated += n,
                Err(e) => warn!("workdir back-fill failed for {proid}: {e}"),
            }
        }
        if updated > 0 {
            info!("back-filled workdir for {updated} project(s)");
        }
        Ok(updated)
    }

    /// Re-query billing users for rows synced without a user.
    pub fn backfill_users(&mut self) -> Result<usize> {
        let proids = self.repo.proids_missing_user()?;
        if proids.is_empty() {
            return Ok(0);
        }
        let users = self.lims.users_for(&proids)?;
        let mut updated = 0;
        for (proid, user) in users {
            if user.is_empty() {
                continue;
            }
            match self.repo.update_column(&proid, AnaProjectColumn::User, &user) {
                Ok(n) => updated += n,
                Err(e) => warn!("user back-fill failed for {proid}: {e}"),
            }
        }
        if updated > 0 {
            info!("back-filled user for {updated} project(s)");
        }
        Ok(updated)
    }

    /// Append unmatched rows (`proid<TAB>product_id`) to the side report
    /// for manual review.
    fn write_unmatched_report(&self, rows: &[(String, String)]) -> Result<()> {
        if let Some(dir) = self.report_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.report_path)?;
        for (proid, product_id) in rows {
            writeln!(file, "{proid}\t{product_id}")?;
        }
        warn!(
            "{} unmatched product id(s) written to {}",
            rows.len(),
            self.report_path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DatabaseError, Error};
    use crate::projects::AnaProject;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MemoryRepo {
        rows: RefCell<Vec<AnaProject>>,
    }

    impl AnaProjectRepositoryTrait for MemoryRepo {
        fn insert(&self, new_project: NewAnaProject) -> Result<AnaProject> {
            let mut rows = self.rows.borrow_mut();
            if rows.iter().any(|r| r.proid == new_project.proid) {
                return Err(Error::Database(DatabaseError::UniqueViolation(
                    new_project.proid,
                )));
            }
            let row = AnaProject {
                id: rows.len() as i32 + 1,
                user: new_project.user,
                proid: new_project.proid,
                ptype: new_project.ptype,
                isautoflow: new_project.isautoflow,
                workdir: new_project.workdir,
                isadd2annoeva: Flag::No,
                created_at: None,
                synced_at: None,
            };
            rows.push(row.clone());
            Ok(row)
        }

        fn find_by(&self, column: AnaProjectColumn, value: &str) -> Result<Vec<AnaProject>> {
            let rows = self.rows.borrow();
            Ok(rows
                .iter()
                .filter(|r| match column {
                    AnaProjectColumn::Proid => r.proid == value,
                    AnaProjectColumn::User => r.user == value,
                    _ => false,
                })
                .cloned()
                .collect())
        }

        fn update_column(
            &self,
            proid: &str,
            column: AnaProjectColumn,
            value: &str,
        ) -> Result<usize> {
            let mut rows = self.rows.borrow_mut();
            let mut affected = 0;
            for row in rows.iter_mut().filter(|r| r.proid == proid) {
                match column {
                    AnaProjectColumn::Workdir => row.workdir = value.to_string(),
                    AnaProjectColumn::User => row.user = value.to_string(),
                    _ => {}
                }
                affected += 1;
            }
            Ok(affected)
        }

        fn pending_for_user(&self, user: &str) -> Result<Vec<AnaProject>> {
            let rows = self.rows.borrow();
            Ok(rows
                .iter()
                .filter(|r| r.user == user && r.isadd2annoeva == Flag::No && !r.workdir.is_empty())
                .cloned()
                .collect())
        }

        fn mark_forwarded(&self, proid: &str) -> Result<usize> {
            let mut rows = self.rows.borrow_mut();
            let mut affected = 0;
            for row in rows.iter_mut().filter(|r| r.proid == proid) {
                row.isadd2annoeva = Flag::Yes;
                affected += 1;
            }
            Ok(affected)
        }

        fn proids_missing_workdir(&self) -> Result<Vec<String>> {
            let rows = self.rows.borrow();
            Ok(rows
                .iter()
                .filter(|r| r.workdir.is_empty())
                .map(|r| r.proid.clone())
                .collect())
        }

        fn proids_missing_user(&self) -> Result<Vec<String>> {
            let rows = self.rows.borrow();
            Ok(rows
                .iter()
                .filter(|r| r.user.is_empty())
                .map(|r| r.proid.clone())
                .collect())
        }
    }

    #[derive(Default)]
    struct FakeLims {
        billing: Vec<BillingProject>,
        products: HashMap<String, String>,
        paths: HashMap<String, String>,
        users: HashMap<String, String>,
    }

    impl LimsClientTrait for FakeLims {
        fn analysis_projects_since(&mut self, _since: &str) -> Result<Vec<BillingProject>> {
            Ok(self.billing.clone())
        }

        fn product_types(&mut self) -> Result<HashMap<String, String>> {
            Ok(self.products.clone())
        }

        fn backup_paths(&mut self) -> Result<HashMap<String, String>> {
            Ok(self.paths.clone())
        }

        fn backup_paths_for(&mut self, proids: &[String]) -> Result<HashMap<String, String>> {
            Ok(self
                .paths
                .iter()
                .filter(|(k, _)| proids.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect())
        }

        fn users_for(&mut self, proids: &[String]) -> Result<HashMap<String, String>> {
            Ok(self
                .users
                .iter()
                .filter(|(k, _)| proids.contains(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect())
        }
    }

    fn billing(code: &str, product: &str, user: &str) -> BillingProject {
        BillingProject {
            project_code: code.to_string(),
            product_id: product.to_string(),
            user: user.to_string(),
        }
    }

    fn report_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("unmatched_products.tsv")
    }

    #[test]
    fn synced_row_matches_expected_shape() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = MemoryRepo::default();
        let mut lims = FakeLims {
            billing: vec![billing("P100", "7-12", "u1")],
            products: HashMap::from([("7-12".to_string(), "WGS".to_string())]),
            paths: HashMap::from([("P100".to_string(), "/work/P100".to_string())]),
            ..FakeLims::default()
        };
        let autoflow = HashSet::from(["WGS".to_string()]);

        let mut job = LimsSyncJob::new(&repo, &mut lims, autoflow, report_path(&dir));
        let summary = job.run("2025-06-01 00:00:00").expect("sync");

        assert_eq!(
            summary,
            SyncSummary {
                inserted: 1,
                skipped: 0,
                unmatched: 0
            }
        );
        let rows = repo.rows.borrow();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].proid, "P100");
        assert_eq!(rows[0].ptype, "WGS");
        assert_eq!(rows[0].isautoflow, Flag::Yes);
        assert_eq!(rows[0].isadd2annoeva, Flag::No);
        assert_eq!(rows[0].workdir, "/work/P100");
    }

    #[test]
    fn autoflow_is_no_when_product_not_listed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = MemoryRepo::default();
        let mut lims = FakeLims {
            billing: vec![billing("P200", "3-4", "u1")],
            products: HashMap::from([("3-4".to_string(), "Metagenome".to_string())]),
            ..FakeLims::default()
        };

        let mut job = LimsSyncJob::new(&repo, &mut lims, HashSet::new(), report_path(&dir));
        job.run("2025-06-01 00:00:00").expect("sync");

        assert_eq!(repo.rows.borrow()[0].isautoflow, Flag::No);
    }

    #[test]
    fn unmatched_product_goes_to_report_not_table() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = MemoryRepo::default();
        let mut lims = FakeLims {
            billing: vec![billing("P300", "99-99", "u2")],
            ..FakeLims::default()
        };

        let report = report_path(&dir);
        let mut job = LimsSyncJob::new(&repo, &mut lims, HashSet::new(), report.clone());
        let summary = job.run("2025-06-01 00:00:00").expect("sync");

        assert_eq!(summary.unmatched, 1);
        assert!(repo.rows.borrow().is_empty());
        let contents = std::fs::read_to_string(&report).expect("report");
        assert_eq!(contents, "P300\t99-99\n");
    }

    #[test]
    fn duplicate_proid_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = MemoryRepo::default();
        let mut lims = FakeLims {
            billing: vec![billing("P400", "1-1", "u1"), billing("P400", "1-1", "u1")],
            products: HashMap::from([("1-1".to_string(), "WGS".to_string())]),
            ..FakeLims::default()
        };

        let mut job = LimsSyncJob::new(&repo, &mut lims, HashSet::new(), report_path(&dir));
        let summary = job.run("2025-06-01 00:00:00").expect("sync");

        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(repo.rows.borrow().len(), 1);
    }

    #[test]
    fn missing_backup_path_leaves_workdir_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = MemoryRepo::default();
        let mut lims = FakeLims {
            billing: vec![billing("P500", "1-1", "u1")],
            products: HashMap::from([("1-1".to_string(), "WGS".to_string())]),
            ..FakeLims::default()
        };

        let mut job = LimsSyncJob::new(&repo, &mut lims, HashSet::new(), report_path(&dir));
        job.run("2025-06-01 00:00:00").expect("sync");
        assert_eq!(repo.rows.borrow()[0].workdir, "");
    }

    #[test]
    fn backfill_fills_missing_workdir_and_user() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = MemoryRepo::default();
        repo.insert(NewAnaProject {
            user: String::new(),
            proid: "P600".to_string(),
            ptype: "WGS".to_string(),
            isautoflow: Flag::No,
            workdir: String::new(),
        })
        .expect("seed");

        let mut lims = FakeLims {
            paths: HashMap::from([("P600".to_string(), "/work/P600".to_string())]),
            users: HashMap::from([("P600".to_string(), "u9".to_string())]),
            ..FakeLims::default()
        };

        let mut job = LimsSyncJob::new(&repo, &mut lims, HashSet::new(), report_path(&dir));
        assert_eq!(job.backfill_workdirs().expect("workdirs"), 1);
        assert_eq!(job.backfill_users().expect("users"), 1);

        let rows = repo.rows.borrow();
        assert_eq!(rows[0].workdir, "/work/P600");
        assert_eq!(rows[0].user, "u9");
    }
}
