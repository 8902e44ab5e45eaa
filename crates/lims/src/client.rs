//! MySQL implementation of the LIMS client.

use std::collections::HashMap;

use diesel::mysql::MysqlConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Text;
use log::debug;

use evapro_core::errors::RemoteError;
use evapro_core::settings::RemoteDbConfig;
use evapro_core::sync::{BillingProject, LimsClientTrait};
use evapro_core::Result;

use crate::transform::{compose_product_id, explode_product_ids};

/// Backup rows are only considered for missions finished after this date;
/// older entries point at retired storage.
const BACKUP_MISSION_CUTOFF: &str = "2025-04-01";

#[derive(QueryableByName)]
struct BillingRow {
    #[diesel(sql_type = Text)]
    project_code: String,
    #[diesel(sql_type = diesel::sql_types::Nullable<Text>)]
    product_parent_id: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<Text>)]
    product_id: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<Text>)]
    info_user_id: Option<String>,
}

#[derive(QueryableByName)]
struct ProductTypeRow {
    #[diesel(sql_type = diesel::sql_types::Nullable<Text>)]
    product_lims_id: Option<String>,
    #[diesel(sql_type = diesel::sql_types::Nullable<Text>)]
    introduction: Option<String>,
}

#[derive(QueryableByName)]
struct BackupRow {
    #[diesel(sql_type = Text)]
    sub_project_id: String,
    #[diesel(sql_type = diesel::sql_types::Nullable<Text>)]
    pathway: Option<String>,
}

#[derive(QueryableByName)]
struct UserRow {
    #[diesel(sql_type = diesel::sql_types::Nullable<Text>)]
    info_user_id: Option<String>,
}

/// Client over the two remote targets: `lims3` (billing) and
/// `cloud_message_info` (product types and backup paths).
pub struct LimsClient {
    billing: MysqlConnection,
    message: MysqlConnection,
}

impl LimsClient {
    pub fn connect(billing: &RemoteDbConfig, message: &RemoteDbConfig) -> Result<Self> {
        let billing = MysqlConnection::establish(&billing.url())
            .map_err(|e| RemoteError::ConnectionFailed(format!("billing target: {e}")))?;
        let message = MysqlConnection::establish(&message.url())
            .map_err(|e| RemoteError::ConnectionFailed(format!("message target: {e}")))?;
        Ok(LimsClient { billing, message })
    }
}

impl LimsClientTrait for LimsClient {
    fn analysis_projects_since(&mut self, since: &str) -> Result<Vec<BillingProject>> {
        let rows: Vec<BillingRow> = sql_query(
            "SELECT project_code, \
                    CAST(product_parent_id AS CHAR) AS product_parent_id, \
                    CAST(product_id AS CHAR) AS product_id, \
                    CAST(info_user_id AS CHAR) AS info_user_id \
             FROM tb_info_sequence_bill \
             WHERE create_date > ? AND ANALYSIS_TYPE = 1",
        )
        .bind::<Text, _>(since)
        .load(&mut self.billing)
        .map_err(|e| RemoteError::QueryFailed(format!("billing query: {e}")))?;
        debug!("billing returned {} row(s)", rows.len());

        Ok(rows
            .into_iter()
            .map(|row| BillingProject {
                project_code: row.project_code,
                product_id: compose_product_id(
                    row.product_parent_id.as_deref(),
                    row.product_id.as_deref(),
                ),
                user: row.info_user_id.unwrap_or_default(),
            })
            .collect())
    }

    fn product_types(&mut self) -> Result<HashMap<String, String>> {
        let rows: Vec<ProductTypeRow> = sql_query(
            "SELECT PRODUCT_LIMS_ID AS product_lims_id, introduction \
             FROM project_online_product_type",
        )
        .load(&mut self.message)
        .map_err(|e| RemoteError::QueryFailed(format!("product type query: {e}")))?;

        Ok(explode_product_ids(rows.into_iter().filter_map(|row| {
            let ids = row.product_lims_id?;
            Some((ids, row.introduction.unwrap_or_default()))
        })))
    }

    fn backup_paths(&mut self) -> Result<HashMap<String, String>> {
        let rows: Vec<BackupRow> = sql_query(
            "SELECT SUB_PROJECT_ID AS sub_project_id, PATHWAY AS pathway \
             FROM project_online_backup_info \
             WHERE MISSION_END_DATE > ?",
        )
        .bind::<Text, _>(BACKUP_MISSION_CUTOFF)
        .load(&mut self.message)
        .map_err(|e| RemoteError::QueryFailed(format!("backup path query: {e}")))?;

        // First row wins on duplicate sub-project ids.
        let mut map = HashMap::new();
        for row in rows {
            map.entry(row.sub_project_id)
                .or_insert_with(|| row.pathway.unwrap_or_default());
        }
        Ok(map)
    }

    fn backup_paths_for(&mut self, proids: &[String]) -> Result<HashMap<String, String>> {
        let mut map = HashMap::new();
        for proid in proids {
            let rows: Vec<BackupRow> = sql_query(
                "SELECT SUB_PROJECT_ID AS sub_project_id, PATHWAY AS pathway \
                 FROM project_online_backup_info \
                 WHERE SUB_PROJECT_ID = ? \
                 LIMIT 1",
            )
            .bind::<Text, _>(proid)
            .load(&mut self.message)
            .map_err(|e| RemoteError::QueryFailed(format!("backup path query: {e}")))?;
            if let Some(row) = rows.into_iter().next() {
                map.insert(row.sub_project_id, row.pathway.unwrap_or_default());
            }
        }
        Ok(map)
    }

    fn users_for(&mut self, proids: &[String]) -> Result<HashMap<String, String>> {
        let mut map = HashMap::new();
        for proid in proids {
            let rows: Vec<UserRow> = sql_query(
                "SELECT CAST(info_user_id AS CHAR) AS info_user_id \
                 FROM tb_info_sequence_bill \
                 WHERE project_code = ? \
                 LIMIT 1",
            )
            .bind::<Text, _>(proid)
            .load(&mut self.billing)
            .map_err(|e| RemoteError::QueryFailed(format!("billing user query: {e}")))?;
            if let Some(row) = rows.into_iter().next() {
                if let Some(user) = row.info_user_id {
                    map.insert(proid.clone(), user);
                }
            }
        }
        Ok(map)
    }
}
