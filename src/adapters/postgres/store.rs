//! Clinical store operations
//!
//! [`ClinicalStore`] is the trait seam the pipeline driver depends on;
//! [`PostgresStore`] implements it with parameterized SQL against the raw
//! clinical tables. The grouped visit summary counts *distinct* child ids so
//! the outer joins cannot inflate any count, and the summary write replaces
//! the whole table inside one transaction.

use crate::adapters::postgres::client::PostgresClient;
use crate::adapters::postgres::models;
use crate::config::schema::is_bare_identifier;
use crate::domain::errors::DatabaseError;
use crate::domain::{LabResult, PatientId, PatientSummary, Prescription, VisitAggregate, VisitRecord};
use async_trait::async_trait;
use std::sync::Arc;

const RECENT_VISITS_SQL: &str = r#"
    SELECT
        v.visit_id::bigint AS visit_id,
        v.patient_id::bigint AS patient_id,
        v.visit_date,
        v.provider_name,
        v.diagnosis_code
    FROM visits v
    ORDER BY v.visit_date DESC
    LIMIT $1
"#;

const PRESCRIPTIONS_SQL: &str = r#"
    SELECT
        p.prescription_id::bigint AS prescription_id,
        p.patient_id::bigint AS patient_id,
        p.medication_name,
        p.dosage,
        p.frequency,
        p.start_date,
        v.visit_date
    FROM prescriptions p
    LEFT JOIN visits v ON p.visit_id = v.visit_id
    WHERE p.patient_id = $1
    ORDER BY p.start_date DESC
"#;

const LAB_RESULTS_SQL: &str = r#"
    SELECT
        l.patient_id::bigint AS patient_id,
        l.test_name,
        l.test_value::double precision AS test_value,
        l.test_unit,
        l.normal_range,
        l.test_date,
        v.provider_name
    FROM lab_results l
    LEFT JOIN visits v ON l.visit_id = v.visit_id
    WHERE l.patient_id = ANY($1)
    ORDER BY l.test_date DESC
"#;

// Outer joins from visits to both child tables, counting distinct child ids:
// a visit with 3 prescriptions and 2 lab results still contributes exactly
// one visit, 3 prescriptions, and 2 lab tests.
const VISIT_AGGREGATES_SQL: &str = r#"
    SELECT
        v.patient_id::bigint AS patient_id,
        COUNT(DISTINCT v.visit_id) AS total_visits,
        COUNT(DISTINCT p.prescription_id) AS total_prescriptions,
        COUNT(DISTINCT l.lab_id) AS total_lab_tests,
        MIN(v.visit_date) AS first_visit,
        MAX(v.visit_date) AS last_visit
    FROM visits v
    LEFT JOIN prescriptions p ON v.visit_id = p.visit_id
    LEFT JOIN lab_results l ON v.visit_id = l.visit_id
    GROUP BY v.patient_id
    ORDER BY total_visits DESC
"#;

/// Read and write access to the clinical database
///
/// The driver is generic over this trait so tests can substitute an
/// in-memory implementation.
#[async_trait]
pub trait ClinicalStore: Send + Sync {
    /// Most recent visits across all patients, newest first
    async fn recent_visits(&self, limit: i64) -> Result<Vec<VisitRecord>, DatabaseError>;

    /// All prescriptions for one patient, newest first
    async fn prescriptions_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Prescription>, DatabaseError>;

    /// Lab results for a fixed set of patients, newest first
    async fn lab_results_for_patients(
        &self,
        patient_ids: &[PatientId],
    ) -> Result<Vec<LabResult>, DatabaseError>;

    /// Per-patient activity counts computed fresh from the raw tables
    async fn visit_aggregates(&self) -> Result<Vec<VisitAggregate>, DatabaseError>;

    /// Replace `table` with the given summaries and return the rows written
    ///
    /// The drop, create, and inserts run in one transaction: a concurrent
    /// reader observes either the prior table or the complete new one.
    async fn replace_summary(
        &self,
        table: &str,
        summaries: &[PatientSummary],
    ) -> Result<u64, DatabaseError>;

    /// Count the rows of `table`; the verification read after a replace
    async fn count_rows(&self, table: &str) -> Result<u64, DatabaseError>;
}

/// PostgreSQL implementation of [`ClinicalStore`]
pub struct PostgresStore {
    client: Arc<PostgresClient>,
}

impl PostgresStore {
    /// Create a new store over a pooled client
    pub fn new(client: PostgresClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Create a new store sharing an existing client
    pub fn with_client(client: Arc<PostgresClient>) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgresClient> {
        &self.client
    }
}

fn ensure_bare_identifier(name: &str) -> Result<(), DatabaseError> {
    if is_bare_identifier(name) {
        Ok(())
    } else {
        Err(DatabaseError::InvalidIdentifier(name.to_string()))
    }
}

fn summary_ddl(table: &str) -> String {
    format!(
        "DROP TABLE IF EXISTS {table};\n\
         CREATE TABLE {table} (\n\
             patient_id BIGINT PRIMARY KEY,\n\
             name TEXT NOT NULL,\n\
             date_of_birth DATE NOT NULL,\n\
             insurance_id TEXT,\n\
             total_visits BIGINT NOT NULL,\n\
             total_prescriptions BIGINT NOT NULL,\n\
             total_lab_tests BIGINT NOT NULL,\n\
             first_visit DATE,\n\
             last_visit DATE\n\
         )"
    )
}

fn summary_insert(table: &str) -> String {
    format!(
        "INSERT INTO {table} (\n\
             patient_id, name, date_of_birth, insurance_id,\n\
             total_visits, total_prescriptions, total_lab_tests,\n\
             first_visit, last_visit\n\
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
    )
}

#[async_trait]
impl ClinicalStore for PostgresStore {
    async fn recent_visits(&self, limit: i64) -> Result<Vec<VisitRecord>, DatabaseError> {
        let rows = self
            .client
            .query("recent_visits", RECENT_VISITS_SQL, &[&limit])
            .await?;
        rows.iter().map(models::visit_from_row).collect()
    }

    async fn prescriptions_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Prescription>, DatabaseError> {
        let rows = self
            .client
            .query(
                "prescriptions_for_patient",
                PRESCRIPTIONS_SQL,
                &[&patient_id.value()],
            )
            .await?;
        rows.iter().map(models::prescription_from_row).collect()
    }

    async fn lab_results_for_patients(
        &self,
        patient_ids: &[PatientId],
    ) -> Result<Vec<LabResult>, DatabaseError> {
        let ids: Vec<i64> = patient_ids.iter().map(|id| id.value()).collect();
        let rows = self
            .client
            .query("lab_results_for_patients", LAB_RESULTS_SQL, &[&ids])
            .await?;
        rows.iter().map(models::lab_result_from_row).collect()
    }

    async fn visit_aggregates(&self) -> Result<Vec<VisitAggregate>, DatabaseError> {
        let rows = self
            .client
            .query("visit_aggregates", VISIT_AGGREGATES_SQL, &[])
            .await?;
        rows.iter().map(models::aggregate_from_row).collect()
    }

    async fn replace_summary(
        &self,
        table: &str,
        summaries: &[PatientSummary],
    ) -> Result<u64, DatabaseError> {
        ensure_bare_identifier(table)?;

        let write_error = |message: String| DatabaseError::WriteFailed {
            table: table.to_string(),
            message,
        };

        let mut client = self.client.get_connection().await?;
        let tx = client
            .transaction()
            .await
            .map_err(|e| write_error(format!("failed to open transaction: {e}")))?;

        tx.batch_execute(&summary_ddl(table))
            .await
            .map_err(|e| write_error(format!("failed to recreate table: {e}")))?;

        let insert = tx
            .prepare(&summary_insert(table))
            .await
            .map_err(|e| write_error(format!("failed to prepare insert: {e}")))?;

        let mut written: u64 = 0;
        for summary in summaries {
            let insurance = summary.insurance_id.as_ref().map(|id| id.as_str());
            tx.execute(
                &insert,
                &[
                    &summary.patient_id.value(),
                    &summary.name,
                    &summary.date_of_birth,
                    &insurance,
                    &(summary.total_visits as i64),
                    &(summary.total_prescriptions as i64),
                    &(summary.total_lab_tests as i64),
                    &summary.first_visit,
                    &summary.last_visit,
                ],
            )
            .await
            .map_err(|e| {
                write_error(format!(
                    "failed to insert patient {}: {e}",
                    summary.patient_id
                ))
            })?;
            written += 1;
        }

        tx.commit()
            .await
            .map_err(|e| write_error(format!("failed to commit: {e}")))?;

        tracing::info!(table = table, rows = written, "Replaced summary table");
        Ok(written)
    }

    async fn count_rows(&self, table: &str) -> Result<u64, DatabaseError> {
        ensure_bare_identifier(table)?;

        let sql = format!("SELECT COUNT(*)::bigint AS count FROM {table}");
        let rows = self.client.query("count_rows", &sql, &[]).await?;

        let count: i64 = rows
            .first()
            .ok_or_else(|| DatabaseError::QueryFailed {
                context: "count_rows".to_string(),
                message: "COUNT(*) returned no rows".to_string(),
            })?
            .try_get("count")
            .map_err(|e| DatabaseError::RowDecode {
                context: "count_rows".to_string(),
                message: e.to_string(),
            })?;

        Ok(count.max(0) as u64)
    }
}
