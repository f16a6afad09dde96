//! Row-to-domain conversions for the clinical reads
//!
//! Every read statement casts its id columns to `bigint` so the mapping here
//! can stay uniform regardless of how the raw tables declare them.

use crate::domain::errors::DatabaseError;
use crate::domain::{LabResult, PatientId, Prescription, VisitAggregate, VisitRecord};
use tokio_postgres::Row;

fn decode_error(context: &str, err: tokio_postgres::Error) -> DatabaseError {
    DatabaseError::RowDecode {
        context: context.to_string(),
        message: err.to_string(),
    }
}

/// Maps one row of the recent-visits query
pub fn visit_from_row(row: &Row) -> Result<VisitRecord, DatabaseError> {
    let context = "recent_visits";
    Ok(VisitRecord {
        visit_id: row.try_get("visit_id").map_err(|e| decode_error(context, e))?,
        patient_id: PatientId::new(
            row.try_get("patient_id")
                .map_err(|e| decode_error(context, e))?,
        ),
        visit_date: row
            .try_get("visit_date")
            .map_err(|e| decode_error(context, e))?,
        provider_name: row
            .try_get("provider_name")
            .map_err(|e| decode_error(context, e))?,
        diagnosis_code: row
            .try_get("diagnosis_code")
            .map_err(|e| decode_error(context, e))?,
    })
}

/// Maps one row of the prescriptions query
pub fn prescription_from_row(row: &Row) -> Result<Prescription, DatabaseError> {
    let context = "prescriptions_for_patient";
    Ok(Prescription {
        prescription_id: row
            .try_get("prescription_id")
            .map_err(|e| decode_error(context, e))?,
        patient_id: PatientId::new(
            row.try_get("patient_id")
                .map_err(|e| decode_error(context, e))?,
        ),
        medication_name: row
            .try_get("medication_name")
            .map_err(|e| decode_error(context, e))?,
        dosage: row.try_get("dosage").map_err(|e| decode_error(context, e))?,
        frequency: row
            .try_get("frequency")
            .map_err(|e| decode_error(context, e))?,
        start_date: row
            .try_get("start_date")
            .map_err(|e| decode_error(context, e))?,
        visit_date: row
            .try_get("visit_date")
            .map_err(|e| decode_error(context, e))?,
    })
}

/// Maps one row of the lab-results query
pub fn lab_result_from_row(row: &Row) -> Result<LabResult, DatabaseError> {
    let context = "lab_results_for_patients";
    Ok(LabResult {
        patient_id: PatientId::new(
            row.try_get("patient_id")
                .map_err(|e| decode_error(context, e))?,
        ),
        test_name: row
            .try_get("test_name")
            .map_err(|e| decode_error(context, e))?,
        test_value: row
            .try_get("test_value")
            .map_err(|e| decode_error(context, e))?,
        test_unit: row
            .try_get("test_unit")
            .map_err(|e| decode_error(context, e))?,
        normal_range: row
            .try_get("normal_range")
            .map_err(|e| decode_error(context, e))?,
        test_date: row
            .try_get("test_date")
            .map_err(|e| decode_error(context, e))?,
        provider_name: row
            .try_get("provider_name")
            .map_err(|e| decode_error(context, e))?,
    })
}

/// Maps one row of the grouped visit-summary query
///
/// Count columns stay `Option<i64>`; normalization to zero belongs to the
/// reconciler.
pub fn aggregate_from_row(row: &Row) -> Result<VisitAggregate, DatabaseError> {
    let context = "visit_aggregates";
    Ok(VisitAggregate {
        patient_id: PatientId::new(
            row.try_get("patient_id")
                .map_err(|e| decode_error(context, e))?,
        ),
        total_visits: row
            .try_get("total_visits")
            .map_err(|e| decode_error(context, e))?,
        total_prescriptions: row
            .try_get("total_prescriptions")
            .map_err(|e| decode_error(context, e))?,
        total_lab_tests: row
            .try_get("total_lab_tests")
            .map_err(|e| decode_error(context, e))?,
        first_visit: row
            .try_get("first_visit")
            .map_err(|e| decode_error(context, e))?,
        last_visit: row
            .try_get("last_visit")
            .map_err(|e| decode_error(context, e))?,
    })
}
