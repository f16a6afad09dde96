//! Patient reconciliation
//!
//! Merges the API-sourced patient collection with the database-sourced
//! activity aggregates into one summary per patient. The API is
//! authoritative for patient existence: every patient record yields exactly
//! one summary, and aggregates without a matching patient are discarded.

pub mod stats;

pub use stats::{summarize, CohortStats};

use crate::domain::{PatientRecord, PatientSummary, VisitAggregate};
use std::collections::HashMap;

/// Left-join patients with their activity aggregates
///
/// Patients without an aggregate entry get zero counts; NULL counts coming
/// out of the grouped SQL normalize to zero here. The output order follows
/// the input patient order and the output length always equals the input
/// patient count.
///
/// # Examples
///
/// ```
/// use meridian::core::reconcile::merge;
///
/// let summaries = merge(Vec::new(), Vec::new());
/// assert!(summaries.is_empty());
/// ```
pub fn merge(
    patients: Vec<PatientRecord>,
    aggregates: Vec<VisitAggregate>,
) -> Vec<PatientSummary> {
    // The grouped query keys aggregates by patient, so collisions cannot
    // occur; if one slipped through, the later row wins.
    let by_patient: HashMap<_, _> = aggregates
        .into_iter()
        .map(|aggregate| (aggregate.patient_id, aggregate))
        .collect();

    patients
        .into_iter()
        .map(|record| match by_patient.get(&record.patient_id) {
            Some(aggregate) => PatientSummary::from_parts(record, aggregate),
            None => {
                let zero = VisitAggregate::zero(record.patient_id);
                PatientSummary::from_parts(record, &zero)
            }
        })
        .collect()
}
