//! Integration tests for the reconciliation core

use chrono::NaiveDate;
use fake::faker::name::en::Name;
use fake::Fake;
use meridian::core::reconcile::{merge, summarize};
use meridian::domain::{InsuranceId, PatientId, PatientRecord, VisitAggregate};
use test_case::test_case;

fn patient(id: i64, name: &str, dob: NaiveDate, insurance: Option<&str>) -> PatientRecord {
    PatientRecord::new(
        PatientId::new(id),
        name,
        dob,
        insurance.map(|i| InsuranceId::new(i).unwrap()),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_two_patient_scenario() {
    // Patient 1001 has recorded activity, patient 1002 has none.
    let patients = vec![
        patient(1001, "Alice", date(1980, 1, 1), Some("INS001")),
        patient(1002, "Bob", date(1975, 5, 5), None),
    ];
    let aggregates = vec![VisitAggregate {
        patient_id: PatientId::new(1001),
        total_visits: Some(3),
        total_prescriptions: Some(2),
        total_lab_tests: Some(1),
        first_visit: Some(date(2024, 2, 1)),
        last_visit: Some(date(2024, 10, 20)),
    }];

    let summaries = merge(patients, aggregates);

    assert_eq!(summaries.len(), 2);

    let alice = &summaries[0];
    assert_eq!(alice.patient_id, PatientId::new(1001));
    assert_eq!(alice.total_visits, 3);
    assert_eq!(alice.total_prescriptions, 2);
    assert_eq!(alice.total_lab_tests, 1);

    let bob = &summaries[1];
    assert_eq!(bob.patient_id, PatientId::new(1002));
    assert_eq!(bob.total_visits, 0);
    assert_eq!(bob.total_prescriptions, 0);
    assert_eq!(bob.total_lab_tests, 0);
    assert!(bob.insurance_id.is_none());
}

#[test_case(0, 0 ; "no patients, no aggregates")]
#[test_case(5, 0 ; "patients without aggregates")]
#[test_case(5, 3 ; "partial aggregate coverage")]
#[test_case(5, 5 ; "full aggregate coverage")]
fn test_output_length_equals_patient_count(patient_count: i64, aggregate_count: i64) {
    let patients: Vec<PatientRecord> = (0..patient_count)
        .map(|i| patient(1000 + i, "Patient", date(1985, 6, 1), None))
        .collect();
    let aggregates: Vec<VisitAggregate> = (0..aggregate_count)
        .map(|i| VisitAggregate {
            patient_id: PatientId::new(1000 + i),
            total_visits: Some(i + 1),
            total_prescriptions: Some(i),
            total_lab_tests: Some(0),
            first_visit: None,
            last_visit: None,
        })
        .collect();

    let summaries = merge(patients, aggregates);
    assert_eq!(summaries.len(), patient_count as usize);
}

#[test]
fn test_counts_are_never_null_or_negative() {
    let patients: Vec<PatientRecord> = (0..20)
        .map(|i| {
            let name: String = Name().fake();
            patient(2000 + i, &name, date(1970, 1, 1), None)
        })
        .collect();
    // Half the aggregates carry NULL counts, as the grouped SQL may.
    let aggregates: Vec<VisitAggregate> = (0..10)
        .map(|i| VisitAggregate {
            patient_id: PatientId::new(2000 + i * 2),
            total_visits: if i % 2 == 0 { Some(i) } else { None },
            total_prescriptions: None,
            total_lab_tests: Some(-3),
            first_visit: None,
            last_visit: None,
        })
        .collect();

    let summaries = merge(patients, aggregates);

    assert_eq!(summaries.len(), 20);
    // u64 count fields: nothing to assert beyond presence, the type rules
    // out null and negative values. Spot-check the normalization anyway.
    for summary in &summaries {
        assert!(summary.total_visits < 1000);
        assert_eq!(summary.total_lab_tests, 0);
    }
}

#[test]
fn test_aggregate_only_patients_are_excluded() {
    let patients = vec![patient(1001, "Alice", date(1980, 1, 1), None)];
    let aggregates = vec![
        VisitAggregate {
            patient_id: PatientId::new(4242),
            total_visits: Some(9),
            total_prescriptions: Some(9),
            total_lab_tests: Some(9),
            first_visit: None,
            last_visit: None,
        },
        VisitAggregate::zero(PatientId::new(1001)),
    ];

    let summaries = merge(patients, aggregates);

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].patient_id, PatientId::new(1001));
}

#[test]
fn test_summarize_empty_cohort_is_no_data() {
    assert!(summarize(&[]).is_none());
}

#[test]
fn test_summarize_after_merge() {
    let patients = vec![
        patient(1001, "Alice", date(1980, 1, 1), Some("INS001")),
        patient(1002, "Bob", date(1975, 5, 5), None),
    ];
    let aggregates = vec![VisitAggregate {
        patient_id: PatientId::new(1001),
        total_visits: Some(4),
        total_prescriptions: Some(2),
        total_lab_tests: Some(0),
        first_visit: None,
        last_visit: None,
    }];

    let summaries = merge(patients, aggregates);
    let stats = summarize(&summaries).unwrap();

    assert_eq!(stats.patients_with_visits, 1);
    assert!((stats.avg_visits - 2.0).abs() < f64::EPSILON);
    assert!((stats.avg_prescriptions - 1.0).abs() < f64::EPSILON);
}
