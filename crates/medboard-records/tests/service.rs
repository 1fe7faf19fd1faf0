use medboard_common_config::{BackendMode, MedboardConfig};
use medboard_records::{
    bootstrap, Backend, MockBackend, NewPatient, PatientSeed, PatientService, PatientUpdate,
    Priority, RecordsError, Vitals, VitalsDataPoint, PATIENTS_TABLE,
};
use medboard_test_utils::{assert_err, assert_ok, record};
use serde_json::json;
use std::sync::Arc;

fn new_patient(name: &str, priority: Priority) -> NewPatient {
    NewPatient {
        name: name.to_string(),
        age: 58,
        gender: "male".to_string(),
        mrn: format!("MRN-{}", name.to_uppercase()),
        reason: "Shortness of breath".to_string(),
        priority,
        time: "10:15".to_string(),
        doctor: None,
        vitals: Some(Vitals {
            bp: Some("128/82".to_string()),
            hr: Some(96),
            temp: Some(37.2),
            spo2: Some(94),
        }),
        vitals_data: None,
    }
}

fn point(time: &str, hr: f64) -> VitalsDataPoint {
    VitalsDataPoint {
        time: time.to_string(),
        heart_rate: Some(hr),
        ..Default::default()
    }
}

fn service() -> (MockBackend, PatientService<MockBackend>) {
    let backend = MockBackend::default();
    let service = PatientService::new(Arc::new(backend.clone()));
    (backend, service)
}

#[tokio::test]
async fn test_add_then_fetch_by_id() {
    let (_, service) = service();

    let added = assert_ok!(service.add_patient(&new_patient("kofi", Priority::High)).await);
    assert_eq!(added.id, 1);
    assert!(added.created_at.is_some());
    assert_eq!(added.details.name, "kofi");

    let fetched = assert_ok!(service.fetch_patient_by_id(1).await);
    assert_eq!(fetched, Some(added));
}

#[tokio::test]
async fn test_fetch_missing_patient_is_none() {
    let (_, service) = service();
    assert_eq!(assert_ok!(service.fetch_patient_by_id(42).await), None);
    assert!(assert_ok!(service.fetch_patients().await).is_empty());
}

#[tokio::test]
async fn test_fetch_patients_newest_first() {
    let (backend, service) = service();
    let mut older = record(serde_json::to_value(new_patient("older", Priority::Low)).unwrap());
    older.insert("created_at".into(), json!("2024-03-01T08:00:00.000Z"));
    let mut newer = record(serde_json::to_value(new_patient("newer", Priority::Urgent)).unwrap());
    newer.insert("created_at".into(), json!("2024-03-01T09:00:00.000Z"));
    backend.insert_many(PATIENTS_TABLE, vec![older, newer]).await;

    let names: Vec<String> = assert_ok!(service.fetch_patients().await)
        .into_iter()
        .map(|p| p.details.name)
        .collect();
    assert_eq!(names, vec!["newer", "older"]);
}

#[tokio::test]
async fn test_update_patient_merges() {
    let (_, service) = service();
    let added = assert_ok!(service.add_patient(&new_patient("ama", Priority::Normal)).await);

    let update = PatientUpdate {
        priority: Some(Priority::Urgent),
        doctor: Some("Dr. Mensah".to_string()),
        ..Default::default()
    };
    let updated = assert_ok!(service.update_patient(added.id, &update).await);
    assert_eq!(updated.details.priority, Priority::Urgent);
    assert_eq!(updated.details.doctor.as_deref(), Some("Dr. Mensah"));
    assert_eq!(updated.details.name, "ama");
    assert_eq!(updated.details.vitals, added.details.vitals);
    assert_eq!(updated.created_at, added.created_at);

    let refetched = assert_ok!(service.fetch_patient_by_id(added.id).await);
    assert_eq!(refetched, Some(updated));
}

#[tokio::test]
async fn test_update_errors_are_distinct() {
    let (_, service) = service();
    let update = PatientUpdate {
        age: Some(60),
        ..Default::default()
    };

    let err = assert_err!(service.update_patient(1, &update).await);
    assert!(matches!(err, RecordsError::Backend { .. }));
    assert_eq!(err.user_message(), "table not found: patients");

    assert_ok!(service.add_patient(&new_patient("yaw", Priority::Low)).await);
    let err = assert_err!(service.update_patient(9, &update).await);
    assert_eq!(err.user_message(), "record not found in patients");
}

#[tokio::test]
async fn test_seed_if_empty_runs_once() {
    let (backend, service) = service();
    let samples = vec![
        PatientSeed {
            patient: new_patient("esi", Priority::Urgent),
            vitals: vec![point("09:00", 110.0), point("08:00", 104.0)],
        },
        PatientSeed {
            patient: new_patient("kwame", Priority::Normal),
            vitals: vec![point("08:30", 72.0)],
        },
    ];

    assert!(assert_ok!(service.seed_if_empty(&samples).await));
    assert_eq!(assert_ok!(service.count_patients().await), 2);

    let vitals = assert_ok!(service.fetch_vitals_data(1).await);
    let times: Vec<&str> = vitals.iter().map(|v| v.time.as_str()).collect();
    assert_eq!(times, vec!["08:00", "09:00"]);
    assert!(vitals.iter().all(|v| v.patient_id == Some(1)));
    assert_eq!(assert_ok!(service.fetch_vitals_data(2).await).len(), 1);

    // second run is a no-op
    assert!(!assert_ok!(service.seed_if_empty(&samples).await));
    assert_eq!(backend.count(PATIENTS_TABLE).await.count, 2);
}

#[tokio::test]
async fn test_seed_with_no_samples_reports_nothing_written() {
    let (backend, service) = service();
    assert!(!assert_ok!(service.seed_if_empty(&[]).await));
    assert_eq!(backend.count(PATIENTS_TABLE).await.count, 0);
    assert!(backend.store().tables().await.is_empty());
}

#[tokio::test]
async fn test_decode_failure_surfaces() {
    let (backend, service) = service();
    backend
        .insert_one(PATIENTS_TABLE, record(json!({"name": "incomplete"})))
        .await;
    let err = assert_err!(service.fetch_patient_by_id(1).await);
    assert!(matches!(err, RecordsError::Decode(_)));
}

#[tokio::test]
async fn test_bootstrap_with_default_config_seeds_when_enabled() {
    let mut config = MedboardConfig::default();
    config.seed.on_empty = true;
    let samples = vec![PatientSeed {
        patient: new_patient("abena", Priority::High),
        vitals: vec![],
    }];

    let service = assert_ok!(bootstrap(&config, &samples).await);
    assert_eq!(service.backend().mode(), BackendMode::Mock);
    assert_eq!(assert_ok!(service.count_patients().await), 1);

    config.seed.on_empty = false;
    let service = assert_ok!(bootstrap(&config, &samples).await);
    assert_eq!(assert_ok!(service.count_patients().await), 0);
}

#[tokio::test]
async fn test_bootstrap_rejects_remote_credentials() {
    let mut config = MedboardConfig::default();
    config.backend.url = "https://db.example.org".to_string();
    config.backend.anon_key = "anon".to_string();

    let err = assert_err!(bootstrap(&config, &[]).await.map(|_| ()));
    assert!(matches!(err, medboard_common_core::Error::Config(_)));
}
