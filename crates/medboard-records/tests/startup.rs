//! Startup from a project directory. Kept in its own test binary since it
//! loads `.env` files into the process environment and installs the global
//! subscriber.

use medboard_common_config::BackendMode;
use medboard_common_log::LogConfig;
use medboard_records::{bootstrap_from_env, NewPatient, PatientSeed, Priority};
use medboard_test_utils::{assert_err, assert_ok, temp_file};

fn seed() -> PatientSeed {
    PatientSeed {
        patient: NewPatient {
            name: "Kofi".to_string(),
            age: 44,
            gender: "male".to_string(),
            mrn: "MRN-KOFI".to_string(),
            reason: "Chest pain".to_string(),
            priority: Priority::Urgent,
            time: "08:30".to_string(),
            doctor: None,
            vitals: None,
            vitals_data: None,
        },
        vitals: vec![],
    }
}

#[tokio::test]
async fn test_bootstrap_from_project_dir() {
    assert_ok!(medboard_common_log::init(LogConfig::from_env()));

    // the file leaves seeding off; the .env file turns it on
    let (dir, _) = temp_file(
        ".medboard/config.yaml",
        "backend:\n  url: \"${MEDBOARD_TEST_STARTUP_URL:-}\"\nseed:\n  on_empty: false\n",
    );
    std::fs::write(dir.path().join(".env"), "MEDBOARD_SEED_ON_EMPTY=true\n").unwrap();

    let service = assert_ok!(bootstrap_from_env(dir.path(), &[seed()]).await);
    assert_eq!(service.backend().mode(), BackendMode::Mock);
    assert_eq!(assert_ok!(service.count_patients().await), 1);
    let patients = assert_ok!(service.fetch_patients().await);
    assert_eq!(patients[0].details.name, "Kofi");

    // remote credentials from the file are rejected at connect
    let (remote, _) = temp_file(
        ".medboard/config.yaml",
        "backend:\n  url: https://db.example.org\n  anon_key: anon\n",
    );
    let err = assert_err!(bootstrap_from_env(remote.path(), &[]).await.map(|_| ()));
    assert!(matches!(err, medboard_common_core::Error::Config(_)));

    // an invalid url fails config validation
    let (bad, _) = temp_file(".medboard/config.yaml", "backend:\n  url: ftp://nope\n");
    let err = assert_err!(bootstrap_from_env(bad.path(), &[]).await.map(|_| ()));
    assert!(err.to_string().contains("backend.url"));

    std::env::remove_var("MEDBOARD_SEED_ON_EMPTY");
}
