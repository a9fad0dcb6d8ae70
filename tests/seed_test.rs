//! End-to-end checks against a live, blank MongoDB endpoint configured via
//! `.env` (`MONGODB_URI`, `ADMIN_USERNAME`, `ADMIN_PASSWORD`, ...).
//!
//! Run with: cargo test --test seed_test -- --ignored --test-threads=1

use inventory_seed::services::verify;
use inventory_seed::{FailureKind, SeedConfig, SeedMode, SeedStage, SeedStep, Seeder};

fn load_config() -> SeedConfig {
    SeedConfig::from_env().expect("seed configuration must be available")
}

#[tokio::test]
#[ignore = "requires a blank MongoDB endpoint"]
async fn test_seed_lifecycle() {
    let config = load_config();

    // First run against a pristine endpoint
    let report = Seeder::new(SeedConfig { mode: SeedMode::Strict, ..config.clone() })
        .run()
        .await
        .unwrap();

    assert_eq!(report.stage, SeedStage::Done);
    assert!(report.skipped.is_empty());
    assert_eq!(report.collections.len(), 2);
    for collection in &report.collections {
        assert_eq!(collection.inserted, 5, "{}", collection.name);
        assert_eq!(collection.total, 5, "{}", collection.name);
    }

    let verification = verify::verify(&config).await.unwrap();
    let failures: Vec<_> = verification.failures().collect();
    assert!(failures.is_empty(), "failed checks: {:?}", failures);
    assert!(verification.passed());

    // Strict re-run stops at replica set initiation
    let err = Seeder::new(SeedConfig { mode: SeedMode::Strict, ..config.clone() })
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.failed_step(), Some(SeedStep::InitiateReplicaSet));
    assert_eq!(err.kind(), FailureKind::AlreadyExists);

    // Idempotent re-run skips everything and duplicates nothing
    let report = Seeder::new(SeedConfig { mode: SeedMode::Idempotent, ..config.clone() })
        .run()
        .await
        .unwrap();

    assert_eq!(report.stage, SeedStage::Done);
    assert!(report.skipped.contains(&SeedStep::InitiateReplicaSet));
    assert!(report.skipped.contains(&SeedStep::CreateAdminUser));
    assert!(report.skipped.contains(&SeedStep::CreateCollections));
    assert!(report.skipped.contains(&SeedStep::InsertSamples));
    for collection in &report.collections {
        assert_eq!(collection.inserted, 0, "{}", collection.name);
        assert_eq!(collection.total, 5, "{}", collection.name);
    }

    assert!(verify::verify(&config).await.unwrap().passed());
}

#[tokio::test]
#[ignore = "requires a MongoDB endpoint"]
async fn test_verify_rejects_wrong_password() {
    let config = SeedConfig {
        admin_password: "definitely-not-the-password".to_string(),
        ..load_config()
    };

    let report = verify::verify(&config).await.unwrap();

    assert!(!report.passed());
    assert_eq!(report.checks.len(), 1);
    assert_eq!(report.checks[0].name, "authentication");
}
