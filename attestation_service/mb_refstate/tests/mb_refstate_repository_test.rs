use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use mb_refstate::{policy_checksum, MbRefstateError, MbRefstateRepository};
use rdb::{connect, DbConfig, Migrator};

const POLICY: &str = "package keylime.mb\n\ndefault allow = false\n";

async fn setup_test_db() -> DatabaseConnection {
    let db = connect(&DbConfig::new("sqlite", "sqlite::memory:")).await.unwrap();
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE TABLE verifiermain (agent_id VARCHAR(80) NOT NULL PRIMARY KEY, mb_refstate TEXT)".to_string(),
    ))
    .await
    .unwrap();
    Migrator::mb_refstates().upgrade(&db).await.unwrap();
    db
}

#[test]
fn test_policy_checksum() {
    assert_eq!(
        policy_checksum(""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(policy_checksum(POLICY).len(), 64);
}

#[tokio::test]
async fn test_add_and_get_policy() {
    let db = setup_test_db().await;

    let stored = MbRefstateRepository::add(&db, "example", POLICY).await.unwrap();
    assert_eq!(stored.name, "example");
    assert_eq!(stored.checksum.as_deref(), Some(policy_checksum(POLICY).as_str()));

    let fetched = MbRefstateRepository::get_by_name(&db, "example").await.unwrap().unwrap();
    assert_eq!(fetched, stored);
    assert_eq!(fetched.mb_refstate.as_deref(), Some(POLICY));
}

#[tokio::test]
async fn test_get_missing_policy() {
    let db = setup_test_db().await;
    assert!(MbRefstateRepository::get_by_name(&db, "missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_add_rejects_invalid_policy() {
    let db = setup_test_db().await;

    let result = MbRefstateRepository::add(&db, "no_allow", "package mb\ndeny = true").await;
    assert!(matches!(result, Err(MbRefstateError::InvalidPolicy(_))));
    assert!(MbRefstateRepository::list(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_rejects_invalid_name() {
    let db = setup_test_db().await;

    assert!(matches!(MbRefstateRepository::add(&db, " ", POLICY).await, Err(MbRefstateError::InvalidName(_))));
    let long_name = "n".repeat(256);
    assert!(matches!(
        MbRefstateRepository::add(&db, &long_name, POLICY).await,
        Err(MbRefstateError::InvalidName(_))
    ));
}

#[tokio::test]
async fn test_add_rejects_duplicate_name() {
    let db = setup_test_db().await;
    MbRefstateRepository::add(&db, "example", POLICY).await.unwrap();

    let result = MbRefstateRepository::add(&db, "example", POLICY).await;
    assert_eq!(result, Err(MbRefstateError::AlreadyExists("example".to_string())));
}

#[tokio::test]
async fn test_update_recomputes_checksum() {
    let db = setup_test_db().await;
    let stored = MbRefstateRepository::add(&db, "example", POLICY).await.unwrap();

    let new_policy = "package keylime.mb\n\nallow = true\n";
    let updated = MbRefstateRepository::update(&db, "example", new_policy).await.unwrap();
    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.checksum, Some(policy_checksum(new_policy)));
    assert_ne!(updated.checksum, stored.checksum);
    assert_eq!(updated.mb_refstate.as_deref(), Some(new_policy));
}

#[tokio::test]
async fn test_update_missing_policy() {
    let db = setup_test_db().await;
    let result = MbRefstateRepository::update(&db, "missing", POLICY).await;
    assert_eq!(result, Err(MbRefstateError::NotFound("missing".to_string())));
}

#[tokio::test]
async fn test_delete_by_name() {
    let db = setup_test_db().await;
    MbRefstateRepository::add(&db, "first", POLICY).await.unwrap();
    MbRefstateRepository::add(&db, "second", POLICY).await.unwrap();

    MbRefstateRepository::delete_by_name(&db, "first").await.unwrap();
    let names: Vec<String> = MbRefstateRepository::list(&db).await.unwrap().into_iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["second".to_string()]);

    let result = MbRefstateRepository::delete_by_name(&db, "first").await;
    assert_eq!(result, Err(MbRefstateError::NotFound("first".to_string())));
}
