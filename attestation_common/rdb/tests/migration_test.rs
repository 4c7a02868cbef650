use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use rdb::{connect, DbConfig, Migrator};

async fn setup_verifier_db() -> DatabaseConnection {
    let db = connect(&DbConfig::new("sqlite", "sqlite::memory:")).await.unwrap();
    for sql in [
        "CREATE TABLE verifiermain (agent_id VARCHAR(80) NOT NULL PRIMARY KEY, mb_refstate TEXT)",
        "INSERT INTO verifiermain (agent_id, mb_refstate) VALUES \
         ('d432fbb3-d2f1-4a97-9ef7-75bd81c00000', 'package mb\ndefault allow = false')",
        "INSERT INTO verifiermain (agent_id, mb_refstate) VALUES ('a6e3f2c1-0000-4000-8000-000000000001', NULL)",
    ] {
        exec(&db, sql).await;
    }
    db
}

async fn exec(db: &DatabaseConnection, sql: &str) {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_string()))
        .await
        .unwrap();
}

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS cnt FROM {}", table),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "cnt").unwrap()
}

async fn inline_policies(db: &DatabaseConnection) -> Vec<(String, Option<String>)> {
    db.query_all(Statement::from_string(
        db.get_database_backend(),
        "SELECT agent_id, mb_refstate FROM verifiermain ORDER BY agent_id".to_string(),
    ))
    .await
    .unwrap()
    .iter()
    .map(|row| (row.try_get("", "agent_id").unwrap(), row.try_get("", "mb_refstate").unwrap()))
    .collect()
}

#[tokio::test]
async fn test_upgrade_moves_inline_policies_to_mbrefstates() {
    let db = setup_verifier_db().await;
    let migrator = Migrator::mb_refstates();

    let applied = migrator.upgrade(&db).await.unwrap();
    assert_eq!(applied, vec!["3be092cd2635", "2979e8d521bc"]);
    assert_eq!(migrator.current_revision(&db).await.unwrap(), Some("2979e8d521bc"));
    assert_eq!(count(&db, "mbrefstates").await, 2);

    let linked: Vec<(String, Option<String>)> = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "SELECT v.agent_id AS agent_id, m.mb_refstate AS mb_refstate FROM verifiermain v \
             JOIN mbrefstates m ON v.mb_refstate_id = m.id ORDER BY v.agent_id"
                .to_string(),
        ))
        .await
        .unwrap()
        .iter()
        .map(|row| (row.try_get("", "agent_id").unwrap(), row.try_get("", "mb_refstate").unwrap()))
        .collect();
    assert_eq!(
        linked,
        vec![
            ("a6e3f2c1-0000-4000-8000-000000000001".to_string(), None),
            (
                "d432fbb3-d2f1-4a97-9ef7-75bd81c00000".to_string(),
                Some("package mb\ndefault allow = false".to_string())
            ),
        ]
    );

    let inline = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            "SELECT mb_refstate FROM verifiermain".to_string(),
        ))
        .await;
    assert!(inline.is_err(), "inline column should be dropped");
}

#[tokio::test]
async fn test_upgrade_is_idempotent() {
    let db = setup_verifier_db().await;
    let migrator = Migrator::mb_refstates();

    migrator.upgrade(&db).await.unwrap();
    let second = migrator.upgrade(&db).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(count(&db, "mbrefstates").await, 2);
}

#[tokio::test]
async fn test_downgrade_restores_inline_policies() {
    let db = setup_verifier_db().await;
    let migrator = Migrator::mb_refstates();
    let before = inline_policies(&db).await;

    migrator.upgrade(&db).await.unwrap();
    let reverted = migrator.downgrade(&db, 1).await.unwrap();
    assert_eq!(reverted, vec!["2979e8d521bc"]);
    assert_eq!(inline_policies(&db).await, before);
    assert_eq!(count(&db, "mbrefstates").await, 0);
    assert_eq!(migrator.current_revision(&db).await.unwrap(), Some("3be092cd2635"));

    let reverted = migrator.downgrade(&db, 1).await.unwrap();
    assert_eq!(reverted, vec!["3be092cd2635"]);
    assert_eq!(migrator.current_revision(&db).await.unwrap(), None);
    assert!(migrator.downgrade(&db, 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_upgrade_reports_revision() {
    let db = connect(&DbConfig::new("sqlite", "sqlite::memory:")).await.unwrap();
    let migrator = Migrator::mb_refstates();

    // no verifiermain table: the second revision cannot run
    let err = migrator.upgrade(&db).await.unwrap_err();
    assert!(err.to_string().contains("2979e8d521bc"));
    assert_eq!(migrator.current_revision(&db).await.unwrap(), Some("3be092cd2635"));
}
