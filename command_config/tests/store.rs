use command_config::{CommandConfigStore, ConfigStoreError};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

async fn open_store(dir: &TempDir) -> CommandConfigStore {
    CommandConfigStore::open(
        dir.path().join("command_config.json"),
        dir.path().join("backups"),
    )
    .await
    .expect("store opens")
}

fn commands(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

async fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&tokio::fs::read(path).await.unwrap()).unwrap()
}

#[tokio::test]
async fn open_creates_empty_config_and_backup_dir() {
    let dir = TempDir::new().unwrap();
    let store = CommandConfigStore::open(
        dir.path().join("command_config.json"),
        dir.path().join("nested/backups"),
    )
    .await
    .unwrap();

    assert_eq!(read_json(store.config_path()).await, json!({"guilds": {}}));
    assert!(store.backup_dir().is_dir());

    // Re-opening keeps existing content.
    store
        .update_commands_for_guild("1", commands(&["ping"]))
        .await
        .unwrap();
    let reopened = CommandConfigStore::open(store.config_path(), store.backup_dir())
        .await
        .unwrap();
    assert_eq!(
        reopened.commands_for_guild("1").await.unwrap(),
        commands(&["ping"])
    );
}

#[tokio::test]
async fn unknown_guild_has_empty_allow_list() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    assert!(store.commands_for_guild("987654321").await.unwrap().is_empty());
    assert!(store.commands_for_guild("not-a-guild").await.unwrap().is_empty());
}

#[tokio::test]
async fn update_then_get_preserves_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let cmds = commands(&["stats", "ping", "help"]);

    store
        .update_commands_for_guild("111", cmds.clone())
        .await
        .unwrap();

    assert_eq!(store.commands_for_guild("111").await.unwrap(), cmds);
}

#[tokio::test]
async fn duplicate_names_are_kept_as_given() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let cmds = commands(&["ping", "ping"]);

    store
        .update_commands_for_guild("111", cmds.clone())
        .await
        .unwrap();

    assert_eq!(store.commands_for_guild("111").await.unwrap(), cmds);
}

#[tokio::test]
async fn invalid_arguments_are_rejected_without_backup() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let err = store
        .update_commands_for_guild("abc", commands(&["ping"]))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigStoreError::InvalidArgument(_)));

    for guild in ["0", "000"] {
        let err = store
            .update_commands_for_guild(guild, commands(&["ping"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigStoreError::InvalidArgument(_)));
    }

    let err = store
        .update_commands_for_guild("111", commands(&["ping", "  "]))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigStoreError::InvalidArgument(_)));

    assert!(store.list_backups().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    tokio::fs::write(store.config_path(), "{ not json").await.unwrap();

    assert!(matches!(
        store.get_all().await,
        Err(ConfigStoreError::Corrupt { .. })
    ));
    assert!(matches!(
        store.update_commands_for_guild("1", commands(&["ping"])).await,
        Err(ConfigStoreError::Corrupt { .. })
    ));
    // The backup attempt failed quietly.
    assert!(store.backup().await.is_none());
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    tokio::fs::remove_file(store.config_path()).await.unwrap();

    assert!(matches!(
        store.get_all().await,
        Err(ConfigStoreError::Io { .. })
    ));
}

#[tokio::test]
async fn each_update_writes_one_pre_mutation_backup() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store
        .update_commands_for_guild("111", commands(&["ping"]))
        .await
        .unwrap();
    store
        .update_commands_for_guild("111", commands(&["ping", "stats"]))
        .await
        .unwrap();

    let backups = store.list_backups().await.unwrap();
    assert_eq!(backups.len(), 2);
    assert_eq!(read_json(&backups[0]).await, json!({"guilds": {}}));
    assert_eq!(
        read_json(&backups[1]).await,
        json!({"guilds": {"111": ["ping"]}})
    );
}

#[tokio::test]
async fn restore_brings_back_backed_up_guilds() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store
        .update_commands_for_guild("111", commands(&["ping"]))
        .await
        .unwrap();
    let snapshot = store.get_all().await.unwrap();

    let backup = store.backup().await.expect("backup written");
    store
        .update_commands_for_guild("111", commands(&["stats"]))
        .await
        .unwrap();
    store
        .update_commands_for_guild("222", commands(&["help"]))
        .await
        .unwrap();

    assert!(store.restore(&backup).await.unwrap());
    assert_eq!(store.get_all().await.unwrap().guilds, snapshot.guilds);
}

#[tokio::test]
async fn restore_rejects_snapshot_without_guilds() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    store
        .update_commands_for_guild("111", commands(&["ping"]))
        .await
        .unwrap();
    let before = tokio::fs::read(store.config_path()).await.unwrap();

    let bad = dir.path().join("bad.json");
    tokio::fs::write(&bad, r#"{"servers": {}}"#).await.unwrap();
    assert!(!store.restore(&bad).await.unwrap());

    let garbage = dir.path().join("garbage.json");
    tokio::fs::write(&garbage, "][").await.unwrap();
    assert!(!store.restore(&garbage).await.unwrap());

    assert_eq!(tokio::fs::read(store.config_path()).await.unwrap(), before);
}

#[tokio::test]
async fn restore_of_missing_backup_fails_fast() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let err = store
        .restore(&dir.path().join("nope.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigStoreError::BackupNotFound(_)));
}

#[tokio::test]
async fn unknown_top_level_keys_survive_updates() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    tokio::fs::write(
        store.config_path(),
        r#"{"guilds": {}, "schema": 2, "notes": ["keep"]}"#,
    )
    .await
    .unwrap();

    store
        .update_commands_for_guild("111", commands(&["ping"]))
        .await
        .unwrap();

    assert_eq!(
        read_json(store.config_path()).await,
        json!({"guilds": {"111": ["ping"]}, "schema": 2, "notes": ["keep"]})
    );
}

/// Without the store's write lock the read-modify-write cycles below would
/// race and the last writer would drop the other guild.
#[tokio::test]
async fn concurrent_updates_for_different_guilds_are_not_lost() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let (a, b) = tokio::join!(
        store.update_commands_for_guild("111", commands(&["ping"])),
        store.update_commands_for_guild("222", commands(&["stats"])),
    );
    a.unwrap();
    b.unwrap();

    let config = store.get_all().await.unwrap();
    assert_eq!(config.commands_for("111"), commands(&["ping"]).as_slice());
    assert_eq!(config.commands_for("222"), commands(&["stats"]).as_slice());
    assert_eq!(store.list_backups().await.unwrap().len(), 2);
}
