//! 通过注册表和 memory 驱动对轮询存储器做端到端测试

use appconf::storage::{
    register_drivers, Data, MemoryDriver, Registry, StorageError, MEMORY_DRIVER, REDIS_DRIVER,
};
use appconf::{Logger, TypeOptions};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn logger() -> Arc<Logger> {
    Arc::new(Logger::default())
}

// ============================================================================
// 注册表
// ============================================================================

#[test]
fn test_builtin_drivers_listed() {
    let registry = Registry::new();
    register_drivers(&registry);

    let mut names = registry.list();
    names.sort();
    assert_eq!(names, vec![MEMORY_DRIVER.to_string(), REDIS_DRIVER.to_string()]);
}

#[tokio::test]
async fn test_unknown_driver() {
    let registry = Registry::new();
    register_drivers(&registry);

    let err = registry
        .new_storage("unknown-driver", logger(), json!({}))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, StorageError::DriverNotFound(_)));
    assert!(err.to_string().contains("unknown-driver"));
}

// ============================================================================
// 轮询
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_poll_scenario() {
    let driver = MemoryDriver::new();
    driver.set("a", "1");

    let registry = Registry::new();
    registry.register(MEMORY_DRIVER, driver.clone());

    let storage = registry
        .new_storage(MEMORY_DRIVER, logger(), json!({"interval": 1, "buff_size": 2}))
        .await
        .unwrap();
    let mut rx = storage.get(vec!["a".to_string(), "b".to_string()]).unwrap();

    // 第一批在第一个间隔之前到达
    assert_eq!(rx.recv().await.unwrap(), vec![Data::new("a", "1")]);

    driver.set("a", "2");
    driver.set("b", "3");
    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(
        rx.recv().await.unwrap(),
        vec![Data::new("a", "2"), Data::new("b", "3")]
    );

    storage.stop().await.unwrap();
    assert!(rx.recv().await.is_none());

    // 第二次 stop 立即返回
    storage.stop().await.unwrap();
    assert!(matches!(
        storage.get(vec!["a".to_string()]),
        Err(StorageError::Stopped)
    ));
}

#[tokio::test]
async fn test_new_from_type_options_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.yaml");
    std::fs::write(
        &path,
        r#"
type: memory
options:
  interval: 60
  data:
    app/port: "8080"
"#,
    )
    .unwrap();

    let registry = Registry::new();
    register_drivers(&registry);

    let options = TypeOptions::from_file(&path).unwrap();
    let storage = registry
        .new_from_type_options(logger(), &options)
        .await
        .unwrap();

    let mut rx = storage
        .get(vec!["app/port".to_string(), "app/host".to_string()])
        .unwrap();
    assert_eq!(rx.recv().await.unwrap(), vec![Data::new("app/port", "8080")]);

    storage.stop().await.unwrap();
    while rx.recv().await.is_some() {}
}
