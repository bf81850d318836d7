// ==========================================
// 配置管理器集成测试
// ==========================================
// 测试目标: 学校作用域覆写全局, 默认值与容错
// ==========================================


use school_timetable::config::{config_keys, ConfigManager, ConfigScope, TimetableConfigReader};
use std::time::Duration;

const SCHOOL: &str = "school-001";

fn manager() -> (tempfile::NamedTempFile, ConfigManager) {
    let (temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let config = ConfigManager::new(&db_path).unwrap();
    (temp_file, config)
}

#[tokio::test]
async fn test_school_scope_overrides_global() {
    let (_tmp, config) = manager();
    config
        .set_config(&ConfigScope::Global, config_keys::MAX_CLASSES_PER_TEACHER, "5")
        .unwrap();
    config
        .set_config(&ConfigScope::school(SCHOOL), config_keys::MAX_CLASSES_PER_TEACHER, "4")
        .unwrap();

    assert_eq!(config.get_max_classes_per_teacher(SCHOOL).await.unwrap(), 4);
    assert_eq!(config.get_max_classes_per_teacher("other").await.unwrap(), 5);

    assert!(config
        .remove_config(&ConfigScope::school(SCHOOL), config_keys::MAX_CLASSES_PER_TEACHER)
        .unwrap());
    assert_eq!(config.get_max_classes_per_teacher(SCHOOL).await.unwrap(), 5);
}

#[tokio::test]
async fn test_timeout_zero_disables_limit() {
    let (_tmp, config) = manager();
    config
        .set_config(&ConfigScope::Global, config_keys::ORACLE_TIMEOUT_SECS, "0")
        .unwrap();
    assert_eq!(config.get_oracle_timeout(SCHOOL).await.unwrap(), None);

    config
        .set_config(&ConfigScope::Global, config_keys::ORACLE_TIMEOUT_SECS, "30")
        .unwrap();
    assert_eq!(
        config.get_oracle_timeout(SCHOOL).await.unwrap(),
        Some(Duration::from_secs(30))
    );
}

#[tokio::test]
async fn test_max_retries_never_below_one() {
    let (_tmp, config) = manager();
    config
        .set_config(&ConfigScope::Global, config_keys::MAX_RETRIES, "0")
        .unwrap();
    assert_eq!(config.get_max_retries(SCHOOL).await.unwrap(), 1);
}

#[tokio::test]
async fn test_settings_snapshot() {
    let (_tmp, config) = manager();
    config
        .set_config(&ConfigScope::school(SCHOOL), config_keys::RETRY_FEEDBACK, "true")
        .unwrap();
    config
        .set_config(
            &ConfigScope::school(SCHOOL),
            config_keys::SPECIAL_INSTRUCTIONS,
            "No Math after recess",
        )
        .unwrap();

    let settings = config.load_generation_settings(SCHOOL).await.unwrap();
    assert!(settings.retry_feedback);
    assert_eq!(settings.special_instructions, "No Math after recess");
    assert_eq!(settings.max_retries, 3);

    let snapshot = config.get_config_snapshot(&ConfigScope::school(SCHOOL)).unwrap();
    assert_eq!(snapshot.len(), 2);
}
