// ==========================================
// 学校课表排课系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 作用域: school/<school_id> 覆写 global
// ==========================================

use crate::config::timetable_config_trait::{ConfigResult, TimetableConfigReader};
use crate::db::open_sqlite_connection;
use crate::engine::orchestrator::{DEFAULT_MAX_CLASSES_PER_TEACHER, DEFAULT_MAX_RETRIES};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 默认生成器调用时限（秒）
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 120;

// ==========================================
// ConfigScope - 配置作用域
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigScope {
    Global,                          // 全局
    School { school_id: String },    // 学校
}

impl ConfigScope {
    pub fn school(school_id: &str) -> Self {
        ConfigScope::School {
            school_id: school_id.to_string(),
        }
    }

    /// config_kv.scope_id
    pub fn scope_id(&self) -> String {
        match self {
            ConfigScope::Global => "global".to_string(),
            ConfigScope::School { school_id } => format!("school/{}", school_id),
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取单个作用域的配置值
    fn get_scoped_value(&self, scope: &ConfigScope, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![scope.scope_id(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取学校生效的配置值（学校作用域优先, 否则全局）
    pub fn get_effective_value(&self, school_id: &str, key: &str) -> ConfigResult<Option<String>> {
        if let Some(value) = self.get_scoped_value(&ConfigScope::school(school_id), key)? {
            return Ok(Some(value));
        }
        self.get_scoped_value(&ConfigScope::Global, key)
    }

    /// 写入配置值（UPSERT）
    pub fn set_config(&self, scope: &ConfigScope, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![scope.scope_id(), key, value],
        )?;
        Ok(())
    }

    /// 删除配置值
    pub fn remove_config(&self, scope: &ConfigScope, key: &str) -> ConfigResult<bool> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![scope.scope_id(), key],
        )?;
        Ok(affected > 0)
    }

    /// 获取作用域下全部配置（按键排序）
    pub fn get_config_snapshot(&self, scope: &ConfigScope) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let rows = stmt.query_map(params![scope.scope_id()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取并解析配置值, 格式错误时告警并使用默认值
    fn get_parsed_or_default<T>(&self, school_id: &str, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        let Some(raw) = self.get_effective_value(school_id, key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    school_id = %school_id,
                    raw_value = %raw,
                    default = %default,
                    "配置值格式错误, 使用默认值"
                );
                Ok(default)
            }
        }
    }
}

#[async_trait]
impl TimetableConfigReader for ConfigManager {
    async fn get_max_classes_per_teacher(&self, school_id: &str) -> ConfigResult<u32> {
        self.get_parsed_or_default(
            school_id,
            config_keys::MAX_CLASSES_PER_TEACHER,
            DEFAULT_MAX_CLASSES_PER_TEACHER,
        )
    }

    async fn get_max_retries(&self, school_id: &str) -> ConfigResult<u32> {
        let value = self.get_parsed_or_default(school_id, config_keys::MAX_RETRIES, DEFAULT_MAX_RETRIES)?;
        Ok(value.max(1))
    }

    async fn get_oracle_timeout(&self, school_id: &str) -> ConfigResult<Option<Duration>> {
        let secs = self.get_parsed_or_default(
            school_id,
            config_keys::ORACLE_TIMEOUT_SECS,
            DEFAULT_ORACLE_TIMEOUT_SECS,
        )?;
        Ok((secs > 0).then(|| Duration::from_secs(secs)))
    }

    async fn get_retry_feedback(&self, school_id: &str) -> ConfigResult<bool> {
        self.get_parsed_or_default(school_id, config_keys::RETRY_FEEDBACK, false)
    }

    async fn get_special_instructions(&self, school_id: &str) -> ConfigResult<String> {
        Ok(self
            .get_effective_value(school_id, config_keys::SPECIAL_INSTRUCTIONS)?
            .unwrap_or_default())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 冲突校验
    pub const MAX_CLASSES_PER_TEACHER: &str = "max_classes_per_teacher";

    // 生成控制环
    pub const MAX_RETRIES: &str = "max_retries";
    pub const ORACLE_TIMEOUT_SECS: &str = "oracle_timeout_secs";
    pub const RETRY_FEEDBACK: &str = "retry_feedback";

    // 生成请求
    pub const SPECIAL_INSTRUCTIONS: &str = "special_instructions";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_scope_ids() {
        assert_eq!(ConfigScope::Global.scope_id(), "global");
        assert_eq!(ConfigScope::school("s1").scope_id(), "school/s1");
    }

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let config = manager();
        let settings = config.load_generation_settings("s1").await.unwrap();

        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.max_classes_per_teacher, 6);
        assert_eq!(settings.oracle_timeout, Some(Duration::from_secs(120)));
        assert!(!settings.retry_feedback);
        assert!(settings.special_instructions.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_value_falls_back_to_default() {
        let config = manager();
        config
            .set_config(&ConfigScope::Global, config_keys::MAX_CLASSES_PER_TEACHER, "six")
            .unwrap();

        assert_eq!(config.get_max_classes_per_teacher("s1").await.unwrap(), 6);
    }
}
