// ==========================================
// 学校课表排课系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表语句集中维护（幂等）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 默认数据库文件名
pub const DEFAULT_DB_FILE: &str = "school_timetable.db";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化 schema（所有表均为 IF NOT EXISTS）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS school_class (
            school_id TEXT NOT NULL,
            class_name TEXT NOT NULL,
            display_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (school_id, class_name)
        );

        CREATE TABLE IF NOT EXISTS teacher (
            teacher_id TEXT PRIMARY KEY,
            school_id TEXT NOT NULL,
            name TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            subjects_json TEXT NOT NULL DEFAULT '[]',
            classes_json TEXT NOT NULL DEFAULT '[]',
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_teacher_school ON teacher (school_id);

        CREATE TABLE IF NOT EXISTS day_rule (
            school_id TEXT NOT NULL,
            rule_id TEXT NOT NULL,
            seq_no INTEGER NOT NULL,
            start_time TEXT NOT NULL,
            recess_count INTEGER NOT NULL DEFAULT 0,
            s1_periods INTEGER NOT NULL,
            s1_duration INTEGER NOT NULL,
            first_recess_duration INTEGER NOT NULL DEFAULT 0,
            s2_periods INTEGER NOT NULL DEFAULT 0,
            s2_duration INTEGER NOT NULL DEFAULT 0,
            second_recess_duration INTEGER NOT NULL DEFAULT 0,
            s3_periods INTEGER NOT NULL DEFAULT 0,
            s3_duration INTEGER NOT NULL DEFAULT 0,
            days TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (school_id, rule_id)
        );

        CREATE TABLE IF NOT EXISTS class_routine_set (
            school_id TEXT PRIMARY KEY,
            revision INTEGER NOT NULL,
            routines_json TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 默认数据库路径（本地数据目录, 不可用时使用当前目录）
pub fn get_default_db_path() -> String {
    let dir = dirs::data_local_dir()
        .map(|d| d.join("school-timetable"))
        .unwrap_or_else(|| PathBuf::from("."));
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "无法创建数据目录, 使用当前目录");
        return DEFAULT_DB_FILE.to_string();
    }
    dir.join(DEFAULT_DB_FILE).to_string_lossy().to_string()
}
