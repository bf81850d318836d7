// ==========================================
// 学校课表排课系统 - 班级课表仓储
// ==========================================
// 每所学校一份课表文档 + 修订号
// 保存规则:
// - expected_revision = None: 后写覆盖
// - expected_revision = Some(n): 修订号不一致则返回乐观锁冲突
// ==========================================

use crate::domain::routine::ClassRoutine;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// 已保存的课表文档
#[derive(Debug, Clone)]
pub struct StoredRoutineSet {
    pub school_id: String,
    /// 修订号（首次保存为 1）
    pub revision: i64,
    pub routines: Vec<ClassRoutine>,
    pub updated_at: DateTime<Utc>,
}

pub struct RoutineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RoutineRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取学校的课表文档
    pub fn find(&self, school_id: &str) -> RepositoryResult<Option<StoredRoutineSet>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT revision, routines_json, updated_at
                FROM class_routine_set WHERE school_id = ?1
                "#,
                params![school_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((revision, routines_json, updated_at)) = row else {
            return Ok(None);
        };

        let routines: Vec<ClassRoutine> = serde_json::from_str(&routines_json)?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::FieldValueError {
                field: "updated_at".to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(StoredRoutineSet {
            school_id: school_id.to_string(),
            revision,
            routines,
            updated_at,
        }))
    }

    /// 当前修订号（无文档时为 0）
    pub fn current_revision(&self, school_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let revision = conn
            .query_row(
                "SELECT revision FROM class_routine_set WHERE school_id = ?1",
                params![school_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(revision.unwrap_or(0))
    }

    /// 整体替换课表文档
    ///
    /// # 参数
    /// - school_id: 学校ID
    /// - routines: 全部班级课表
    /// - expected_revision: 乐观锁期望修订号（None 表示不检查）
    ///
    /// # 返回
    /// - Ok(i64): 新修订号
    /// - Err(OptimisticLockFailure): 期望修订号与当前不一致
    pub fn save(
        &self,
        school_id: &str,
        routines: &[ClassRoutine],
        expected_revision: Option<i64>,
    ) -> RepositoryResult<i64> {
        let routines_json = serde_json::to_string(routines)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let actual: i64 = tx
            .query_row(
                "SELECT revision FROM class_routine_set WHERE school_id = ?1",
                params![school_id],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0);

        if let Some(expected) = expected_revision {
            if expected != actual {
                warn!(school_id = %school_id, expected, actual, "课表修订号不一致, 拒绝保存");
                return Err(RepositoryError::OptimisticLockFailure {
                    school_id: school_id.to_string(),
                    expected,
                    actual,
                });
            }
        }

        let revision = actual + 1;
        tx.execute(
            r#"
            INSERT INTO class_routine_set (school_id, revision, routines_json, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(school_id) DO UPDATE SET
                revision = excluded.revision,
                routines_json = excluded.routines_json,
                updated_at = excluded.updated_at
            "#,
            params![school_id, revision, routines_json, Utc::now().to_rfc3339()],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        debug!(school_id = %school_id, revision, classes = routines.len(), "课表已保存");
        Ok(revision)
    }

    /// 删除课表文档
    pub fn delete(&self, school_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM class_routine_set WHERE school_id = ?1",
            params![school_id],
        )?;
        Ok(affected > 0)
    }
}
