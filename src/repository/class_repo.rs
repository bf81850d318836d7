// ==========================================
// 学校课表排课系统 - 班级仓储
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 班级仓储
/// 职责: 管理 school_class 表, 班级顺序即课表输出顺序
pub struct ClassRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ClassRepository {
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

    /// 追加班级（排在已有班级之后）
    ///
    /// # 返回
    /// - Err(UniqueConstraintViolation): 班级名重复
    pub fn add_class(&self, school_id: &str, class_name: &str) -> RepositoryResult<()> {
        let name = class_name.trim();
        if name.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "class_name".to_string(),
                message: "班级名不能为空".to_string(),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO school_class (school_id, class_name, display_order)
            VALUES (
                ?1, ?2,
                (SELECT COALESCE(MAX(display_order), -1) + 1 FROM school_class WHERE school_id = ?1)
            )
            "#,
            params![school_id, name],
        )?;
        Ok(())
    }

    /// 删除班级
    pub fn remove_class(&self, school_id: &str, class_name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM school_class WHERE school_id = ?1 AND class_name = ?2",
            params![school_id, class_name],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "SchoolClass".to_string(),
                id: class_name.to_string(),
            });
        }
        Ok(())
    }

    /// 按顺序列出班级名
    pub fn list_class_names(&self, school_id: &str) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT class_name FROM school_class WHERE school_id = ?1 ORDER BY display_order ASC",
        )?;
        let names = stmt
            .query_map(params![school_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }
}
