// ==========================================
// 学校课表排课系统 - 教师目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::teacher::Teacher;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// 教师目录仓储
/// 职责: 管理 teacher 表; 科目与任教班级以 JSON 数组保存
pub struct TeacherRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TeacherRepository {
    /// 创建新的 TeacherRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增或更新教师（按 teacher_id）
    pub fn upsert(&self, school_id: &str, teacher: &Teacher) -> RepositoryResult<()> {
        let subjects_json = serde_json::to_string(&teacher.subjects)?;
        let classes_json = serde_json::to_string(&teacher.teaching_classes)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO teacher (
                teacher_id, school_id, name, active, subjects_json, classes_json, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(teacher_id) DO UPDATE SET
                school_id = excluded.school_id,
                name = excluded.name,
                active = excluded.active,
                subjects_json = excluded.subjects_json,
                classes_json = excluded.classes_json,
                updated_at = excluded.updated_at
            "#,
            params![
                teacher.teacher_id,
                school_id,
                teacher.name,
                teacher.active as i32,
                subjects_json,
                classes_json,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 批量新增或更新（单事务）
    pub fn upsert_batch(&self, school_id: &str, teachers: &[Teacher]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        for teacher in teachers {
            tx.execute(
                r#"
                INSERT INTO teacher (
                    teacher_id, school_id, name, active, subjects_json, classes_json, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(teacher_id) DO UPDATE SET
                    name = excluded.name,
                    active = excluded.active,
                    subjects_json = excluded.subjects_json,
                    classes_json = excluded.classes_json,
                    updated_at = excluded.updated_at
                "#,
                params![
                    teacher.teacher_id,
                    school_id,
                    teacher.name,
                    teacher.active as i32,
                    serde_json::to_string(&teacher.subjects)?,
                    serde_json::to_string(&teacher.teaching_classes)?,
                    now,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(teachers.len())
    }

    /// 按 ID 查询
    pub fn find_by_id(&self, teacher_id: &str) -> RepositoryResult<Option<Teacher>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT teacher_id, name, active, subjects_json, classes_json
                FROM teacher WHERE teacher_id = ?1
                "#,
                params![teacher_id],
                map_raw_teacher,
            )
            .optional()?;
        raw.map(RawTeacherRow::into_teacher).transpose()
    }

    /// 查询学校全部教师（按录入顺序）
    pub fn list_all(&self, school_id: &str) -> RepositoryResult<Vec<Teacher>> {
        self.list(school_id, false)
    }

    /// 查询学校在职教师（按录入顺序）
    pub fn list_active(&self, school_id: &str) -> RepositoryResult<Vec<Teacher>> {
        self.list(school_id, true)
    }

    /// 设置在职状态
    pub fn set_active(&self, teacher_id: &str, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE teacher SET active = ?1, updated_at = ?2 WHERE teacher_id = ?3",
            params![active as i32, Utc::now().to_rfc3339(), teacher_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Teacher".to_string(),
                id: teacher_id.to_string(),
            });
        }
        Ok(())
    }

    fn list(&self, school_id: &str, active_only: bool) -> RepositoryResult<Vec<Teacher>> {
        let conn = self.get_conn()?;
        let sql = if active_only {
            r#"
            SELECT teacher_id, name, active, subjects_json, classes_json
            FROM teacher WHERE school_id = ?1 AND active = 1
            ORDER BY rowid ASC
            "#
        } else {
            r#"
            SELECT teacher_id, name, active, subjects_json, classes_json
            FROM teacher WHERE school_id = ?1
            ORDER BY rowid ASC
            "#
        };
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![school_id], map_raw_teacher)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawTeacherRow::into_teacher).collect()
    }
}

struct RawTeacherRow {
    teacher_id: String,
    name: String,
    active: i32,
    subjects_json: String,
    classes_json: String,
}

fn map_raw_teacher(row: &Row<'_>) -> rusqlite::Result<RawTeacherRow> {
    Ok(RawTeacherRow {
        teacher_id: row.get(0)?,
        name: row.get(1)?,
        active: row.get(2)?,
        subjects_json: row.get(3)?,
        classes_json: row.get(4)?,
    })
}

impl RawTeacherRow {
    fn into_teacher(self) -> RepositoryResult<Teacher> {
        let subjects: BTreeSet<String> = serde_json::from_str(&self.subjects_json)?;
        let teaching_classes: BTreeSet<String> = serde_json::from_str(&self.classes_json)?;
        Ok(Teacher {
            teacher_id: self.teacher_id,
            name: self.name,
            active: self.active != 0,
            subjects,
            teaching_classes,
        })
    }
}
