// ==========================================
// 学校课表排课系统 - 作息规则仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 每所学校一份规则集合, 保存时整体替换
// ==========================================

use crate::domain::rule::{DayRule, DayRuleBook, RecessCount, Section};
use crate::domain::time::{format_clock, parse_clock};
use crate::domain::types::Weekday;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// DayRuleRepository - 作息规则仓储
// ==========================================
/// 职责: 管理 day_rule 表
/// 教学日归属以逗号分隔保存在 days 列
pub struct DayRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DayRuleRepository {
    /// 创建新的 DayRuleRepository 实例
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 载入学校的规则集合
    ///
    /// # 返回
    /// - Ok(DayRuleBook): 规则按 seq_no 排序; 无规则时为空集合
    /// - Err: 数据库错误或存量数据无法解析
    pub fn load_book(&self, school_id: &str) -> RepositoryResult<DayRuleBook> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                rule_id, start_time, recess_count,
                s1_periods, s1_duration,
                first_recess_duration, s2_periods, s2_duration,
                second_recess_duration, s3_periods, s3_duration,
                days
            FROM day_rule
            WHERE school_id = ?1
            ORDER BY seq_no ASC
            "#,
        )?;

        let rows = stmt
            .query_map(params![school_id], |row| {
                Ok(RawRuleRow {
                    rule_id: row.get(0)?,
                    start_time: row.get(1)?,
                    recess_count: row.get(2)?,
                    s1: (row.get(3)?, row.get(4)?),
                    first_recess_duration: row.get(5)?,
                    s2: (row.get(6)?, row.get(7)?),
                    second_recess_duration: row.get(8)?,
                    s3: (row.get(9)?, row.get(10)?),
                    days: row.get(11)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut book = DayRuleBook::new();
        for raw in rows {
            let days = parse_days(&raw.days)?;
            let rule = raw.into_rule()?;
            book.add_rule(rule, &days)
                .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;
        }

        debug!(school_id = %school_id, rules = book.rules().len(), "作息规则已载入");
        Ok(book)
    }

    /// 整体保存学校的规则集合（事务内先删后插）
    pub fn save_book(&self, school_id: &str, book: &DayRuleBook) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM day_rule WHERE school_id = ?1", params![school_id])?;

        for (seq_no, rule) in book.rules().iter().enumerate() {
            let days = book
                .days_of(&rule.id)
                .iter()
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(",");

            tx.execute(
                r#"
                INSERT INTO day_rule (
                    school_id, rule_id, seq_no, start_time, recess_count,
                    s1_periods, s1_duration,
                    first_recess_duration, s2_periods, s2_duration,
                    second_recess_duration, s3_periods, s3_duration,
                    days
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    school_id,
                    rule.id,
                    seq_no as i64,
                    format_clock(rule.start_time),
                    rule.recess_count.as_u8(),
                    rule.section1.periods,
                    rule.section1.duration,
                    rule.first_recess_duration,
                    rule.section2.periods,
                    rule.section2.duration,
                    rule.second_recess_duration,
                    rule.section3.periods,
                    rule.section3.duration,
                    days,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        debug!(school_id = %school_id, rules = book.rules().len(), "作息规则已保存");
        Ok(())
    }
}

// ==========================================
// 行映射
// ==========================================

struct RawRuleRow {
    rule_id: String,
    start_time: String,
    recess_count: u8,
    s1: (u32, u32),
    first_recess_duration: u32,
    s2: (u32, u32),
    second_recess_duration: u32,
    s3: (u32, u32),
    days: String,
}

impl RawRuleRow {
    fn into_rule(self) -> RepositoryResult<DayRule> {
        let start_time = parse_clock(&self.start_time).ok_or_else(|| RepositoryError::FieldValueError {
            field: "start_time".to_string(),
            message: format!("无法解析时间: {}", self.start_time),
        })?;
        let recess_count =
            RecessCount::try_from(self.recess_count).map_err(|message| RepositoryError::FieldValueError {
                field: "recess_count".to_string(),
                message,
            })?;

        Ok(DayRule {
            id: self.rule_id,
            start_time,
            recess_count,
            section1: Section::new(self.s1.0, self.s1.1),
            first_recess_duration: self.first_recess_duration,
            section2: Section::new(self.s2.0, self.s2.1),
            second_recess_duration: self.second_recess_duration,
            section3: Section::new(self.s3.0, self.s3.1),
        })
    }
}

fn parse_days(raw: &str) -> RepositoryResult<Vec<Weekday>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Weekday::from_str(s).map_err(|_| RepositoryError::FieldValueError {
                field: "days".to_string(),
                message: format!("无法识别的教学日: {}", s),
            })
        })
        .collect()
}
