// ==========================================
// 学校课表排课系统 - 冲突记录与校验报告
// ==========================================
// 派生数据, 不落库
// ==========================================

use crate::domain::time::format_clock;
use crate::domain::types::Weekday;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Conflict - 冲突记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Conflict {
    /// 同一时间段同一教师出现在多个班级
    DoubleBooking {
        day: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        teacher: String,
        class_names: Vec<String>,
    },
    /// 教师单日上课节数超过上限
    WorkloadOverflow {
        day: Weekday,
        teacher: String,
        count: u32,
        cap: u32,
    },
}

impl Conflict {
    pub fn day(&self) -> Weekday {
        match self {
            Conflict::DoubleBooking { day, .. } | Conflict::WorkloadOverflow { day, .. } => *day,
        }
    }

    pub fn teacher(&self) -> &str {
        match self {
            Conflict::DoubleBooking { teacher, .. } | Conflict::WorkloadOverflow { teacher, .. } => {
                teacher
            }
        }
    }

    pub fn is_double_booking(&self) -> bool {
        matches!(self, Conflict::DoubleBooking { .. })
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::DoubleBooking {
                day,
                start_time,
                end_time,
                teacher,
                class_names,
            } => write!(
                f,
                "{} {}-{}: 教师 {} 同时安排在班级 {}",
                day,
                format_clock(*start_time),
                format_clock(*end_time),
                teacher,
                class_names.join(", ")
            ),
            Conflict::WorkloadOverflow {
                day,
                teacher,
                count,
                cap,
            } => write!(
                f,
                "{}: 教师 {} 当日 {} 节课, 超过上限 {}",
                day, teacher, count, cap
            ),
        }
    }
}

// ==========================================
// ValidationReport - 校验报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// 全周无任何冲突时为 true
    pub valid: bool,
    /// 冲突描述（与 conflicts 一一对应）
    pub errors: Vec<String>,
    pub conflicts: Vec<Conflict>,
}

impl ValidationReport {
    pub fn from_conflicts(conflicts: Vec<Conflict>) -> Self {
        Self {
            valid: conflicts.is_empty(),
            errors: conflicts.iter().map(ToString::to_string).collect(),
            conflicts,
        }
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    pub fn double_bookings(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| c.is_double_booking())
    }

    pub fn workload_overflows(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| !c.is_double_booking())
    }
}
