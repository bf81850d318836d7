// ==========================================
// 学校课表排课系统 - 班级课表
// ==========================================
// Period: 单个课节（时间段 + 科目 + 教师 + 类型）
// WeeklySchedule: 教学日 -> 有序课节列表
// ClassRoutine: 单个班级的周课表
// ==========================================
// 不变量: 同一天内 period[i].end_time == period[i+1].start_time
//         由构造保证（规则引擎生成），不做事后校验
// ==========================================

use crate::domain::time::hhmm;
use crate::domain::types::{PeriodType, Weekday};
use chrono::NaiveTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// 周课表
pub type WeeklySchedule = BTreeMap<Weekday, Vec<Period>>;

// ==========================================
// Period - 课节
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,

    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,

    /// 教师显示名（休息课节常为 null）
    #[serde(default, deserialize_with = "null_as_empty")]
    pub teacher: String,

    /// 教师稳定标识（由花名册解析得到）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,

    #[serde(rename = "type", default)]
    pub period_type: PeriodType,
}

impl Period {
    /// 空白课节（科目/教师待填）
    pub fn blank(start_time: NaiveTime, end_time: NaiveTime, period_type: PeriodType) -> Self {
        Self {
            start_time,
            end_time,
            subject: String::new(),
            teacher: String::new(),
            teacher_id: None,
            period_type,
        }
    }

    pub fn is_class(&self) -> bool {
        self.period_type == PeriodType::Class
    }

    /// 教师身份键: 优先稳定标识, 否则使用去空白后的显示名
    ///
    /// 未分配教师时返回 None
    pub fn teacher_key(&self) -> Option<String> {
        if let Some(id) = self.teacher_id.as_deref().map(str::trim) {
            if !id.is_empty() {
                return Some(id.to_string());
            }
        }
        let name = self.teacher.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    /// 时间段键
    pub fn slot(&self) -> (NaiveTime, NaiveTime) {
        (self.start_time, self.end_time)
    }
}

// ==========================================
// ClassRoutine - 班级课表
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRoutine {
    pub class_name: String,

    #[serde(alias = "routine", default, deserialize_with = "known_days")]
    pub schedule: WeeklySchedule,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// 按教学日键读取周课表, 非教学日的键（如 Sunday）丢弃
fn known_days<'de, D>(deserializer: D) -> Result<WeeklySchedule, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Vec<Period>>::deserialize(deserializer)?;
    let mut schedule = WeeklySchedule::new();
    for (key, periods) in raw {
        match key.parse::<Weekday>() {
            Ok(day) => {
                schedule.insert(day, periods);
            }
            Err(_) => warn!(day = %key, periods = periods.len(), "忽略非教学日课节"),
        }
    }
    Ok(schedule)
}

impl ClassRoutine {
    pub fn new(class_name: impl Into<String>, schedule: WeeklySchedule) -> Self {
        Self {
            class_name: class_name.into(),
            schedule,
        }
    }

    /// 指定教学日的课节列表
    pub fn day(&self, day: Weekday) -> &[Period] {
        self.schedule.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 全周上课课节数
    pub fn class_period_count(&self) -> usize {
        self.schedule
            .values()
            .flat_map(|periods| periods.iter())
            .filter(|p| p.is_class())
            .count()
    }
}
