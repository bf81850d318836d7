// ==========================================
// 学校课表排课系统 - 领域类型定义
// ==========================================
// 依据: 课表数据模型 - Period.type / 六日教学周
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 教学日 (Weekday)
// ==========================================
// 六日教学周: 周一至周六
// 序列化格式: 英文全称 (与课表文档键一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(alias = "monday", alias = "MONDAY", alias = "Mon")]
    Monday,
    #[serde(alias = "tuesday", alias = "TUESDAY", alias = "Tue")]
    Tuesday,
    #[serde(alias = "wednesday", alias = "WEDNESDAY", alias = "Wed")]
    Wednesday,
    #[serde(alias = "thursday", alias = "THURSDAY", alias = "Thu")]
    Thursday,
    #[serde(alias = "friday", alias = "FRIDAY", alias = "Fri")]
    Friday,
    #[serde(alias = "saturday", alias = "SATURDAY", alias = "Sat")]
    Saturday,
}

impl Weekday {
    /// 教学周全部六天（固定顺序）
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = String;

    /// 解析星期名称（大小写不敏感，支持三字母缩写）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Weekday::ALL
            .iter()
            .copied()
            .find(|day| {
                let name = day.as_str().to_ascii_lowercase();
                name == lowered || name[..3] == lowered
            })
            .ok_or_else(|| format!("无效的星期名称: {}", s))
    }
}

// ==========================================
// 课节类型 (Period Type)
// ==========================================
// 序列化格式: lowercase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    #[default]
    #[serde(alias = "Class", alias = "CLASS")]
    Class, // 上课
    #[serde(alias = "Break", alias = "BREAK", alias = "recess", alias = "Recess")]
    Break, // 课间休息
    #[serde(alias = "Lunch", alias = "LUNCH")]
    Lunch, // 午休
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodType::Class => write!(f, "class"),
            PeriodType::Break => write!(f, "break"),
            PeriodType::Lunch => write!(f, "lunch"),
        }
    }
}
