// ==========================================
// 学校课表排课系统 - 作息规则
// ==========================================
// DayRule: 一组教学日共用的课节/课间结构
// DayRuleBook: 教学日 -> 规则 的显式划分
// 不变量: 每个教学日至多属于一条规则（结构保证，不做事后校验）
// ==========================================

use crate::domain::time::hhmm;
use crate::domain::types::Weekday;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

// ==========================================
// 课间数量 (0 / 1 / 2)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RecessCount {
    #[default]
    Zero,
    One,
    Two,
}

impl RecessCount {
    pub fn as_u8(&self) -> u8 {
        match self {
            RecessCount::Zero => 0,
            RecessCount::One => 1,
            RecessCount::Two => 2,
        }
    }
}

impl TryFrom<u8> for RecessCount {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RecessCount::Zero),
            1 => Ok(RecessCount::One),
            2 => Ok(RecessCount::Two),
            other => Err(format!("课间数量必须为 0/1/2, 实际为 {}", other)),
        }
    }
}

impl From<RecessCount> for u8 {
    fn from(value: RecessCount) -> Self {
        value.as_u8()
    }
}

impl fmt::Display for RecessCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

// ==========================================
// Section - 课节段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Section {
    /// 课节数
    pub periods: u32,
    /// 每节时长（分钟）
    pub duration: u32,
}

impl Section {
    pub fn new(periods: u32, duration: u32) -> Self {
        Self { periods, duration }
    }
}

// ==========================================
// DayRule - 作息规则
// ==========================================
// section2 仅在 recess_count >= 1 时生效, section3 仅在 >= 2 时生效
// 未生效的字段照常保存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRule {
    pub id: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub recess_count: RecessCount,
    pub section1: Section,
    pub first_recess_duration: u32,
    pub section2: Section,
    pub second_recess_duration: u32,
    pub section3: Section,
}

impl DayRule {
    /// 创建无课间的规则
    pub fn new(id: impl Into<String>, start_time: NaiveTime, section1: Section) -> Self {
        Self {
            id: id.into(),
            start_time,
            recess_count: RecessCount::Zero,
            section1,
            first_recess_duration: 0,
            section2: Section::default(),
            second_recess_duration: 0,
            section3: Section::default(),
        }
    }

    /// 追加第一段课间及其后的课节段
    pub fn with_first_recess(mut self, recess_minutes: u32, section2: Section) -> Self {
        self.recess_count = self.recess_count.max(RecessCount::One);
        self.first_recess_duration = recess_minutes;
        self.section2 = section2;
        self
    }

    /// 追加第二段课间及其后的课节段
    pub fn with_second_recess(mut self, recess_minutes: u32, section3: Section) -> Self {
        self.recess_count = RecessCount::Two;
        self.second_recess_duration = recess_minutes;
        self.section3 = section3;
        self
    }

    /// 校验规则参数
    ///
    /// # 校验规则
    /// 1. id 不能为空
    /// 2. 生效课节段的时长必须 > 0（课节数 > 0 时）
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("规则ID不能为空".to_string());
        }

        let mut active = vec![("section1", self.section1)];
        if self.recess_count >= RecessCount::One {
            active.push(("section2", self.section2));
        }
        if self.recess_count >= RecessCount::Two {
            active.push(("section3", self.section3));
        }

        for (name, section) in active {
            if section.periods > 0 && section.duration == 0 {
                return Err(format!("规则 {} 的 {} 课节时长不能为 0", self.id, name));
            }
        }

        Ok(())
    }
}

// ==========================================
// DayRuleBook - 作息规则划分
// ==========================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleBookError {
    #[error("作息规则不存在: {0}")]
    UnknownRule(String),

    #[error("作息规则ID重复: {0}")]
    DuplicateRule(String),

    #[error("作息规则无效: {0}")]
    InvalidRule(String),
}

/// 作息规则集合
///
/// 规则按配置顺序保存, 教学日归属由 `day_index` 唯一确定。
/// `rule_for` 找不到归属时静默回退到第一条规则。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRuleBook {
    rules: Vec<DayRule>,
    day_index: BTreeMap<Weekday, String>,
}

impl DayRuleBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[DayRule] {
        &self.rules
    }

    pub fn find(&self, rule_id: &str) -> Option<&DayRule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    /// 添加规则并把指定教学日划给它
    pub fn add_rule(&mut self, rule: DayRule, days: &[Weekday]) -> Result<(), RuleBookError> {
        rule.validate().map_err(RuleBookError::InvalidRule)?;
        if self.find(&rule.id).is_some() {
            return Err(RuleBookError::DuplicateRule(rule.id));
        }

        let rule_id = rule.id.clone();
        self.rules.push(rule);
        for day in days {
            self.assign_day(*day, &rule_id)?;
        }
        Ok(())
    }

    /// 替换同 ID 规则的结构参数（教学日归属不变）
    pub fn update_rule(&mut self, rule: DayRule) -> Result<(), RuleBookError> {
        rule.validate().map_err(RuleBookError::InvalidRule)?;
        let slot = self
            .rules
            .iter_mut()
            .find(|r| r.id == rule.id)
            .ok_or_else(|| RuleBookError::UnknownRule(rule.id.clone()))?;
        *slot = rule;
        Ok(())
    }

    /// 删除规则, 其教学日变为未归属
    pub fn remove_rule(&mut self, rule_id: &str) -> Result<DayRule, RuleBookError> {
        let pos = self
            .rules
            .iter()
            .position(|r| r.id == rule_id)
            .ok_or_else(|| RuleBookError::UnknownRule(rule_id.to_string()))?;
        self.day_index.retain(|_, id| id != rule_id);
        Ok(self.rules.remove(pos))
    }

    /// 把教学日划给规则（自动从原规则中移除）
    pub fn assign_day(&mut self, day: Weekday, rule_id: &str) -> Result<(), RuleBookError> {
        if self.find(rule_id).is_none() {
            return Err(RuleBookError::UnknownRule(rule_id.to_string()));
        }
        self.day_index.insert(day, rule_id.to_string());
        Ok(())
    }

    /// 取消教学日归属
    pub fn unassign_day(&mut self, day: Weekday) -> Option<String> {
        self.day_index.remove(&day)
    }

    /// 教学日显式归属的规则ID
    pub fn assigned_rule_id(&self, day: Weekday) -> Option<&str> {
        self.day_index.get(&day).map(String::as_str)
    }

    /// 规则覆盖的教学日（按周序）
    pub fn days_of(&self, rule_id: &str) -> Vec<Weekday> {
        self.day_index
            .iter()
            .filter(|(_, id)| id.as_str() == rule_id)
            .map(|(day, _)| *day)
            .collect()
    }

    /// 查找教学日适用的规则, 无归属时回退到第一条规则
    pub fn rule_for(&self, day: Weekday) -> Option<&DayRule> {
        self.day_index
            .get(&day)
            .and_then(|id| self.find(id))
            .or_else(|| self.rules.first())
    }
}
