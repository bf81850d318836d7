// ==========================================
// 学校课表排课系统 - 课节骨架生成器
// ==========================================
// 对六个教学日分别应用作息规则引擎, 得到空白周课表
// 用途: 人工录入的起点 + 生成器需遵守的结构模板
// ==========================================

use crate::domain::routine::{ClassRoutine, WeeklySchedule};
use crate::domain::rule::DayRuleBook;
use crate::domain::types::Weekday;
use crate::engine::error::{TimetableError, TimetableResult};
use crate::engine::rule_engine::RuleEngine;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct SlotMaterializer {
    engine: RuleEngine,
}

impl SlotMaterializer {
    pub fn new() -> Self {
        Self {
            engine: RuleEngine::new(),
        }
    }

    /// 生成空白周课表
    ///
    /// # 返回
    /// - Err(NoRules): 规则集合为空
    pub fn materialize(&self, book: &DayRuleBook) -> TimetableResult<WeeklySchedule> {
        let mut schedule = WeeklySchedule::new();

        for day in Weekday::ALL {
            let rule = book.rule_for(day).ok_or(TimetableError::NoRules)?;
            if book.assigned_rule_id(day).is_none() {
                debug!(day = %day, fallback_rule = %rule.id, "教学日未归属规则, 使用第一条规则");
            }
            schedule.insert(day, self.engine.expand_day(rule, day));
        }

        Ok(schedule)
    }

    /// 为每个班级生成同一份空白周课表
    pub fn skeletons(
        &self,
        book: &DayRuleBook,
        class_names: &[String],
    ) -> TimetableResult<Vec<ClassRoutine>> {
        let schedule = self.materialize(book)?;
        Ok(class_names
            .iter()
            .map(|name| ClassRoutine::new(name.clone(), schedule.clone()))
            .collect())
    }
}
