// ==========================================
// 学校课表排课系统 - 作息规则引擎
// ==========================================
// 输入: 一条 DayRule + 一个教学日
// 输出: 有序空白课节列表（科目/教师留空, 类型已设置）
// ==========================================
// 课节按游标顺序生成, 相邻课节首尾相接
// ==========================================

use crate::domain::routine::Period;
use crate::domain::rule::{DayRule, RecessCount, Section};
use crate::domain::time::add_minutes;
use crate::domain::types::{PeriodType, Weekday};
use chrono::NaiveTime;
use tracing::trace;

/// 课间课节的科目标签
pub const RECESS_LABEL: &str = "Recess";

// ==========================================
// RuleEngine - 作息规则引擎
// ==========================================
// 无状态
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// 展开单日课节
    pub fn expand_day(&self, rule: &DayRule, day: Weekday) -> Vec<Period> {
        let mut periods = Vec::new();
        let mut cursor = rule.start_time;

        cursor = Self::emit_section(&mut periods, cursor, rule.section1);

        if rule.recess_count >= RecessCount::One && rule.first_recess_duration > 0 {
            cursor = Self::emit_recess(&mut periods, cursor, rule.first_recess_duration);
            cursor = Self::emit_section(&mut periods, cursor, rule.section2);
        }

        if rule.recess_count >= RecessCount::Two && rule.second_recess_duration > 0 {
            cursor = Self::emit_recess(&mut periods, cursor, rule.second_recess_duration);
            cursor = Self::emit_section(&mut periods, cursor, rule.section3);
        }

        trace!(
            rule_id = %rule.id,
            day = %day,
            periods = periods.len(),
            end = %cursor,
            "作息规则展开完成"
        );

        periods
    }

    fn emit_section(periods: &mut Vec<Period>, mut cursor: NaiveTime, section: Section) -> NaiveTime {
        for _ in 0..section.periods {
            let end = add_minutes(cursor, section.duration);
            periods.push(Period::blank(cursor, end, PeriodType::Class));
            cursor = end;
        }
        cursor
    }

    fn emit_recess(periods: &mut Vec<Period>, cursor: NaiveTime, minutes: u32) -> NaiveTime {
        let end = add_minutes(cursor, minutes);
        let mut recess = Period::blank(cursor, end, PeriodType::Break);
        recess.subject = RECESS_LABEL.to_string();
        periods.push(recess);
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::{format_clock, parse_clock};

    fn ranges(periods: &[Period]) -> Vec<String> {
        periods
            .iter()
            .map(|p| format!("{}-{}", format_clock(p.start_time), format_clock(p.end_time)))
            .collect()
    }

    fn assert_contiguous(periods: &[Period]) {
        for pair in periods.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time, "课节之间不能有间隙或重叠");
        }
    }

    #[test]
    fn test_one_recess_school_day() {
        let rule = DayRule::new("weekday", parse_clock("07:10").unwrap(), Section::new(3, 40))
            .with_first_recess(15, Section::new(3, 40));

        let periods = RuleEngine::new().expand_day(&rule, Weekday::Monday);

        assert_eq!(
            ranges(&periods),
            vec![
                "07:10-07:50",
                "07:50-08:30",
                "08:30-09:10",
                "09:10-09:25",
                "09:25-10:05",
                "10:05-10:45",
                "10:45-11:25",
            ]
        );
        assert_eq!(periods[3].period_type, PeriodType::Break);
        assert_eq!(periods[3].subject, RECESS_LABEL);
        assert_contiguous(&periods);
    }

    #[test]
    fn test_no_recess_emits_only_section1() {
        // section2 有值但不生效
        let mut rule = DayRule::new("r", parse_clock("08:00").unwrap(), Section::new(5, 45));
        rule.section2 = Section::new(4, 45);
        rule.first_recess_duration = 20;

        let periods = RuleEngine::new().expand_day(&rule, Weekday::Tuesday);

        assert_eq!(periods.len(), 5);
        assert!(periods.iter().all(|p| p.period_type == PeriodType::Class));
        assert_contiguous(&periods);
    }

    #[test]
    fn test_two_recesses_fixed_order() {
        let rule = DayRule::new("r", parse_clock("08:00").unwrap(), Section::new(2, 45))
            .with_first_recess(10, Section::new(3, 40))
            .with_second_recess(30, Section::new(2, 35));

        let periods = RuleEngine::new().expand_day(&rule, Weekday::Wednesday);
        let types: Vec<PeriodType> = periods.iter().map(|p| p.period_type).collect();

        assert_eq!(periods.len(), 2 + 3 + 2 + 2);
        assert_eq!(
            types,
            vec![
                PeriodType::Class,
                PeriodType::Class,
                PeriodType::Break,
                PeriodType::Class,
                PeriodType::Class,
                PeriodType::Class,
                PeriodType::Break,
                PeriodType::Class,
                PeriodType::Class,
            ]
        );
        assert_eq!(format_clock(periods.last().unwrap().end_time), "13:20");
        assert_contiguous(&periods);
    }

    #[test]
    fn test_zero_length_recess_is_skipped_with_its_section() {
        let rule = DayRule::new("r", parse_clock("08:00").unwrap(), Section::new(2, 45))
            .with_first_recess(0, Section::new(3, 40));

        let periods = RuleEngine::new().expand_day(&rule, Weekday::Thursday);

        assert_eq!(periods.len(), 2);
    }
}
