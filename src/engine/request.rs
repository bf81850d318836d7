// ==========================================
// 学校课表排课系统 - 生成请求构建
// ==========================================
// 汇总: 班级列表 + 作息规则摘要 + 在职教师花名册 + 课时上限 + 特殊说明
// 渲染: 自然语言说明 + 明确的排课步骤 + 期望的 JSON 输出格式
// ==========================================

use crate::domain::rule::DayRuleBook;
use crate::domain::teacher::TeacherRoster;
use crate::domain::time::{format_clock, hhmm};
use crate::domain::types::{PeriodType, Weekday};
use crate::engine::error::{TimetableError, TimetableResult};
use crate::engine::rule_engine::RuleEngine;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// 课节模板（不含科目/教师）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotTemplate {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(rename = "type")]
    pub period_type: PeriodType,
}

/// 作息规则摘要（含回退后实际适用的教学日）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSummary {
    pub rule_id: String,
    pub days: Vec<Weekday>,
    pub periods: Vec<SlotTemplate>,
}

/// 花名册条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub teacher_id: String,
    pub name: String,
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
}

// ==========================================
// GenerationRequest - 生成请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub school_id: String,
    pub classes: Vec<String>,
    pub day_rules: Vec<RuleSummary>,
    pub teacher_roster: Vec<RosterEntry>,
    pub special_instructions: String,
    pub max_classes_per_teacher: u32,
    /// 上一次尝试遗留的冲突（仅在开启冲突回馈时填充）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_conflicts: Vec<String>,
}

impl GenerationRequest {
    /// 构建生成请求
    pub fn build(
        school_id: &str,
        class_names: &[String],
        book: &DayRuleBook,
        roster: &TeacherRoster,
        special_instructions: &str,
        max_classes_per_teacher: u32,
    ) -> TimetableResult<Self> {
        let engine = RuleEngine::new();
        let mut day_rules: Vec<RuleSummary> = Vec::new();

        for day in Weekday::ALL {
            let rule = book.rule_for(day).ok_or(TimetableError::NoRules)?;
            match day_rules.iter_mut().find(|s| s.rule_id == rule.id) {
                Some(summary) => summary.days.push(day),
                None => day_rules.push(RuleSummary {
                    rule_id: rule.id.clone(),
                    days: vec![day],
                    periods: engine
                        .expand_day(rule, day)
                        .into_iter()
                        .map(|p| SlotTemplate {
                            start_time: p.start_time,
                            end_time: p.end_time,
                            period_type: p.period_type,
                        })
                        .collect(),
                }),
            }
        }

        let teacher_roster = roster
            .iter()
            .map(|t| RosterEntry {
                teacher_id: t.teacher_id.clone(),
                name: t.name.clone(),
                subjects: t.subjects.iter().cloned().collect(),
                classes: t.teaching_classes.iter().cloned().collect(),
            })
            .collect();

        Ok(Self {
            school_id: school_id.to_string(),
            classes: class_names.to_vec(),
            day_rules,
            teacher_roster,
            special_instructions: special_instructions.trim().to_string(),
            max_classes_per_teacher,
            previous_conflicts: Vec::new(),
        })
    }

    /// 附带上一次尝试冲突的请求副本
    pub fn with_feedback(&self, conflicts: &[String]) -> Self {
        let mut next = self.clone();
        next.previous_conflicts = conflicts.to_vec();
        next
    }

    /// 渲染为生成器提示文本
    pub fn render_prompt(&self) -> String {
        let mut lines = vec![format!(
            "Create a complete weekly class timetable for {} classes: {}.",
            self.classes.len(),
            self.classes.join(", ")
        )];

        lines.push(String::new());
        lines.push("PERIOD STRUCTURE (use these exact time slots):".to_string());
        for summary in &self.day_rules {
            let days: Vec<&str> = summary.days.iter().map(Weekday::as_str).collect();
            lines.push(format!("- {}:", days.join(", ")));
            lines.extend(summary.periods.iter().map(|slot| {
                format!(
                    "    {}-{} {}",
                    format_clock(slot.start_time),
                    format_clock(slot.end_time),
                    slot.period_type
                )
            }));
        }

        lines.push(String::new());
        lines.push("TEACHERS (only these may be assigned):".to_string());
        lines.extend(self.teacher_roster.iter().map(|entry| {
            format!(
                "- {}: subjects [{}], classes [{}]",
                entry.name,
                entry.subjects.join(", "),
                entry.classes.join(", ")
            )
        }));

        lines.push(String::new());
        lines.push("RULES:".to_string());
        lines.push(
            "1. A teacher may only teach a subject listed for them, and only in a class listed for them."
                .to_string(),
        );
        lines.push("2. A teacher must never be in two classes at the same day and time slot.".to_string());
        lines.push(format!(
            "3. A teacher may teach at most {} class periods per day.",
            self.max_classes_per_teacher
        ));
        lines.push("4. Break periods keep subject \"Recess\" and an empty teacher.".to_string());

        lines.push(String::new());
        lines.push("ALGORITHM:".to_string());
        lines.push(
            "For each day, go slot by slot; for each class pick a qualified teacher who is free in that slot and under the daily limit; track assignments as you go."
                .to_string(),
        );

        if !self.special_instructions.is_empty() {
            lines.push(String::new());
            lines.push("SPECIAL INSTRUCTIONS:".to_string());
            lines.push(self.special_instructions.clone());
        }

        if !self.previous_conflicts.is_empty() {
            lines.push(String::new());
            lines.push("THE PREVIOUS ATTEMPT HAD THESE CONFLICTS, AVOID THEM:".to_string());
            lines.extend(self.previous_conflicts.iter().map(|c| format!("- {}", c)));
        }

        lines.push(String::new());
        lines.push("OUTPUT: return ONLY a JSON array, one element per class:".to_string());
        lines.push(
            r#"[{"className":"...","schedule":{"Monday":[{"startTime":"HH:MM","endTime":"HH:MM","subject":"...","teacher":"...","type":"class|break|lunch"}]}}]"#
                .to_string(),
        );
        lines.push(format!(
            "Include all of: {}.",
            Weekday::ALL.map(|d| d.as_str()).join(", ")
        ));

        lines.join("\n")
    }
}
