// ==========================================
// 学校课表排课系统 - 局部修复引擎
// ==========================================
// 输入: 全校班级课表（不修改原件）+ 在职教师花名册
// 输出: 修复后的课表副本 + 修复记录（冲突可能仍然存在）
// ==========================================
// 规则:
// 1. 同一时间段撞课时保留第一个分配（按班级列表顺序）
// 2. 其余分配逐个寻找替代教师, 需同时满足:
//    - 不是撞课教师本人
//    - 可任教该课节科目
//    - 可任教目标班级
//    - 在原始时间段快照中没有任何分配
// 3. 找不到替代教师时保持原样, 不重试, 不做连锁修复
// ==========================================

use crate::domain::routine::ClassRoutine;
use crate::domain::teacher::{Teacher, TeacherRoster};
use crate::domain::time::hhmm;
use crate::domain::types::Weekday;
use crate::engine::validator::{index_day, Assignment, TeacherSlot};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

#[cfg(test)]
mod tests;

// ==========================================
// RepairAction - 修复记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairAction {
    pub day: Weekday,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub class_name: String,
    pub subject: String,
    pub from_teacher: String,
    pub to_teacher: String,
    pub to_teacher_id: String,
}

// ==========================================
// RepairOutcome - 修复结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RepairOutcome {
    pub routines: Vec<ClassRoutine>,
    pub actions: Vec<RepairAction>,
    /// 找不到替代教师的分配数
    pub unresolved: usize,
}

// ==========================================
// LocalRepairEngine - 局部修复引擎
// ==========================================
// 无状态
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRepairEngine;

impl LocalRepairEngine {
    pub fn new() -> Self {
        Self
    }

    /// 单遍修复撞课
    pub fn repair(&self, routines: &[ClassRoutine], roster: &TeacherRoster) -> RepairOutcome {
        let mut repaired = routines.to_vec();
        let mut actions = Vec::new();
        let mut unresolved = 0usize;

        for day in Weekday::ALL {
            // 快照取自原始课表, 修复动作不影响本轮候选判断
            let index = index_day(routines, day);

            for ((start_time, end_time), teachers) in &index {
                let occupied: HashSet<&str> = teachers
                    .iter()
                    .flat_map(|(key, slot)| [key.as_str(), slot.display_name.as_str()])
                    .collect();

                for (key, slot) in teachers {
                    if slot.assignments.len() < 2 {
                        continue;
                    }

                    for assignment in slot.assignments.iter().skip(1) {
                        let Some(candidate) = Self::find_substitute(roster, key, slot, assignment, &occupied)
                        else {
                            unresolved += 1;
                            debug!(
                                day = %day,
                                start = %start_time,
                                teacher = %slot.display_name,
                                class_name = %assignment.class_name,
                                subject = %assignment.subject,
                                "无可用替代教师, 冲突保留"
                            );
                            continue;
                        };

                        let period = repaired
                            .get_mut(assignment.class_index)
                            .and_then(|r| r.schedule.get_mut(&day))
                            .and_then(|ps| ps.get_mut(assignment.period_index));
                        let Some(period) = period else {
                            continue;
                        };

                        period.teacher = candidate.name.clone();
                        period.teacher_id = Some(candidate.teacher_id.clone());

                        actions.push(RepairAction {
                            day,
                            start_time: *start_time,
                            end_time: *end_time,
                            class_name: assignment.class_name.clone(),
                            subject: assignment.subject.clone(),
                            from_teacher: slot.display_name.clone(),
                            to_teacher: candidate.name.clone(),
                            to_teacher_id: candidate.teacher_id.clone(),
                        });
                    }
                }
            }
        }

        info!(
            repaired = actions.len(),
            unresolved = unresolved,
            "局部修复完成"
        );

        RepairOutcome {
            routines: repaired,
            actions,
            unresolved,
        }
    }

    /// 按花名册顺序查找第一个合格的替代教师
    fn find_substitute<'r>(
        roster: &'r TeacherRoster,
        conflicting_key: &str,
        slot: &TeacherSlot,
        assignment: &Assignment,
        occupied: &HashSet<&str>,
    ) -> Option<&'r Teacher> {
        roster.iter().find(|candidate| {
            let name = candidate.name.trim();
            candidate.teacher_id != conflicting_key
                && name != slot.display_name
                && candidate.teaches(&assignment.subject)
                && candidate.qualified_for(&assignment.class_name)
                && !occupied.contains(candidate.teacher_id.as_str())
                && !occupied.contains(name)
        })
    }
}
