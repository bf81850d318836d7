// ==========================================
// 学校课表排课系统 - 冲突校验器
// ==========================================
// 输入: 全校班级课表 + 教师单日课时上限
// 输出: ValidationReport
// ==========================================
// 冲突类型:
// 1. 撞课: 同一 (开始, 结束) 时间段同一教师出现在 >= 2 个班级
//    同一时间段的全部撞课班级合并为一条记录
// 2. 超课时: 教师单日上课节数 > 上限（等于上限不算超）
// 只统计 type == class 且教师非空的课节
// ==========================================

use crate::domain::conflict::{Conflict, ValidationReport};
use crate::domain::routine::ClassRoutine;
use crate::domain::types::Weekday;
use chrono::NaiveTime;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// 时间段键
pub(crate) type SlotKey = (NaiveTime, NaiveTime);

/// 一次课节分配在课表中的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Assignment {
    pub class_index: usize,
    pub period_index: usize,
    pub class_name: String,
    pub subject: String,
}

/// 某时间段内单个教师的全部分配
#[derive(Debug, Clone, Default)]
pub(crate) struct TeacherSlot {
    /// 首次出现时的显示名
    pub display_name: String,
    /// 按班级顺序排列
    pub assignments: Vec<Assignment>,
}

/// 单日索引: 时间段 -> 教师键 -> 分配
pub(crate) type DayIndex = BTreeMap<SlotKey, BTreeMap<String, TeacherSlot>>;

/// 建立单日时间段索引（按班级列表顺序扫描）
pub(crate) fn index_day(routines: &[ClassRoutine], day: Weekday) -> DayIndex {
    let mut index = DayIndex::new();

    for (class_index, routine) in routines.iter().enumerate() {
        for (period_index, period) in routine.day(day).iter().enumerate() {
            if !period.is_class() {
                continue;
            }
            let Some(key) = period.teacher_key() else {
                continue;
            };

            let slot = index
                .entry(period.slot())
                .or_default()
                .entry(key)
                .or_insert_with(|| TeacherSlot {
                    display_name: period.teacher.trim().to_string(),
                    assignments: Vec::new(),
                });
            slot.assignments.push(Assignment {
                class_index,
                period_index,
                class_name: routine.class_name.clone(),
                subject: period.subject.clone(),
            });
        }
    }

    index
}

// ==========================================
// ConflictValidator - 冲突校验器
// ==========================================
// 无状态
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictValidator;

impl ConflictValidator {
    pub fn new() -> Self {
        Self
    }

    /// 校验全校课表
    ///
    /// # 参数
    /// - routines: 全校班级课表
    /// - max_classes_per_teacher: 教师单日课时上限
    pub fn validate(&self, routines: &[ClassRoutine], max_classes_per_teacher: u32) -> ValidationReport {
        let mut conflicts = Vec::new();

        for day in Weekday::ALL {
            let index = index_day(routines, day);

            // 1. 撞课
            for ((start_time, end_time), teachers) in &index {
                for slot in teachers.values() {
                    if slot.assignments.len() >= 2 {
                        conflicts.push(Conflict::DoubleBooking {
                            day,
                            start_time: *start_time,
                            end_time: *end_time,
                            teacher: slot.display_name.clone(),
                            class_names: slot
                                .assignments
                                .iter()
                                .map(|a| a.class_name.clone())
                                .collect(),
                        });
                    }
                }
            }

            // 2. 超课时
            let mut daily: BTreeMap<&str, (&str, u32)> = BTreeMap::new();
            for teachers in index.values() {
                for (key, slot) in teachers {
                    let entry = daily
                        .entry(key.as_str())
                        .or_insert((slot.display_name.as_str(), 0));
                    entry.1 += slot.assignments.len() as u32;
                }
            }
            for (teacher, count) in daily.into_values() {
                if count > max_classes_per_teacher {
                    conflicts.push(Conflict::WorkloadOverflow {
                        day,
                        teacher: teacher.to_string(),
                        count,
                        cap: max_classes_per_teacher,
                    });
                }
            }
        }

        let report = ValidationReport::from_conflicts(conflicts);

        if report.valid {
            debug!(classes = routines.len(), "课表校验通过");
        } else {
            info!(
                classes = routines.len(),
                double_bookings = report.double_bookings().count(),
                workload_overflows = report.workload_overflows().count(),
                "课表校验发现冲突"
            );
        }

        report
    }
}
