// ==========================================
// 学校课表排课系统 - 人工录入
// ==========================================
// 只使用课节骨架生成器, 不经过生成器/校验/修复
// 人工在预生成的课节上直接填写科目与教师, 按录入原样接受
// ==========================================

use crate::domain::routine::ClassRoutine;
use crate::domain::rule::DayRuleBook;
use crate::domain::types::Weekday;
use crate::engine::error::TimetableResult;
use crate::engine::materializer::SlotMaterializer;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct ManualEntry {
    materializer: SlotMaterializer,
}

impl ManualEntry {
    pub fn new() -> Self {
        Self {
            materializer: SlotMaterializer::new(),
        }
    }

    /// 为所有班级生成空白骨架
    pub fn skeletons(
        &self,
        book: &DayRuleBook,
        class_names: &[String],
    ) -> TimetableResult<Vec<ClassRoutine>> {
        self.materializer.skeletons(book, class_names)
    }

    /// 载入已保存课表, 缺失的班级补空白骨架
    ///
    /// 已保存班级按原样返回（顺序保持）, 不在班级列表中的已保存课表也保留
    pub fn load_or_skeleton(
        &self,
        book: &DayRuleBook,
        class_names: &[String],
        existing: Option<Vec<ClassRoutine>>,
    ) -> TimetableResult<Vec<ClassRoutine>> {
        let mut routines = existing.unwrap_or_default();
        let missing: Vec<String> = class_names
            .iter()
            .filter(|name| !routines.iter().any(|r| &r.class_name == *name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            debug!(missing = missing.len(), "为未保存课表的班级生成空白骨架");
            routines.extend(self.materializer.skeletons(book, &missing)?);
        }

        Ok(routines)
    }

    /// 填写单个课节
    ///
    /// # 返回
    /// - Err(String): 班级/教学日/课节序号不存在
    pub fn fill_period(
        &self,
        routines: &mut [ClassRoutine],
        class_name: &str,
        day: Weekday,
        period_index: usize,
        subject: &str,
        teacher: &str,
    ) -> Result<(), String> {
        let routine = routines
            .iter_mut()
            .find(|r| r.class_name == class_name)
            .ok_or_else(|| format!("班级不存在: {}", class_name))?;
        let period = routine
            .schedule
            .get_mut(&day)
            .and_then(|ps| ps.get_mut(period_index))
            .ok_or_else(|| format!("{} {} 第{}节不存在", class_name, day, period_index + 1))?;

        period.subject = subject.trim().to_string();
        period.teacher = teacher.trim().to_string();
        period.teacher_id = None;
        Ok(())
    }
}
