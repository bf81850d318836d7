// ==========================================
// 学校课表排课系统 - 教师与花名册
// ==========================================
// 教师以 teacher_id 为稳定标识, name 仅作显示
// 花名册只包含在职教师, 一次排课期间视为不可变快照
// ==========================================

use crate::domain::routine::ClassRoutine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};
use uuid::Uuid;

// ==========================================
// Teacher - 教师
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub teacher_id: String,
    pub name: String,
    pub active: bool,
    /// 可任教科目
    pub subjects: BTreeSet<String>,
    /// 可任教班级
    pub teaching_classes: BTreeSet<String>,
}

impl Teacher {
    /// 创建在职教师并分配新的稳定标识
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            teacher_id: Uuid::new_v4().to_string(),
            name: name.into(),
            active: true,
            subjects: BTreeSet::new(),
            teaching_classes: BTreeSet::new(),
        }
    }

    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects.extend(subjects.into_iter().map(Into::into));
        self
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teaching_classes
            .extend(classes.into_iter().map(Into::into));
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn teaches(&self, subject: &str) -> bool {
        self.subjects.contains(subject.trim())
    }

    pub fn qualified_for(&self, class_name: &str) -> bool {
        self.teaching_classes.contains(class_name.trim())
    }
}

// ==========================================
// 名称解析结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolution<'a> {
    Unique(&'a Teacher),
    Ambiguous(usize),
    Unknown,
}

/// 课表教师标识解析统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub resolved: usize,
    pub ambiguous: usize,
    pub unknown: usize,
}

// ==========================================
// TeacherRoster - 在职教师花名册
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct TeacherRoster {
    teachers: Vec<Teacher>,
}

impl TeacherRoster {
    /// 从教师目录构建花名册（过滤非在职教师, 保持目录顺序）
    pub fn active_from<I>(teachers: I) -> Self
    where
        I: IntoIterator<Item = Teacher>,
    {
        Self {
            teachers: teachers.into_iter().filter(|t| t.active).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.teachers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teachers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Teacher> {
        self.teachers.iter()
    }

    pub fn by_id(&self, teacher_id: &str) -> Option<&Teacher> {
        self.teachers.iter().find(|t| t.teacher_id == teacher_id)
    }

    /// 按显示名解析教师
    pub fn resolve_name(&self, name: &str) -> NameResolution<'_> {
        let name = name.trim();
        let mut matches = self.teachers.iter().filter(|t| t.name.trim() == name);
        match (matches.next(), matches.next()) {
            (None, _) => NameResolution::Unknown,
            (Some(t), None) => NameResolution::Unique(t),
            (Some(_), Some(_)) => NameResolution::Ambiguous(2 + matches.count()),
        }
    }

    /// 为课表中只有显示名的课节补全教师标识
    ///
    /// 重名或未知教师保持未解析, 后续按显示名比较
    pub fn resolve_routines(&self, routines: &mut [ClassRoutine]) -> ResolutionStats {
        let mut stats = ResolutionStats::default();

        for routine in routines.iter_mut() {
            for period in routine.schedule.values_mut().flat_map(|ps| ps.iter_mut()) {
                if period.teacher.trim().is_empty() {
                    continue;
                }
                if let Some(id) = period.teacher_id.as_deref() {
                    if self.by_id(id).is_some() {
                        stats.resolved += 1;
                        continue;
                    }
                }

                match self.resolve_name(&period.teacher) {
                    NameResolution::Unique(t) => {
                        period.teacher_id = Some(t.teacher_id.clone());
                        stats.resolved += 1;
                    }
                    NameResolution::Ambiguous(n) => {
                        period.teacher_id = None;
                        stats.ambiguous += 1;
                        debug!(teacher = %period.teacher, candidates = n, "教师重名, 无法解析标识");
                    }
                    NameResolution::Unknown => {
                        period.teacher_id = None;
                        stats.unknown += 1;
                    }
                }
            }
        }

        if stats.ambiguous > 0 || stats.unknown > 0 {
            warn!(
                resolved = stats.resolved,
                ambiguous = stats.ambiguous,
                unknown = stats.unknown,
                "部分课节教师未能解析为花名册成员"
            );
        }

        stats
    }
}
