// ==========================================
// 学校课表排课系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合排课流程所需的所有 Repository
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{ClassRepository, DayRuleRepository, RoutineRepository, TeacherRepository};

/// 排课仓储集合
///
/// # 包含的仓储
/// - `day_rule_repo`: 作息规则
/// - `teacher_repo`: 教师目录
/// - `class_repo`: 班级列表
/// - `routine_repo`: 班级课表文档
#[derive(Clone)]
pub struct TimetableRepositories {
    /// 作息规则仓储
    pub day_rule_repo: Arc<DayRuleRepository>,
    /// 教师目录仓储
    pub teacher_repo: Arc<TeacherRepository>,
    /// 班级仓储
    pub class_repo: Arc<ClassRepository>,
    /// 课表仓储
    pub routine_repo: Arc<RoutineRepository>,
}

impl TimetableRepositories {
    /// 创建新的仓储集合
    pub fn new(
        day_rule_repo: Arc<DayRuleRepository>,
        teacher_repo: Arc<TeacherRepository>,
        class_repo: Arc<ClassRepository>,
        routine_repo: Arc<RoutineRepository>,
    ) -> Self {
        Self {
            day_rule_repo,
            teacher_repo,
            class_repo,
            routine_repo,
        }
    }

    /// 所有仓储共享同一连接
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            day_rule_repo: Arc::new(DayRuleRepository::from_connection(conn.clone())),
            teacher_repo: Arc::new(TeacherRepository::from_connection(conn.clone())),
            class_repo: Arc::new(ClassRepository::from_connection(conn.clone())),
            routine_repo: Arc::new(RoutineRepository::from_connection(conn)),
        }
    }
}
