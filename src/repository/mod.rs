// ==========================================
// 学校课表排课系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod class_repo;
pub mod day_rule_repo;
pub mod error;
pub mod routine_repo;
pub mod teacher_repo;

// 重导出核心仓储
pub use class_repo::ClassRepository;
pub use day_rule_repo::DayRuleRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use routine_repo::{RoutineRepository, StoredRoutineSet};
pub use teacher_repo::TeacherRepository;
