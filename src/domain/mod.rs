// ==========================================
// 学校课表排课系统 - 领域层
// ==========================================
// 职责: 实体与值类型, 不含存储与编排逻辑
// ==========================================

pub mod conflict;
pub mod routine;
pub mod rule;
pub mod teacher;
pub mod time;
pub mod types;

// 重导出核心领域类型
pub use conflict::{Conflict, ValidationReport};
pub use routine::{ClassRoutine, Period, WeeklySchedule};
pub use rule::{DayRule, DayRuleBook, RecessCount, RuleBookError, Section};
pub use teacher::{NameResolution, ResolutionStats, Teacher, TeacherRoster};
pub use types::{PeriodType, Weekday};
