// ==========================================
// 学校课表排课系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + Tokio
// 主流程: 生成 -> 校验 -> 局部修复 -> 重试/接受
// 人工录入: 骨架 -> 填写 -> 原样保存
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{PeriodType, Weekday};

// 领域实体
pub use domain::{
    ClassRoutine, Conflict, DayRule, DayRuleBook, Period, RecessCount, Section, Teacher,
    TeacherRoster, ValidationReport,
};

// 引擎
pub use engine::{
    AssignmentOracle, CancelToken, ConflictValidator, GenerationOrchestrator, GenerationRequest,
    GenerationSettings, LocalRepairEngine, ManualEntry, OracleError, RuleEngine, SlotMaterializer,
    TimetableError,
};

// API
pub use api::{ApiError, TimetableApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "学校课表排课系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
