// ==========================================
// 学校课表排课系统 - 引擎层
// ==========================================
// 职责: 作息展开、冲突校验、局部修复、生成控制环
// 红线: Engine 不拼 SQL
// ==========================================

pub mod cancel;
pub mod error;
pub mod manual;
pub mod materializer;
pub mod oracle;
pub mod orchestrator;
pub mod parser;
pub mod repair;
pub mod repositories;
pub mod request;
pub mod rule_engine;
pub mod validator;

// 重导出核心引擎
pub use cancel::{cancel_pair, CancelHandle, CancelToken};
pub use error::{OracleError, TimetableError, TimetableResult};
pub use manual::ManualEntry;
pub use materializer::SlotMaterializer;
pub use oracle::AssignmentOracle;
pub use orchestrator::{
    GenerationInput, GenerationOrchestrator, GenerationOutcome, GenerationSettings, GenerationState,
};
pub use parser::ResponseParser;
pub use repair::{LocalRepairEngine, RepairAction, RepairOutcome};
pub use repositories::TimetableRepositories;
pub use request::GenerationRequest;
pub use rule_engine::RuleEngine;
pub use validator::ConflictValidator;
