// ==========================================
// 学校课表排课系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 串联仓储、配置与引擎
// ==========================================

pub mod error;
pub mod timetable_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use timetable_api::{GenerationResponse, ManualWorkspace, TimetableApi};
