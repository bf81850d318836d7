// ==========================================
// 学校课表排课系统 - 应用层
// ==========================================
// 职责: 组装共享连接、仓储、配置与 API
// ==========================================

pub mod state;

// 重导出
pub use state::AppState;
pub use crate::db::get_default_db_path;
