// ==========================================
// 学校课表排课系统 - 引擎层错误类型
// ==========================================
// 错误分类:
// - Oracle / Timeout / Parse: 单次尝试失败, 可重试
// - StructuralMismatch: 响应不是数组, 立即失败
// - Cancelled / Exhausted / NoRules: 终止
// 约束冲突不是错误, 以 ValidationReport 返回
// ==========================================

use thiserror::Error;

/// 排课生成器调用错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("生成器调用失败: {0}")]
    Transport(String),

    #[error("生成器拒绝请求: {0}")]
    Rejected(String),
}

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum TimetableError {
    // ===== 可重试 =====
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("生成器调用超时: {secs}秒")]
    Timeout { secs: u64 },

    #[error("响应解析失败: {0}")]
    Parse(String),

    // ===== 不可重试 =====
    #[error("响应结构不符: 期望班级课表数组, 实际为 {found}")]
    StructuralMismatch { found: String },

    #[error("排课已取消")]
    Cancelled,

    #[error("尝试 {attempts} 次均未得到可解析的课表")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<TimetableError>,
    },

    #[error("未配置任何作息规则")]
    NoRules,
}

impl TimetableError {
    /// 是否可在下一次尝试中重试
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TimetableError::Oracle(_) | TimetableError::Timeout { .. } | TimetableError::Parse(_)
        )
    }
}

/// Result 类型别名
pub type TimetableResult<T> = Result<T, TimetableError>;
