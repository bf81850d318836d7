// ==========================================
// 学校课表排课系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换下层错误为用户友好的错误消息
// ==========================================

use crate::domain::rule::RuleBookError;
use crate::engine::error::TimetableError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("课表已被修改: school_id={school_id}, expected_revision={expected_revision}, actual_revision={actual_revision}")]
    StaleRevision {
        school_id: String,
        expected_revision: i64,
        actual_revision: i64,
    },

    // ==========================================
    // 排课错误
    // ==========================================
    #[error("排课失败: {0}")]
    GenerationFailed(String),

    #[error("排课已取消")]
    GenerationCancelled,

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发控制错误
            RepositoryError::OptimisticLockFailure {
                school_id,
                expected,
                actual,
            } => ApiError::StaleRevision {
                school_id,
                expected_revision: expected,
                actual_revision: actual,
            },

            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }

            // 数据质量错误
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("字段{}: {}", field, message))
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),

            RepositoryError::Other(e) => ApiError::Other(e),
        }
    }
}

// ==========================================
// 从 TimetableError 转换
// ==========================================
impl From<TimetableError> for ApiError {
    fn from(err: TimetableError) -> Self {
        match err {
            TimetableError::Cancelled => ApiError::GenerationCancelled,
            TimetableError::NoRules => {
                ApiError::BusinessRuleViolation("未配置任何作息规则".to_string())
            }
            TimetableError::Exhausted { attempts, last } => ApiError::GenerationFailed(format!(
                "尝试 {} 次均未得到可解析的课表, 最后一次错误: {}",
                attempts, last
            )),
            other => ApiError::GenerationFailed(other.to_string()),
        }
    }
}

impl From<RuleBookError> for ApiError {
    fn from(err: RuleBookError) -> Self {
        match err {
            RuleBookError::UnknownRule(id) => ApiError::NotFound(format!("作息规则(id={})不存在", id)),
            other => ApiError::InvalidInput(other.to_string()),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(e) => ApiError::from(e),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
