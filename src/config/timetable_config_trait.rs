// ==========================================
// 学校课表排课系统 - 排课配置读取 Trait
// ==========================================
// 职责: 定义排课流程所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::engine::orchestrator::GenerationSettings;
use async_trait::async_trait;
use std::error::Error;
use std::time::Duration;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// TimetableConfigReader Trait
// ==========================================
// 用途: 排课流程所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取, 学校作用域覆写全局）
#[async_trait]
pub trait TimetableConfigReader: Send + Sync {
    /// 教师单日课时上限
    ///
    /// # 默认值
    /// - 6
    async fn get_max_classes_per_teacher(&self, school_id: &str) -> ConfigResult<u32>;

    /// 最大尝试次数（至少为 1）
    ///
    /// # 默认值
    /// - 3
    async fn get_max_retries(&self, school_id: &str) -> ConfigResult<u32>;

    /// 单次生成器调用时限
    ///
    /// # 返回
    /// - None: 不限时（配置值为 0）
    ///
    /// # 默认值
    /// - 120 秒
    async fn get_oracle_timeout(&self, school_id: &str) -> ConfigResult<Option<Duration>>;

    /// 重试时是否携带上一次冲突
    ///
    /// # 默认值
    /// - false
    async fn get_retry_feedback(&self, school_id: &str) -> ConfigResult<bool>;

    /// 附加排课说明
    async fn get_special_instructions(&self, school_id: &str) -> ConfigResult<String>;

    /// 汇总为一次排课的参数快照
    async fn load_generation_settings(&self, school_id: &str) -> ConfigResult<GenerationSettings> {
        Ok(GenerationSettings {
            max_retries: self.get_max_retries(school_id).await?,
            max_classes_per_teacher: self.get_max_classes_per_teacher(school_id).await?,
            oracle_timeout: self.get_oracle_timeout(school_id).await?,
            retry_feedback: self.get_retry_feedback(school_id).await?,
            special_instructions: self.get_special_instructions(school_id).await?,
        })
    }
}
