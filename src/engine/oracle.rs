// ==========================================
// 学校课表排课系统 - 排课生成器接口
// ==========================================
// 生成器是外部的非确定性组件（视为黑盒）
// 输入: 结构化请求（渲染为自然语言说明）
// 输出: 期望包含班级课表 JSON 数组的自由文本
// ==========================================
// 说明: Engine 层只定义 trait, 具体接入（HTTP/本地模型）由调用方实现
// ==========================================

use crate::engine::error::OracleError;
use crate::engine::request::GenerationRequest;
use async_trait::async_trait;

// ==========================================
// AssignmentOracle Trait
// ==========================================
#[async_trait]
pub trait AssignmentOracle: Send + Sync {
    /// 根据请求生成候选课表文本
    ///
    /// # 返回
    /// - Ok(String): 原始响应文本（未经清洗）
    /// - Err(OracleError): 调用失败（可重试）
    async fn generate_candidate(&self, request: &GenerationRequest) -> Result<String, OracleError>;
}
