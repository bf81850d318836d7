// ==========================================
// Mock 排课生成器 - 用于集成测试
// ==========================================
// 按脚本顺序返回响应, 脚本用完后返回调用失败
// ==========================================

use async_trait::async_trait;
use school_timetable::engine::{AssignmentOracle, GenerationRequest, OracleError};
use std::collections::VecDeque;
use std::sync::Mutex;

pub struct MockOracle {
    script: Mutex<VecDeque<Result<String, OracleError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockOracle {
    pub fn new(script: Vec<Result<String, OracleError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 每次都返回同一响应
    pub fn repeating(response: &str, times: usize) -> Self {
        Self::new((0..times).map(|_| Ok(response.to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AssignmentOracle for MockOracle {
    async fn generate_candidate(&self, request: &GenerationRequest) -> Result<String, OracleError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::Transport("脚本已用完".to_string())))
    }
}
