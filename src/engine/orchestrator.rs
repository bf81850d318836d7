// ==========================================
// 学校课表排课系统 - 生成编排器
// ==========================================
// 状态机:
// BUILDING_REQUEST -> AWAITING_ORACLE -> PARSING -> VALIDATING
//   -> (REPAIRING -> REVALIDATING)? -> ACCEPTED | RETRY | FAILED
// ==========================================
// 规则:
// - 修复每次尝试至多执行一次, 修复后只再校验一次
// - 达到最大尝试次数时接受最佳候选, 剩余冲突作为警告返回
// - 生成器/解析失败可重试; 响应非数组立即失败
// - 从未解析成功且次数耗尽 -> 失败, 不产生课表
// ==========================================

use crate::domain::conflict::ValidationReport;
use crate::domain::routine::ClassRoutine;
use crate::domain::rule::DayRuleBook;
use crate::domain::teacher::{Teacher, TeacherRoster};
use crate::engine::cancel::CancelToken;
use crate::engine::error::{TimetableError, TimetableResult};
use crate::engine::oracle::AssignmentOracle;
use crate::engine::parser::ResponseParser;
use crate::engine::repair::{LocalRepairEngine, RepairAction};
use crate::engine::request::GenerationRequest;
use crate::engine::validator::ConflictValidator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};


/// 默认最大尝试次数
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// 默认教师单日课时上限
pub const DEFAULT_MAX_CLASSES_PER_TEACHER: u32 = 6;

// ==========================================
// GenerationSettings - 单次排课参数快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub max_retries: u32,
    pub max_classes_per_teacher: u32,
    /// 单次生成器调用时限（None 表示不限时）
    pub oracle_timeout: Option<Duration>,
    /// 是否把上一次尝试的冲突写入下一次请求
    pub retry_feedback: bool,
    pub special_instructions: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            max_classes_per_teacher: DEFAULT_MAX_CLASSES_PER_TEACHER,
            oracle_timeout: Some(Duration::from_secs(120)),
            retry_feedback: false,
            special_instructions: String::new(),
        }
    }
}

// ==========================================
// GenerationState - 编排状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationState {
    BuildingRequest,
    AwaitingOracle,
    Parsing,
    Validating,
    Repairing,
    Revalidating,
    Accepted,
    Retry,
    Failed,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GenerationState::BuildingRequest => "BUILDING_REQUEST",
            GenerationState::AwaitingOracle => "AWAITING_ORACLE",
            GenerationState::Parsing => "PARSING",
            GenerationState::Validating => "VALIDATING",
            GenerationState::Repairing => "REPAIRING",
            GenerationState::Revalidating => "REVALIDATING",
            GenerationState::Accepted => "ACCEPTED",
            GenerationState::Retry => "RETRY",
            GenerationState::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// GenerationInput - 排课输入快照
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct GenerationInput<'a> {
    pub school_id: &'a str,
    pub class_names: &'a [String],
    pub rule_book: &'a DayRuleBook,
    /// 教师目录（含非在职教师, 内部过滤）
    pub teachers: &'a [Teacher],
}

// ==========================================
// GenerationOutcome - 排课结果
// ==========================================
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub routines: Vec<ClassRoutine>,
    /// 实际使用的尝试次数
    pub attempts: u32,
    /// 最终课表的校验报告
    pub report: ValidationReport,
    /// 最终课表所经历的修复
    pub repairs: Vec<RepairAction>,
    /// 接受时仍存在的冲突
    pub warnings: Vec<String>,
    /// 状态轨迹
    pub trace: Vec<GenerationState>,
}

impl GenerationOutcome {
    pub fn accepted_with_conflicts(&self) -> bool {
        !self.report.valid
    }
}

/// 单次尝试得到的候选
#[derive(Debug, Clone)]
struct Candidate {
    routines: Vec<ClassRoutine>,
    report: ValidationReport,
    repairs: Vec<RepairAction>,
}

// ==========================================
// GenerationOrchestrator - 生成编排器
// ==========================================

pub struct GenerationOrchestrator<O>
where
    O: AssignmentOracle + ?Sized,
{
    oracle: Arc<O>,
    settings: GenerationSettings,
    parser: ResponseParser,
    validator: ConflictValidator,
    repairer: LocalRepairEngine,
}

impl<O> GenerationOrchestrator<O>
where
    O: AssignmentOracle + ?Sized,
{
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - oracle: 排课生成器
    /// - settings: 排课参数快照
    pub fn new(oracle: Arc<O>, settings: GenerationSettings) -> Self {
        Self {
            oracle,
            settings,
            parser: ResponseParser::new(),
            validator: ConflictValidator::new(),
            repairer: LocalRepairEngine::new(),
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// 执行完整排课流程
    ///
    /// # 返回
    /// - Ok(GenerationOutcome): 已接受的课表（可能带冲突警告）
    /// - Err(StructuralMismatch): 响应不是数组
    /// - Err(Exhausted): 所有尝试均未解析出课表
    /// - Err(Cancelled): 被调用方取消
    pub async fn generate(
        &self,
        input: GenerationInput<'_>,
        cancel: &CancelToken,
    ) -> TimetableResult<GenerationOutcome> {
        let max_retries = self.settings.max_retries.max(1);
        let mut trace = Vec::new();
        enter(&mut trace, GenerationState::BuildingRequest);

        info!(
            school_id = %input.school_id,
            classes = input.class_names.len(),
            max_retries = max_retries,
            "开始生成课表"
        );

        // ==========================================
        // BUILDING_REQUEST
        // ==========================================
        let roster = TeacherRoster::active_from(input.teachers.iter().cloned());
        let base_request = GenerationRequest::build(
            input.school_id,
            input.class_names,
            input.rule_book,
            &roster,
            &self.settings.special_instructions,
            self.settings.max_classes_per_teacher,
        )?;

        let mut best: Option<Candidate> = None;
        let mut last_error: Option<TimetableError> = None;
        let mut feedback: Vec<String> = Vec::new();

        for attempt in 1..=max_retries {
            if cancel.is_cancelled() {
                enter(&mut trace, GenerationState::Failed);
                return Err(TimetableError::Cancelled);
            }

            let request = if self.settings.retry_feedback && !feedback.is_empty() {
                base_request.with_feedback(&feedback)
            } else {
                base_request.clone()
            };

            // ==========================================
            // AWAITING_ORACLE
            // ==========================================
            enter(&mut trace, GenerationState::AwaitingOracle);
            debug!(attempt = attempt, "等待生成器响应");

            let raw = match self.call_oracle(&request, cancel).await {
                Ok(raw) => raw,
                Err(TimetableError::Cancelled) => {
                    enter(&mut trace, GenerationState::Failed);
                    return Err(TimetableError::Cancelled);
                }
                Err(e) => {
                    warn!(attempt = attempt, error = %e, "生成器调用失败");
                    last_error = Some(e);
                    if attempt < max_retries {
                        enter(&mut trace, GenerationState::Retry);
                    }
                    continue;
                }
            };

            // ==========================================
            // PARSING
            // ==========================================
            enter(&mut trace, GenerationState::Parsing);
            let mut routines = match self.parser.parse(&raw) {
                Ok(routines) => routines,
                Err(e) if e.is_retryable() => {
                    warn!(attempt = attempt, error = %e, "响应解析失败");
                    last_error = Some(e);
                    if attempt < max_retries {
                        enter(&mut trace, GenerationState::Retry);
                    }
                    continue;
                }
                Err(e) => {
                    warn!(attempt = attempt, error = %e, "响应结构不符, 终止排课");
                    enter(&mut trace, GenerationState::Failed);
                    return Err(e);
                }
            };
            roster.resolve_routines(&mut routines);

            // ==========================================
            // VALIDATING
            // ==========================================
            enter(&mut trace, GenerationState::Validating);
            let report = self
                .validator
                .validate(&routines, self.settings.max_classes_per_teacher);

            let candidate = if report.valid {
                Candidate {
                    routines,
                    report,
                    repairs: Vec::new(),
                }
            } else {
                // ==========================================
                // REPAIRING -> REVALIDATING
                // ==========================================
                enter(&mut trace, GenerationState::Repairing);
                let outcome = self.repairer.repair(&routines, &roster);

                enter(&mut trace, GenerationState::Revalidating);
                let revalidated = self
                    .validator
                    .validate(&outcome.routines, self.settings.max_classes_per_teacher);

                info!(
                    attempt = attempt,
                    conflicts_before = report.conflict_count(),
                    conflicts_after = revalidated.conflict_count(),
                    repairs = outcome.actions.len(),
                    "修复后重新校验完成"
                );

                Candidate {
                    routines: outcome.routines,
                    report: revalidated,
                    repairs: outcome.actions,
                }
            };

            if candidate.report.valid {
                enter(&mut trace, GenerationState::Accepted);
                info!(attempt = attempt, "课表无冲突, 接受");
                return Ok(Self::accept(candidate, attempt, trace));
            }

            feedback = candidate.report.errors.clone();
            if best
                .as_ref()
                .map_or(true, |b| candidate.report.conflict_count() <= b.report.conflict_count())
            {
                best = Some(candidate);
            }

            if attempt < max_retries {
                enter(&mut trace, GenerationState::Retry);
                debug!(attempt = attempt, "课表仍有冲突, 重试");
            }
        }

        // ==========================================
        // 次数耗尽
        // ==========================================
        match best {
            Some(candidate) => {
                enter(&mut trace, GenerationState::Accepted);
                warn!(
                    attempts = max_retries,
                    remaining_conflicts = candidate.report.conflict_count(),
                    "达到最大尝试次数, 接受最佳候选"
                );
                Ok(Self::accept(candidate, max_retries, trace))
            }
            None => {
                enter(&mut trace, GenerationState::Failed);
                let last = last_error.unwrap_or_else(|| {
                    TimetableError::Parse("生成器未返回任何候选".to_string())
                });
                warn!(attempts = max_retries, error = %last, "所有尝试均失败");
                Err(TimetableError::Exhausted {
                    attempts: max_retries,
                    last: Box::new(last),
                })
            }
        }
    }

    /// 调用生成器（带时限与取消）
    async fn call_oracle(
        &self,
        request: &GenerationRequest,
        cancel: &CancelToken,
    ) -> TimetableResult<String> {
        let call = async {
            match self.settings.oracle_timeout {
                Some(limit) => match tokio::time::timeout(limit, self.oracle.generate_candidate(request)).await {
                    Ok(result) => result.map_err(TimetableError::from),
                    Err(_) => Err(TimetableError::Timeout {
                        secs: limit.as_secs(),
                    }),
                },
                None => self
                    .oracle
                    .generate_candidate(request)
                    .await
                    .map_err(TimetableError::from),
            }
        };

        tokio::select! {
            result = call => result,
            _ = cancel.cancelled() => Err(TimetableError::Cancelled),
        }
    }

    fn accept(candidate: Candidate, attempts: u32, trace: Vec<GenerationState>) -> GenerationOutcome {
        GenerationOutcome {
            warnings: candidate.report.errors.clone(),
            routines: candidate.routines,
            attempts,
            report: candidate.report,
            repairs: candidate.repairs,
            trace,
        }
    }
}

/// 记录状态迁移
fn enter(trace: &mut Vec<GenerationState>, state: GenerationState) {
    debug!(from = ?trace.last(), to = %state, "状态迁移");
    trace.push(state);
}
