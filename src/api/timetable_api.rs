// ==========================================
// 学校课表排课系统 - 课表 API
// ==========================================
// 职责:
// 1. 自动排课（生成 -> 校验 -> 修复 -> 保存）
// 2. 人工录入（骨架 -> 填写 -> 原样保存）
// 3. 已保存课表的冲突检查
// 4. 作息规则维护
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::TimetableConfigReader;
use crate::domain::conflict::ValidationReport;
use crate::domain::routine::ClassRoutine;
use crate::domain::rule::{DayRule, DayRuleBook};
use crate::domain::teacher::TeacherRoster;
use crate::domain::types::Weekday;
use crate::engine::cancel::CancelToken;
use crate::engine::manual::ManualEntry;
use crate::engine::oracle::AssignmentOracle;
use crate::engine::orchestrator::{GenerationInput, GenerationOrchestrator, GenerationState};
use crate::engine::repair::RepairAction;
use crate::engine::repositories::TimetableRepositories;
use crate::engine::validator::ConflictValidator;
use crate::repository::StoredRoutineSet;

// ==========================================
// 响应 DTO
// ==========================================

/// 自动排课结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub school_id: String,
    /// 保存后的修订号
    pub revision: i64,
    pub routines: Vec<ClassRoutine>,
    pub attempts: u32,
    pub report: ValidationReport,
    pub repairs: Vec<RepairAction>,
    /// 接受时仍存在的冲突
    pub warnings: Vec<String>,
    pub trace: Vec<GenerationState>,
}

/// 人工录入工作区
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualWorkspace {
    pub school_id: String,
    /// 已保存修订号（未保存过为 0）, 保存时作为期望修订号
    pub revision: i64,
    pub routines: Vec<ClassRoutine>,
}

// ==========================================
// TimetableApi - 课表 API
// ==========================================

pub struct TimetableApi {
    repos: TimetableRepositories,
    config: Arc<dyn TimetableConfigReader>,
    manual: ManualEntry,
    validator: ConflictValidator,
}

impl TimetableApi {
    /// 创建新的TimetableApi实例
    pub fn new(repos: TimetableRepositories, config: Arc<dyn TimetableConfigReader>) -> Self {
        Self {
            repos,
            config,
            manual: ManualEntry::new(),
            validator: ConflictValidator::new(),
        }
    }

    // ==========================================
    // 自动排课
    // ==========================================

    /// 生成并保存课表
    ///
    /// # 参数
    /// - school_id: 学校ID
    /// - oracle: 排课生成器
    /// - cancel: 取消令牌
    ///
    /// # 返回
    /// - Ok(GenerationResponse): 已保存的课表（可能带冲突警告）
    /// - Err(ApiError): 输入缺失、排课失败或取消; 失败时不写入任何课表
    #[instrument(skip(self, oracle, cancel))]
    pub async fn generate(
        &self,
        school_id: &str,
        oracle: Arc<dyn AssignmentOracle>,
        cancel: &CancelToken,
    ) -> ApiResult<GenerationResponse> {
        ensure_school_id(school_id)?;

        let class_names = self.repos.class_repo.list_class_names(school_id)?;
        if class_names.is_empty() {
            return Err(ApiError::InvalidInput(format!("学校{}未配置班级", school_id)));
        }
        let rule_book = self.repos.day_rule_repo.load_book(school_id)?;
        let teachers = self.repos.teacher_repo.list_all(school_id)?;
        let settings = self
            .config
            .load_generation_settings(school_id)
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let orchestrator = GenerationOrchestrator::new(oracle, settings);
        let outcome = orchestrator
            .generate(
                GenerationInput {
                    school_id,
                    class_names: &class_names,
                    rule_book: &rule_book,
                    teachers: &teachers,
                },
                cancel,
            )
            .await?;

        let revision = self
            .repos
            .routine_repo
            .save(school_id, &outcome.routines, None)?;

        if outcome.accepted_with_conflicts() {
            warn!(
                school_id = %school_id,
                revision,
                conflicts = outcome.warnings.len(),
                "课表带冲突保存"
            );
        } else {
            info!(school_id = %school_id, revision, attempts = outcome.attempts, "课表已生成并保存");
        }

        Ok(GenerationResponse {
            school_id: school_id.to_string(),
            revision,
            routines: outcome.routines,
            attempts: outcome.attempts,
            report: outcome.report,
            repairs: outcome.repairs,
            warnings: outcome.warnings,
            trace: outcome.trace,
        })
    }

    // ==========================================
    // 人工录入
    // ==========================================

    /// 载入人工录入工作区
    ///
    /// 已保存课表原样返回, 未保存的班级补空白骨架
    pub fn manual_skeleton(&self, school_id: &str) -> ApiResult<ManualWorkspace> {
        ensure_school_id(school_id)?;

        let rule_book = self.repos.day_rule_repo.load_book(school_id)?;
        let class_names = self.repos.class_repo.list_class_names(school_id)?;
        let stored = self.repos.routine_repo.find(school_id)?;
        let revision = stored.as_ref().map_or(0, |s| s.revision);

        let routines = self
            .manual
            .load_or_skeleton(&rule_book, &class_names, stored.map(|s| s.routines))?;

        Ok(ManualWorkspace {
            school_id: school_id.to_string(),
            revision,
            routines,
        })
    }

    /// 保存人工录入的课表（不做冲突校验）
    ///
    /// # 参数
    /// - expected_revision: 期望修订号（None 表示直接覆盖）
    ///
    /// # 返回
    /// - Ok(i64): 新修订号
    /// - Err(StaleRevision): 期间已被其他保存覆盖
    pub fn save_manual(
        &self,
        school_id: &str,
        routines: Vec<ClassRoutine>,
        expected_revision: Option<i64>,
    ) -> ApiResult<i64> {
        ensure_school_id(school_id)?;
        if routines.iter().any(|r| r.class_name.trim().is_empty()) {
            return Err(ApiError::InvalidInput("班级名不能为空".to_string()));
        }

        let revision = self
            .repos
            .routine_repo
            .save(school_id, &routines, expected_revision)?;
        info!(school_id = %school_id, revision, classes = routines.len(), "人工课表已保存");
        Ok(revision)
    }

    /// 检查已保存课表的冲突（只读）
    pub async fn validate_saved(&self, school_id: &str) -> ApiResult<ValidationReport> {
        ensure_school_id(school_id)?;

        let mut routines = self
            .repos
            .routine_repo
            .find(school_id)?
            .map(|s| s.routines)
            .ok_or_else(|| ApiError::NotFound(format!("学校{}尚无课表", school_id)))?;

        let roster = TeacherRoster::active_from(self.repos.teacher_repo.list_all(school_id)?);
        roster.resolve_routines(&mut routines);

        let cap = self
            .config
            .get_max_classes_per_teacher(school_id)
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        Ok(self.validator.validate(&routines, cap))
    }

    /// 读取已保存课表
    pub fn load_routines(&self, school_id: &str) -> ApiResult<Option<StoredRoutineSet>> {
        ensure_school_id(school_id)?;
        Ok(self.repos.routine_repo.find(school_id)?)
    }

    // ==========================================
    // 作息规则维护
    // ==========================================

    pub fn load_rule_book(&self, school_id: &str) -> ApiResult<DayRuleBook> {
        ensure_school_id(school_id)?;
        Ok(self.repos.day_rule_repo.load_book(school_id)?)
    }

    /// 新增作息规则并划入教学日
    pub fn add_rule(&self, school_id: &str, rule: DayRule, days: &[Weekday]) -> ApiResult<()> {
        ensure_school_id(school_id)?;
        let mut book = self.repos.day_rule_repo.load_book(school_id)?;
        book.add_rule(rule, days)?;
        self.repos.day_rule_repo.save_book(school_id, &book)?;
        Ok(())
    }

    /// 把教学日划给指定规则（自动从原规则移除）
    pub fn assign_rule_day(&self, school_id: &str, rule_id: &str, day: Weekday) -> ApiResult<()> {
        ensure_school_id(school_id)?;
        let mut book = self.repos.day_rule_repo.load_book(school_id)?;
        let previous = book.assigned_rule_id(day).map(str::to_string);
        book.assign_day(day, rule_id)?;
        self.repos.day_rule_repo.save_book(school_id, &book)?;

        info!(
            school_id = %school_id,
            day = %day,
            rule_id = %rule_id,
            previous = ?previous,
            "教学日归属已更新"
        );
        Ok(())
    }

    /// 修改作息规则的课节结构（教学日归属不变）
    pub fn update_rule(&self, school_id: &str, rule: DayRule) -> ApiResult<()> {
        ensure_school_id(school_id)?;
        let mut book = self.repos.day_rule_repo.load_book(school_id)?;
        let rule_id = rule.id.clone();
        book.update_rule(rule)?;
        self.repos.day_rule_repo.save_book(school_id, &book)?;
        info!(school_id = %school_id, rule_id = %rule_id, "作息规则已更新");
        Ok(())
    }

    /// 取消教学日归属, 该日回退到第一条规则
    ///
    /// # 返回
    /// - Ok(Some(rule_id)): 原归属规则
    /// - Ok(None): 该日本就未归属
    pub fn unassign_rule_day(&self, school_id: &str, day: Weekday) -> ApiResult<Option<String>> {
        ensure_school_id(school_id)?;
        let mut book = self.repos.day_rule_repo.load_book(school_id)?;
        let previous = book.unassign_day(day);
        if previous.is_some() {
            self.repos.day_rule_repo.save_book(school_id, &book)?;
        }
        Ok(previous)
    }

    /// 删除作息规则, 其教学日回退到第一条规则
    pub fn remove_rule(&self, school_id: &str, rule_id: &str) -> ApiResult<DayRule> {
        ensure_school_id(school_id)?;
        let mut book = self.repos.day_rule_repo.load_book(school_id)?;
        let removed = book.remove_rule(rule_id)?;
        self.repos.day_rule_repo.save_book(school_id, &book)?;
        Ok(removed)
    }
}

fn ensure_school_id(school_id: &str) -> ApiResult<()> {
    if school_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("学校ID不能为空".to_string()));
    }
    Ok(())
}
