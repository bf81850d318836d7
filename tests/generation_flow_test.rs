// ==========================================
// 自动排课端到端测试
// ==========================================
// 测试目标: API -> 编排器 -> 仓储 的完整流程
// 生成器使用脚本化 Mock
// ==========================================

mod helpers;

use helpers::mock_oracle::MockOracle;
use helpers::test_data_builder::*;
use school_timetable::api::ApiError;
use school_timetable::app::AppState;
use school_timetable::config::{config_keys, ConfigScope};
use school_timetable::engine::{cancel_pair, CancelToken, GenerationState, OracleError};
use school_timetable::logging;
use school_timetable::Weekday;
use std::sync::Arc;

fn setup() -> (tempfile::NamedTempFile, AppState) {
    logging::init_test();
    let (temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();
    seed_school(&state);
    (temp_file, state)
}

#[tokio::test]
async fn test_clean_candidate_is_accepted_and_saved() {
    let (_tmp, state) = setup();
    let oracle = Arc::new(MockOracle::new(vec![Ok(to_json(&clean_routines()))]));

    let response = state
        .timetable_api
        .generate(SCHOOL_ID, oracle.clone(), &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(oracle.calls(), 1);
    assert_eq!(response.attempts, 1);
    assert_eq!(response.revision, 1);
    assert!(response.report.valid);
    assert!(response.warnings.is_empty());
    assert_eq!(response.trace.last(), Some(&GenerationState::Accepted));

    let stored = state.timetable_api.load_routines(SCHOOL_ID).unwrap().unwrap();
    assert_eq!(stored.revision, 1);
    assert_eq!(stored.routines.len(), 2);
    assert_eq!(stored.routines[0].day(Weekday::Monday)[0].teacher, "Rahim");
}

#[tokio::test]
async fn test_request_carries_rules_and_active_roster() {
    let (_tmp, state) = setup();
    state
        .timetable_api
        .add_rule(SCHOOL_ID, saturday_rule(), &[Weekday::Saturday])
        .unwrap();
    let oracle = Arc::new(MockOracle::new(vec![Ok(to_json(&clean_routines()))]));

    state
        .timetable_api
        .generate(SCHOOL_ID, oracle.clone(), &CancelToken::never())
        .await
        .unwrap();

    let request = oracle.last_request().unwrap();
    assert_eq!(request.classes, classes());
    assert_eq!(request.day_rules.len(), 2);
    assert_eq!(request.teacher_roster.len(), 3);
    assert_eq!(request.max_classes_per_teacher, 6);
}

#[tokio::test]
async fn test_double_booking_is_repaired_before_saving() {
    let (_tmp, state) = setup();
    let oracle = Arc::new(MockOracle::new(vec![Ok(to_json(&double_booked_routines()))]));

    let response = state
        .timetable_api
        .generate(SCHOOL_ID, oracle.clone(), &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(oracle.calls(), 1);
    assert!(response.report.valid);
    assert_eq!(response.repairs.len(), 1);
    assert_eq!(response.repairs[0].class_name, "Seven");
    assert_eq!(response.repairs[0].to_teacher, "Karim");
    assert!(response.trace.contains(&GenerationState::Repairing));

    let stored = state.timetable_api.load_routines(SCHOOL_ID).unwrap().unwrap();
    let seven = &stored.routines[1];
    assert_eq!(seven.day(Weekday::Monday)[0].teacher, "Karim");
    assert_eq!(stored.routines[0].day(Weekday::Monday)[0].teacher, "Rahim");
}

#[tokio::test]
async fn test_unresolvable_conflict_saved_with_warnings_after_max_retries() {
    let (_tmp, state) = setup();
    let routines = fill(skeletons(), |class, day, idx| match (class, day, idx) {
        ("Six", Weekday::Monday, 0) => ("English", "Nadia"),
        ("Six", _, _) => ("Math", "Rahim"),
        _ => ("English", "Nadia"),
    });
    let oracle = Arc::new(MockOracle::repeating(&to_json(&routines), 3));

    let response = state
        .timetable_api
        .generate(SCHOOL_ID, oracle.clone(), &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(oracle.calls(), 3);
    assert_eq!(response.attempts, 3);
    assert!(!response.report.valid);
    assert_eq!(response.warnings.len(), 1);
    assert!(response.warnings[0].contains("Nadia"));
    assert!(state.timetable_api.load_routines(SCHOOL_ID).unwrap().is_some());
}

#[tokio::test]
async fn test_school_max_retries_override_is_used() {
    let (_tmp, state) = setup();
    state
        .config_manager
        .set_config(&ConfigScope::school(SCHOOL_ID), config_keys::MAX_RETRIES, "1")
        .unwrap();
    let routines = fill(skeletons(), |class, day, idx| match (class, day, idx) {
        ("Six", Weekday::Monday, 0) => ("English", "Nadia"),
        ("Six", _, _) => ("Math", "Rahim"),
        _ => ("English", "Nadia"),
    });
    let oracle = Arc::new(MockOracle::repeating(&to_json(&routines), 3));

    let response = state
        .timetable_api
        .generate(SCHOOL_ID, oracle.clone(), &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(oracle.calls(), 1);
    assert_eq!(response.attempts, 1);
}

#[tokio::test]
async fn test_retry_after_unparseable_response() {
    let (_tmp, state) = setup();
    let oracle = Arc::new(MockOracle::new(vec![
        Ok("I could not produce a timetable.".to_string()),
        Err(OracleError::Transport("connection reset".to_string())),
        Ok(format!("```json\n{}\n```", to_json(&clean_routines()))),
    ]));

    let response = state
        .timetable_api
        .generate(SCHOOL_ID, oracle.clone(), &CancelToken::never())
        .await
        .unwrap();

    assert_eq!(oracle.calls(), 3);
    assert_eq!(response.attempts, 3);
    assert!(response.report.valid);
}

#[tokio::test]
async fn test_failed_generation_writes_nothing() {
    let (_tmp, state) = setup();
    let oracle = Arc::new(MockOracle::repeating("not json at all", 3));

    let err = state
        .timetable_api
        .generate(SCHOOL_ID, oracle.clone(), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::GenerationFailed(_)));
    assert_eq!(oracle.calls(), 3);
    assert!(state.timetable_api.load_routines(SCHOOL_ID).unwrap().is_none());
}

#[tokio::test]
async fn test_non_array_response_fails_immediately() {
    let (_tmp, state) = setup();
    let oracle = Arc::new(MockOracle::repeating(r#"{"className": "Six"}"#, 3));

    let err = state
        .timetable_api
        .generate(SCHOOL_ID, oracle.clone(), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::GenerationFailed(_)));
    assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn test_cancelled_generation_writes_nothing() {
    let (_tmp, state) = setup();
    let oracle = Arc::new(MockOracle::new(vec![Ok(to_json(&clean_routines()))]));
    let (handle, token) = cancel_pair();
    handle.cancel();

    let err = state
        .timetable_api
        .generate(SCHOOL_ID, oracle.clone(), &token)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::GenerationCancelled));
    assert_eq!(oracle.calls(), 0);
    assert!(state.timetable_api.load_routines(SCHOOL_ID).unwrap().is_none());
}

#[tokio::test]
async fn test_school_without_classes_is_rejected() {
    logging::init_test();
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();
    let oracle = Arc::new(MockOracle::new(Vec::new()));

    let err = state
        .timetable_api
        .generate("empty-school", oracle.clone(), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn test_school_without_rules_is_rejected() {
    logging::init_test();
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();
    state.repos.class_repo.add_class("no-rules", "Six").unwrap();
    let oracle = Arc::new(MockOracle::new(Vec::new()));

    let err = state
        .timetable_api
        .generate("no-rules", oracle.clone(), &CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::BusinessRuleViolation(_)));
    assert_eq!(oracle.calls(), 0);
}
