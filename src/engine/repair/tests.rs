use super::*;
use crate::domain::routine::Period;
use crate::domain::time::parse_clock;
use crate::domain::types::PeriodType;
use crate::engine::validator::ConflictValidator;
use std::collections::BTreeMap;

// ==========================================
// 测试辅助函数
// ==========================================

fn class_period(start: &str, end: &str, subject: &str, teacher: &str) -> Period {
    let mut p = Period::blank(
        parse_clock(start).unwrap(),
        parse_clock(end).unwrap(),
        PeriodType::Class,
    );
    p.subject = subject.to_string();
    p.teacher = teacher.to_string();
    p
}

fn monday_routine(class_name: &str, periods: Vec<Period>) -> ClassRoutine {
    let mut schedule = BTreeMap::new();
    schedule.insert(Weekday::Monday, periods);
    ClassRoutine::new(class_name, schedule)
}

fn teacher_of(routines: &[ClassRoutine], class_index: usize, period_index: usize) -> &str {
    &routines[class_index].day(Weekday::Monday)[period_index].teacher
}

// ==========================================
// 可修复场景
// ==========================================

#[test]
fn test_repair_reassigns_only_non_first_assignment() {
    let routines = vec![
        monday_routine("Six", vec![class_period("08:00", "08:40", "Math", "Rahim")]),
        monday_routine("Seven", vec![class_period("08:00", "08:40", "Math", "Rahim")]),
    ];
    let roster = TeacherRoster::active_from(vec![
        Teacher::new("Rahim")
            .with_subjects(["Math"])
            .with_classes(["Six", "Seven"]),
        Teacher::new("Karim")
            .with_subjects(["Math"])
            .with_classes(["Seven"]),
    ]);

    let outcome = LocalRepairEngine::new().repair(&routines, &roster);

    assert_eq!(teacher_of(&outcome.routines, 0, 0), "Rahim");
    assert_eq!(teacher_of(&outcome.routines, 1, 0), "Karim");
    assert_eq!(outcome.actions.len(), 1);
    assert_eq!(outcome.actions[0].class_name, "Seven");
    assert_eq!(outcome.actions[0].from_teacher, "Rahim");
    assert_eq!(outcome.unresolved, 0);

    let report = ConflictValidator::new().validate(&outcome.routines, 6);
    assert!(report.valid, "修复后不应再有冲突: {:?}", report.errors);
}

#[test]
fn test_repair_does_not_mutate_input() {
    let routines = vec![
        monday_routine("Six", vec![class_period("08:00", "08:40", "Math", "Rahim")]),
        monday_routine("Seven", vec![class_period("08:00", "08:40", "Math", "Rahim")]),
    ];
    let original = routines.clone();
    let roster = TeacherRoster::active_from(vec![Teacher::new("Karim")
        .with_subjects(["Math"])
        .with_classes(["Seven"])]);

    let outcome = LocalRepairEngine::new().repair(&routines, &roster);

    assert_eq!(routines, original);
    assert_ne!(outcome.routines, original);
}

// ==========================================
// 不可修复场景
// ==========================================

#[test]
fn test_no_substitute_leaves_conflict_in_place() {
    let routines = vec![
        monday_routine("Six", vec![class_period("08:00", "08:40", "Math", "Rahim")]),
        monday_routine("Seven", vec![class_period("08:00", "08:40", "Math", "Rahim")]),
    ];
    // Karim 会教数学但不教 Seven 班; Mina 教 Seven 班但不教数学
    let roster = TeacherRoster::active_from(vec![
        Teacher::new("Rahim").with_subjects(["Math"]).with_classes(["Six", "Seven"]),
        Teacher::new("Karim").with_subjects(["Math"]).with_classes(["Six"]),
        Teacher::new("Mina").with_subjects(["English"]).with_classes(["Seven"]),
    ]);

    let outcome = LocalRepairEngine::new().repair(&routines, &roster);

    assert_eq!(outcome.routines, routines);
    assert!(outcome.actions.is_empty());
    assert_eq!(outcome.unresolved, 1);
    assert_eq!(
        ConflictValidator::new()
            .validate(&outcome.routines, 6)
            .double_bookings()
            .count(),
        1
    );
}

#[test]
fn test_substitute_busy_in_same_slot_is_skipped() {
    // Karim 本时段已在 Eight 班上课, 不能再被选为替代
    let routines = vec![
        monday_routine("Six", vec![class_period("08:00", "08:40", "Math", "Rahim")]),
        monday_routine("Seven", vec![class_period("08:00", "08:40", "Math", "Rahim")]),
        monday_routine("Eight", vec![class_period("08:00", "08:40", "Science", "Karim")]),
    ];
    let roster = TeacherRoster::active_from(vec![
        Teacher::new("Karim").with_subjects(["Math", "Science"]).with_classes(["Seven", "Eight"]),
        Teacher::new("Nadia").with_subjects(["Math"]).with_classes(["Seven"]),
    ]);

    let outcome = LocalRepairEngine::new().repair(&routines, &roster);

    assert_eq!(teacher_of(&outcome.routines, 1, 0), "Nadia");
    assert_eq!(teacher_of(&outcome.routines, 2, 0), "Karim");
}

#[test]
fn test_inactive_teacher_is_never_substitute() {
    let routines = vec![
        monday_routine("Six", vec![class_period("08:00", "08:40", "Math", "Rahim")]),
        monday_routine("Seven", vec![class_period("08:00", "08:40", "Math", "Rahim")]),
    ];
    let roster = TeacherRoster::active_from(vec![Teacher::new("Karim")
        .with_subjects(["Math"])
        .with_classes(["Seven"])
        .inactive()]);

    let outcome = LocalRepairEngine::new().repair(&routines, &roster);

    assert_eq!(outcome.unresolved, 1);
    assert_eq!(teacher_of(&outcome.routines, 1, 0), "Rahim");
}

#[test]
fn test_workload_overflow_is_not_repaired() {
    let periods = vec![
        class_period("08:00", "08:40", "Math", "Rahim"),
        class_period("08:40", "09:20", "Math", "Rahim"),
    ];
    let routines = vec![monday_routine("Six", periods)];
    let roster = TeacherRoster::active_from(vec![Teacher::new("Karim")
        .with_subjects(["Math"])
        .with_classes(["Six"])]);

    let outcome = LocalRepairEngine::new().repair(&routines, &roster);

    assert!(outcome.actions.is_empty());
    assert!(!ConflictValidator::new().validate(&outcome.routines, 1).valid);
}
