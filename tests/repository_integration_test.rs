// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 作息规则/教师/班级/课表 在 SQLite 上的读写
// ==========================================

mod helpers;

use helpers::test_data_builder::*;
use school_timetable::repository::{
    ClassRepository, DayRuleRepository, RepositoryError, RoutineRepository, TeacherRepository,
};
use school_timetable::{DayRuleBook, Teacher, Weekday};

#[test]
fn test_day_rule_book_round_trip_keeps_partition() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = DayRuleRepository::new(&db_path).unwrap();

    let mut book = DayRuleBook::new();
    book.add_rule(standard_rule(), &[Weekday::Monday, Weekday::Tuesday])
        .unwrap();
    book.add_rule(saturday_rule(), &[Weekday::Saturday]).unwrap();
    repo.save_book(SCHOOL_ID, &book).unwrap();

    let loaded = repo.load_book(SCHOOL_ID).unwrap();
    assert_eq!(loaded, book);
    assert_eq!(loaded.rules()[0].id, "standard");
    // 未归属的教学日回退到第一条规则
    assert_eq!(loaded.rule_for(Weekday::Wednesday).unwrap().id, "standard");
    assert_eq!(loaded.rule_for(Weekday::Saturday).unwrap().id, "saturday");
}

#[test]
fn test_day_rule_books_are_per_school() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = DayRuleRepository::new(&db_path).unwrap();

    let mut book = DayRuleBook::new();
    book.add_rule(standard_rule(), &Weekday::ALL).unwrap();
    repo.save_book(SCHOOL_ID, &book).unwrap();

    assert!(repo.load_book("other-school").unwrap().is_empty());

    // 整体替换
    repo.save_book(SCHOOL_ID, &DayRuleBook::new()).unwrap();
    assert!(repo.load_book(SCHOOL_ID).unwrap().is_empty());
}

#[test]
fn test_teacher_upsert_and_active_filter() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = TeacherRepository::new(&db_path).unwrap();

    let rahim = Teacher::new("Rahim").with_subjects(["Math"]).with_classes(["Six"]);
    let nadia = Teacher::new("Nadia").with_subjects(["English"]).inactive();
    repo.upsert(SCHOOL_ID, &rahim).unwrap();
    repo.upsert(SCHOOL_ID, &nadia).unwrap();

    let all = repo.list_all(SCHOOL_ID).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], rahim);

    let active = repo.list_active(SCHOOL_ID).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "Rahim");

    // 更新不改变 ID 与顺序
    let renamed = Teacher {
        name: "Rahim Uddin".to_string(),
        ..rahim.clone()
    };
    repo.upsert(SCHOOL_ID, &renamed).unwrap();
    let all = repo.list_all(SCHOOL_ID).unwrap();
    assert_eq!(all[0].teacher_id, rahim.teacher_id);
    assert_eq!(all[0].name, "Rahim Uddin");

    repo.set_active(&nadia.teacher_id, true).unwrap();
    assert_eq!(repo.list_active(SCHOOL_ID).unwrap().len(), 2);
    assert!(repo.find_by_id("missing").unwrap().is_none());
}

#[test]
fn test_class_order_and_duplicates() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = ClassRepository::new(&db_path).unwrap();

    repo.add_class(SCHOOL_ID, "Seven").unwrap();
    repo.add_class(SCHOOL_ID, "Six").unwrap();
    assert_eq!(repo.list_class_names(SCHOOL_ID).unwrap(), vec!["Seven", "Six"]);

    let err = repo.add_class(SCHOOL_ID, "Six").unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

    repo.remove_class(SCHOOL_ID, "Seven").unwrap();
    assert_eq!(repo.list_class_names(SCHOOL_ID).unwrap(), vec!["Six"]);
}

#[test]
fn test_routine_save_revision_and_optimistic_lock() {
    let (_tmp, db_path) = test_helpers::create_test_db().unwrap();
    let repo = RoutineRepository::new(&db_path).unwrap();

    assert!(repo.find(SCHOOL_ID).unwrap().is_none());
    assert_eq!(repo.current_revision(SCHOOL_ID).unwrap(), 0);

    let routines = clean_routines();
    assert_eq!(repo.save(SCHOOL_ID, &routines, Some(0)).unwrap(), 1);
    assert_eq!(repo.save(SCHOOL_ID, &routines, Some(1)).unwrap(), 2);

    let err = repo.save(SCHOOL_ID, &routines, Some(1)).unwrap_err();
    match err {
        RepositoryError::OptimisticLockFailure {
            school_id,
            expected,
            actual,
        } => {
            assert_eq!(school_id, SCHOOL_ID);
            assert_eq!(expected, 1);
            assert_eq!(actual, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // 后写覆盖
    assert_eq!(repo.save(SCHOOL_ID, &double_booked_routines(), None).unwrap(), 3);
    let stored = repo.find(SCHOOL_ID).unwrap().unwrap();
    assert_eq!(stored.revision, 3);
    assert_eq!(stored.routines, double_booked_routines());

    assert!(repo.delete(SCHOOL_ID).unwrap());
    assert!(repo.find(SCHOOL_ID).unwrap().is_none());
}
