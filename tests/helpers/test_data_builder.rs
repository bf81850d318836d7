// ==========================================
// 测试数据构建器
// ==========================================

use school_timetable::app::AppState;
use school_timetable::domain::time::parse_clock;
use school_timetable::domain::{ClassRoutine, DayRule, DayRuleBook, Section, Teacher};
use school_timetable::engine::SlotMaterializer;
use school_timetable::Weekday;

pub const SCHOOL_ID: &str = "school-001";

/// 08:00 起 2 节 40 分钟, 课间 20 分钟, 再 2 节 40 分钟
pub fn standard_rule() -> DayRule {
    DayRule::new("standard", parse_clock("08:00").unwrap(), Section::new(2, 40))
        .with_first_recess(20, Section::new(2, 40))
}

/// 周六半天: 09:00 起 2 节 45 分钟
pub fn saturday_rule() -> DayRule {
    DayRule::new("saturday", parse_clock("09:00").unwrap(), Section::new(2, 45))
}

pub fn classes() -> Vec<String> {
    vec!["Six".to_string(), "Seven".to_string()]
}

/// Rahim: Math / Six,Seven; Nadia: English / Six,Seven; Karim: Math / Six,Seven
pub fn teachers() -> Vec<Teacher> {
    vec![
        Teacher::new("Rahim")
            .with_subjects(["Math"])
            .with_classes(["Six", "Seven"]),
        Teacher::new("Nadia")
            .with_subjects(["English"])
            .with_classes(["Six", "Seven"]),
        Teacher::new("Karim")
            .with_subjects(["Math"])
            .with_classes(["Six", "Seven"]),
    ]
}

/// 写入规则、班级与教师
pub fn seed_school(state: &AppState) {
    state
        .timetable_api
        .add_rule(SCHOOL_ID, standard_rule(), &Weekday::ALL)
        .unwrap();
    for class in classes() {
        state.repos.class_repo.add_class(SCHOOL_ID, &class).unwrap();
    }
    state
        .repos
        .teacher_repo
        .upsert_batch(SCHOOL_ID, &teachers())
        .unwrap();
}

/// 按标准规则展开空白骨架
pub fn skeletons() -> Vec<ClassRoutine> {
    let mut book = DayRuleBook::new();
    book.add_rule(standard_rule(), &Weekday::ALL).unwrap();
    SlotMaterializer::new().skeletons(&book, &classes()).unwrap()
}

/// 用回调填写所有上课节次
pub fn fill<F>(mut routines: Vec<ClassRoutine>, mut assign: F) -> Vec<ClassRoutine>
where
    F: FnMut(&str, Weekday, usize) -> (&'static str, &'static str),
{
    for routine in &mut routines {
        let class_name = routine.class_name.clone();
        for (day, periods) in routine.schedule.iter_mut() {
            let mut class_idx = 0;
            for period in periods.iter_mut().filter(|p| p.is_class()) {
                let (subject, teacher) = assign(&class_name, *day, class_idx);
                period.subject = subject.to_string();
                period.teacher = teacher.to_string();
                class_idx += 1;
            }
        }
    }
    routines
}

/// 无冲突课表: Six 全部 Math/Rahim, Seven 全部 English/Nadia
pub fn clean_routines() -> Vec<ClassRoutine> {
    fill(skeletons(), |class, _, _| match class {
        "Six" => ("Math", "Rahim"),
        _ => ("English", "Nadia"),
    })
}

/// 周一第一节 Rahim 同时在 Six 与 Seven
pub fn double_booked_routines() -> Vec<ClassRoutine> {
    fill(skeletons(), |class, day, idx| match (class, day, idx) {
        ("Six", _, _) => ("Math", "Rahim"),
        ("Seven", Weekday::Monday, 0) => ("Math", "Rahim"),
        _ => ("English", "Nadia"),
    })
}

pub fn to_json(routines: &[ClassRoutine]) -> String {
    serde_json::to_string(routines).unwrap()
}
