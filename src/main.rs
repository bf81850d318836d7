// ==========================================
// 学校课表排课系统 - 命令行入口
// ==========================================
// 用法:
//   school-timetable skeleton <school_id>
//   school-timetable validate <school_id>
//   school-timetable import-teachers <school_id> <file.csv>
// 环境变量:
//   TIMETABLE_DB: 数据库路径（默认本地数据目录）
//   TIMETABLE_LOG_JSON=1: JSON 日志
// ==========================================

use anyhow::{bail, Context, Result};
use school_timetable::app::{get_default_db_path, AppState};
use school_timetable::logging;
use std::path::Path;

const USAGE: &str = "用法: school-timetable <skeleton|validate|import-teachers> <school_id> [file.csv]";

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var("TIMETABLE_LOG_JSON").map_or(false, |v| v == "1") {
        logging::init_json();
    } else {
        logging::init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, school_id) = match args.as_slice() {
        [command, school_id, ..] => (command.as_str(), school_id.as_str()),
        _ => bail!(USAGE),
    };

    tracing::info!("{} {}", school_timetable::APP_NAME, school_timetable::VERSION);

    let db_path = std::env::var("TIMETABLE_DB").unwrap_or_else(|_| get_default_db_path());
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    match command {
        "skeleton" => {
            let workspace = state
                .timetable_api
                .manual_skeleton(school_id)
                .context("载入人工录入工作区失败")?;
            println!("{}", serde_json::to_string_pretty(&workspace)?);
        }
        "validate" => {
            let report = state
                .timetable_api
                .validate_saved(school_id)
                .await
                .context("课表冲突检查失败")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "import-teachers" => {
            let Some(file) = args.get(2) else {
                bail!(USAGE);
            };
            let report = state
                .teacher_importer
                .import_file(school_id, Path::new(file))
                .context("教师目录导入失败")?;
            println!(
                "新增 {} 名, 更新 {} 名, 跳过 {} 行",
                report.created,
                report.updated,
                report.skipped.len()
            );
            for (row, reason) in &report.skipped {
                println!("  第 {} 行: {}", row, reason);
            }
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }

    Ok(())
}
