// ==========================================
// 学校课表排课系统 - 教师目录 CSV 导入
// ==========================================
// 文件格式（首行为表头, 列顺序不限）:
//   name,active,subjects,classes[,teacher_id]
// subjects/classes 使用 ';' 分隔
// active 为空视为在职
// ==========================================
// 匹配规则:
// - 提供 teacher_id 时按 ID 更新
// - 否则按姓名匹配唯一的已有教师（保留其 ID）
// - 匹配不到或重名时新建教师
// ==========================================

use crate::domain::teacher::Teacher;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::TeacherRepository;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

const COL_NAME: &str = "name";
const COL_ACTIVE: &str = "active";
const COL_SUBJECTS: &str = "subjects";
const COL_CLASSES: &str = "classes";
const COL_TEACHER_ID: &str = "teacher_id";

/// 单行解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherRow {
    /// 数据行号（表头之后从 1 开始）
    pub row: usize,
    pub teacher_id: Option<String>,
    pub name: String,
    pub active: bool,
    pub subjects: Vec<String>,
    pub classes: Vec<String>,
}

/// 导入结果汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherImportReport {
    pub created: usize,
    pub updated: usize,
    /// 跳过的行（行号, 原因）
    pub skipped: Vec<(usize, String)>,
}

// ==========================================
// TeacherCsvImporter
// ==========================================
pub struct TeacherCsvImporter {
    teacher_repo: Arc<TeacherRepository>,
}

impl TeacherCsvImporter {
    pub fn new(teacher_repo: Arc<TeacherRepository>) -> Self {
        Self { teacher_repo }
    }

    /// 从文件导入
    pub fn import_file(&self, school_id: &str, path: &Path) -> ImportResult<TeacherImportReport> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }
        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(ext.to_string_lossy().to_string()));
            }
        }

        let file = File::open(path)?;
        self.import_reader(school_id, file)
    }

    /// 从任意输入流导入
    pub fn import_reader<R: Read>(&self, school_id: &str, reader: R) -> ImportResult<TeacherImportReport> {
        let (rows, mut skipped) = parse_rows(reader)?;
        let existing = self.teacher_repo.list_all(school_id)?;

        let mut name_counts: HashMap<&str, usize> = HashMap::new();
        for t in &existing {
            *name_counts.entry(t.name.as_str()).or_default() += 1;
        }

        let mut report = TeacherImportReport::default();
        let mut batch = Vec::with_capacity(rows.len());

        for row in rows {
            let matched = match row.teacher_id.as_deref() {
                Some(id) => existing.iter().find(|t| t.teacher_id == id),
                None if name_counts.get(row.name.as_str()) == Some(&1) => {
                    existing.iter().find(|t| t.name == row.name)
                }
                None => None,
            };

            let mut teacher = match matched {
                Some(t) => {
                    report.updated += 1;
                    t.clone()
                }
                None => {
                    report.created += 1;
                    let mut t = Teacher::new(row.name.clone());
                    if let Some(id) = &row.teacher_id {
                        t.teacher_id = id.clone();
                    }
                    t
                }
            };

            teacher.name = row.name;
            teacher.active = row.active;
            teacher.subjects = row.subjects.into_iter().collect();
            teacher.teaching_classes = row.classes.into_iter().collect();
            batch.push(teacher);
        }

        self.teacher_repo.upsert_batch(school_id, &batch)?;

        report.skipped.append(&mut skipped);
        info!(
            school_id = %school_id,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped.len(),
            "教师目录导入完成"
        );
        Ok(report)
    }
}

// ==========================================
// 解析
// ==========================================

/// 解析 CSV 内容
///
/// # 返回
/// - (有效行, 跳过的行)
pub fn parse_rows<R: Read>(reader: R) -> ImportResult<(Vec<TeacherRow>, Vec<(usize, String)>)> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let name_col = column(COL_NAME).ok_or_else(|| ImportError::MissingColumn(COL_NAME.to_string()))?;
    let active_col = column(COL_ACTIVE);
    let subjects_col = column(COL_SUBJECTS);
    let classes_col = column(COL_CLASSES);
    let id_col = column(COL_TEACHER_ID);

    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let row = idx + 1;
        let record = result?;
        let field = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("").trim();

        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let name = field(Some(name_col));
        if name.is_empty() {
            warn!(row, "教师姓名为空, 跳过");
            skipped.push((row, "教师姓名为空".to_string()));
            continue;
        }

        let active = match parse_active(field(active_col)) {
            Some(v) => v,
            None => {
                let raw = field(active_col).to_string();
                warn!(row, value = %raw, "在职状态无法识别, 跳过");
                skipped.push((row, format!("在职状态无法识别: {}", raw)));
                continue;
            }
        };

        let teacher_id = Some(field(id_col))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        rows.push(TeacherRow {
            row,
            teacher_id,
            name: name.to_string(),
            active,
            subjects: split_list(field(subjects_col)),
            classes: split_list(field(classes_col)),
        });
    }

    Ok((rows, skipped))
}

fn parse_active(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "y" | "是" => Some(true),
        "0" | "false" | "no" | "n" | "否" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_with_lists_and_defaults() {
        let data = "name,active,subjects,classes\n\
                    Rahim,,Math;Physics,Six;Seven\n\
                    Karim,false,English,\n";
        let (rows, skipped) = parse_rows(data.as_bytes()).unwrap();

        assert!(skipped.is_empty());
        assert_eq!(rows.len(), 2);
        assert!(rows[0].active);
        assert_eq!(rows[0].subjects, vec!["Math", "Physics"]);
        assert_eq!(rows[0].classes, vec!["Six", "Seven"]);
        assert!(!rows[1].active);
        assert!(rows[1].classes.is_empty());
    }

    #[test]
    fn test_parse_rows_skips_blank_name_and_bad_active() {
        let data = "name,active\n,true\nRahim,maybe\nKarim,1\n";
        let (rows, skipped) = parse_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Karim");
        assert_eq!(skipped.iter().map(|(r, _)| *r).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_missing_name_column() {
        let data = "teacher,active\nRahim,1\n";
        assert!(matches!(
            parse_rows(data.as_bytes()),
            Err(ImportError::MissingColumn(_))
        ));
    }
}
