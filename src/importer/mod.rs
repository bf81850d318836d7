// ==========================================
// 学校课表排课系统 - 导入层
// ==========================================
// 职责: 外部数据导入（教师目录 CSV）
// ==========================================

pub mod error;
pub mod teacher_csv;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use teacher_csv::{parse_rows, TeacherCsvImporter, TeacherImportReport, TeacherRow};
