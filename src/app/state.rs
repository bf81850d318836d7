// ==========================================
// 学校课表排课系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::TimetableApi;
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use crate::engine::repositories::TimetableRepositories;
use crate::importer::TeacherCsvImporter;

/// 应用状态
///
/// 所有仓储与配置共享同一 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 课表API
    pub timetable_api: Arc<TimetableApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 教师目录导入
    pub teacher_importer: Arc<TeacherCsvImporter>,

    /// 仓储集合
    pub repos: TimetableRepositories,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动创建并建表）
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;

        match read_schema_version(&conn) {
            Ok(Some(v)) if v > CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    db_version = v,
                    code_version = CURRENT_SCHEMA_VERSION,
                    "数据库 schema 版本高于当前程序"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("读取 schema_version 失败(将继续启动): {}", e),
        }

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层与配置
        // ==========================================
        let repos = TimetableRepositories::from_connection(conn.clone());
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let timetable_api = Arc::new(TimetableApi::new(repos.clone(), config_manager.clone()));
        let teacher_importer = Arc::new(TeacherCsvImporter::new(repos.teacher_repo.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            timetable_api,
            config_manager,
            teacher_importer,
            repos,
        })
    }
}
