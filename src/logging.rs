// ==========================================
// 学校课表排课系统 - 日志初始化
// ==========================================
// 默认只放行本 crate 的 info 级日志, 依赖库仅输出 warn 以上
// RUST_LOG 设置时完全以环境变量为准
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 默认过滤规则
pub const DEFAULT_FILTER: &str = "warn,school_timetable=info";

/// 测试过滤规则（排课状态迁移在 debug 级别）
pub const TEST_FILTER: &str = "warn,school_timetable=debug";

/// 读取 RUST_LOG, 未设置或无效时使用给定的默认规则
fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// 初始化终端日志
///
/// # 环境变量
/// - RUST_LOG: 覆盖 `DEFAULT_FILTER`
///   例如: RUST_LOG=school_timetable::engine::orchestrator=debug
///
/// # 示例
/// ```no_run
/// use school_timetable::logging;
/// logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter_or(DEFAULT_FILTER))
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 初始化 JSON 格式日志（便于日志采集）
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(env_filter_or(DEFAULT_FILTER))
        .with_current_span(true)
        .init();
}

/// 测试日志, 可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(env_filter_or(TEST_FILTER))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_parse() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
        assert!(TEST_FILTER.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_init_test_is_idempotent() {
        init_test();
        init_test();
        tracing::debug!(module = "logging", "测试日志已初始化");
    }
}
