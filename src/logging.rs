// ==========================================
// 堆场箱位分配仿真系统 - 日志初始化
// ==========================================
// 输出: stderr (stdout 留给汇总表)
// 级别: RUST_LOG, 缺省 info
// 格式: 文本行 / JSON 行 (批量仿真收集用)
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// 文本日志
///
/// 按模块调级: `RUST_LOG=yard_alloc::engine::allocator=debug`
///
/// ```no_run
/// yard_alloc::logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// JSON 行日志, 附带当前 span 字段 (日期 / 船舶)
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(env_filter())
        .with_current_span(true)
        .with_writer(std::io::stderr)
        .init();
}

/// 测试日志: debug 级别, 写入测试捕获; 重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
