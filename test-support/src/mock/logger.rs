//! 计数日志后端
//!
//! 只统计各级别日志条数，不输出内容。
//! 计数是全局的，并行测试中只适合做“至少增加了”的断言。

use core::sync::atomic::{AtomicUsize, Ordering};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// 按级别计数的日志后端
pub struct CountingLogger {
    counts: [AtomicUsize; 5],
}

impl CountingLogger {
    const fn new() -> Self {
        Self {
            counts: [const { AtomicUsize::new(0) }; 5],
        }
    }

    /// 指定级别的累计条数
    pub fn count(&self, level: Level) -> usize {
        self.counts[level as usize - 1].load(Ordering::Acquire)
    }
}

impl Log for CountingLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.counts[record.level() as usize - 1].fetch_add(1, Ordering::AcqRel);
    }

    fn flush(&self) {}
}

/// 全局 Mock 实例
pub static LOGGER: CountingLogger = CountingLogger::new();

/// 安装计数日志后端（可重复调用）
pub fn init() {
    // 其它测试可能已经安装过，忽略错误
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
}
