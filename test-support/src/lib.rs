//! 测试支持 crate
//!
//! 提供主机端测试使用的 Mock 实现：
//!
//! - [`mock::recorder`] - 记录回调调用顺序（例如设备初始化顺序）
//! - [`mock::logger`] - 按级别计数的 `log` 后端

#![no_std]

extern crate alloc;

pub mod mock;
