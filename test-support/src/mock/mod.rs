//! Mock 实现模块
//!
//! 提供各种子系统的 Mock 实现，用于测试

pub mod logger;
pub mod recorder;
