//! 静态设备注册表
//!
//! 此 crate 以构建期确定顺序的静态数组表示系统中的全部设备，用 16 位句柄
//! 代替指针描述设备之间的依赖关系：
//!
//! - [`Device`] - 设备定义（名字、配置、操作表、状态、依赖数组、初始化函数）
//! - [`DeviceState`] - 设备运行状态，只写一次的“已初始化 + 结果码”
//! - [`DeviceRegistry`] - 句柄 ↔ 设备映射、设备枚举、按名字查找
//! - [`DeviceIter`] - 依赖区域遍历，支持可中断的访问者
//! - [`InitLevel`] / [`InitReport`] - 按级别与优先级执行的启动流程
//!
//! # 生命周期
//!
//! 1. 构建期：设备数组、状态与依赖数组均为 `static`，名字长度、句柄范围、
//!    排序等约束在常量求值时检查，违反即编译失败；
//! 2. 启动期：单个启动流程依次初始化每个设备一次，并记录结果；
//! 3. 运行期：注册表封存，所有数据只读，可被并发读取而无需加锁。
//!
//! # 全局注册表
//!
//! 内核在启动时调用 [`register_registry`] 注册唯一的注册表，之后可以直接使用
//! [`handle_of`]、[`device_of`]、[`get_binding`] 等函数。

#![no_std]

#[cfg(test)]
extern crate alloc;

pub mod config;
mod device;
mod error;
mod global;
mod init;
mod registry;
mod state;
mod walk;

// Re-export handle format
pub use devhandle::{DependencyArray, DeviceHandle, FormatError, Regions, dep_array};

// Re-export device
pub use device::{Device, InitFn, InitLevel, Opaque};

// Re-export state
pub use state::{DeviceState, StateFlags};

// Re-export error
pub use error::{DeviceError, InitError};

// Re-export registry
pub use init::InitReport;
pub use registry::DeviceRegistry;
pub use walk::DeviceIter;

// Re-export 全局注册表
pub use global::{
    all_devices, device_of, for_each_required, for_each_supported, get_binding, handle_of,
    register_registry, registry, try_registry,
};
