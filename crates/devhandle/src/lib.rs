//! 设备句柄与依赖数组格式
//!
//! 此 crate 定义静态设备注册表使用的紧凑编码：
//!
//! - [`DeviceHandle`] - 16 位设备句柄（设备数组下标加一）及两个哨兵值
//! - [`DependencyArray`] - 链接后的依赖数组，由分隔符划分为三个区域
//! - [`PrelinkArray`] - 生成器输出的链接前数组（依赖序号）
//! - [`rewrite`] / [`rewrite_in_place`] - 序号到句柄的改写步骤
//!
//! # 编码
//!
//! 依赖关系不使用指针，而是在一个按确定顺序排列的设备数组上做算术。
//! 每个设备的依赖数组是单个扁平数组：
//!
//! ```text
//! 必需依赖..., SEP, 注入依赖..., SEP, 被支持设备..., ENDS
//! ```
//!
//! 所有校验函数都是 `const fn`，在静态初始化器中使用时，格式错误会直接导致编译失败。

#![no_std]

#[cfg(test)]
extern crate alloc;

mod array;
mod error;
mod handle;
mod prelink;

pub use array::{DependencyArray, Regions};
pub use error::FormatError;
pub use handle::{DeviceHandle, MAX_HANDLES};
pub use prelink::{PrelinkArray, rewrite, rewrite_in_place};
