//! 静态设备定义
//!
//! 设备在编译期以常量构造器定义，放入按初始化级别与优先级排序的静态数组中。
//! 设备在数组中的位置就是其句柄的唯一来源。
//!
//! ```
//! use device::{Device, DeviceHandle, DeviceState, InitLevel, dep_array};
//!
//! struct UartConfig {
//!     base: usize,
//! }
//!
//! static UART_CONFIG: UartConfig = UartConfig { base: 0x1000_0000 };
//! static UART_STATE: DeviceState = DeviceState::new();
//! static UART_DEPS: [DeviceHandle; 3] = dep_array![; ;];
//! static UART: Device = Device::new("uart0", &UART_STATE)
//!     .config(&UART_CONFIG)
//!     .handles(&UART_DEPS)
//!     .level(InitLevel::PreKernel1, 10);
//!
//! assert_eq!(UART.config_as::<UartConfig>().map(|c| c.base), Some(0x1000_0000));
//! assert!(!UART.is_ready());
//! ```

use core::any::Any;
use core::fmt;

use devhandle::{DependencyArray, DeviceHandle};

use crate::config::MAX_NAME_LEN;
use crate::error::{DeviceError, InitError};
use crate::state::DeviceState;

/// 设备初始化函数
pub type InitFn = fn(&'static Device) -> Result<(), InitError>;

/// 不透明的设备附属数据（配置、操作表、工作区）
pub type Opaque = &'static (dyn Any + Send + Sync);

/// 初始化级别，按声明顺序依次执行
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum InitLevel {
    /// 内核启动前，无内核服务可用
    PreKernel1 = 0,
    /// 内核启动前，可依赖 PreKernel1 设备
    PreKernel2,
    /// 内核服务可用之后
    PostKernel,
    /// 应用启动前
    Application,
    /// 多核启动之后
    Smp,
}

impl InitLevel {
    /// 全部级别，按执行顺序排列
    pub const ALL: [InitLevel; 5] = [
        InitLevel::PreKernel1,
        InitLevel::PreKernel2,
        InitLevel::PostKernel,
        InitLevel::Application,
        InitLevel::Smp,
    ];

    /// 级别序号
    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// 校验设备名：非空、可打印 ASCII、不超过 [`MAX_NAME_LEN`]
const fn check_name(name: &str) {
    let bytes = name.as_bytes();
    assert!(!bytes.is_empty(), "device name is empty");
    assert!(bytes.len() <= MAX_NAME_LEN, "device name too long");
    let mut i = 0;
    while i < bytes.len() {
        assert!(
            bytes[i] >= 0x20 && bytes[i] < 0x7f,
            "device name is not printable"
        );
        i += 1;
    }
}

/// 静态设备
pub struct Device {
    name: &'static str,
    config: Option<Opaque>,
    api: Option<Opaque>,
    data: Option<Opaque>,
    state: &'static DeviceState,
    handles: Option<DependencyArray<'static>>,
    init: Option<InitFn>,
    level: InitLevel,
    priority: u8,
    deferred: bool,
}

impl Device {
    /// 创建设备，名字在常量求值时校验
    pub const fn new(name: &'static str, state: &'static DeviceState) -> Self {
        check_name(name);
        Self {
            name,
            config: None,
            api: None,
            data: None,
            state,
            handles: None,
            init: None,
            level: InitLevel::PostKernel,
            priority: 0,
            deferred: false,
        }
    }

    /// 设置只读配置
    pub const fn config(mut self, config: Opaque) -> Self {
        self.config = Some(config);
        self
    }

    /// 设置操作表
    pub const fn api(mut self, api: Opaque) -> Self {
        self.api = Some(api);
        self
    }

    /// 设置驱动工作区（需自带内部可变性）
    pub const fn data(mut self, data: Opaque) -> Self {
        self.data = Some(data);
        self
    }

    /// 设置链接后格式的依赖数组，格式错误导致编译失败
    pub const fn handles(mut self, handles: &'static [DeviceHandle]) -> Self {
        self.handles = Some(DependencyArray::from_static(handles));
        self
    }

    /// 设置初始化函数
    pub const fn init(mut self, init: InitFn) -> Self {
        self.init = Some(init);
        self
    }

    /// 设置初始化级别与级别内优先级（数值越小越先执行）
    pub const fn level(mut self, level: InitLevel, priority: u8) -> Self {
        self.level = level;
        self.priority = priority;
        self
    }

    /// 标记为延迟初始化：启动流程跳过，由 `init_deferred` 单独初始化
    pub const fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// 设备名
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// 按类型取只读配置
    pub fn config_as<T: Any>(&self) -> Option<&'static T> {
        self.config?.downcast_ref::<T>()
    }

    /// 按类型取操作表
    pub fn api_as<T: Any>(&self) -> Option<&'static T> {
        self.api?.downcast_ref::<T>()
    }

    /// 按类型取驱动工作区
    pub fn data_as<T: Any>(&self) -> Option<&'static T> {
        self.data?.downcast_ref::<T>()
    }

    /// 设备状态
    pub const fn state(&self) -> &'static DeviceState {
        self.state
    }

    /// 依赖数组，未提供依赖信息时为 `None`
    pub const fn dependencies(&self) -> Option<DependencyArray<'static>> {
        self.handles
    }

    /// 必需依赖句柄
    ///
    /// 没有依赖数组时返回 `None`；切片自带长度，因此不存在“未设置的计数”。
    pub fn required_handles(&self) -> Option<&'static [DeviceHandle]> {
        self.handles.map(|deps| deps.required())
    }

    /// 注入依赖句柄
    pub fn injected_handles(&self) -> Option<&'static [DeviceHandle]> {
        self.handles.map(|deps| deps.injected())
    }

    /// 被支持设备句柄
    pub fn supported_handles(&self) -> Option<&'static [DeviceHandle]> {
        self.handles.map(|deps| deps.supported())
    }

    /// 必需依赖数量，没有依赖数组时为 0
    pub fn required_count(&self) -> usize {
        self.required_handles().map_or(0, <[DeviceHandle]>::len)
    }

    /// 被支持设备数量，没有依赖数组时为 0
    pub fn supported_count(&self) -> usize {
        self.supported_handles().map_or(0, <[DeviceHandle]>::len)
    }

    /// 初始化级别
    pub const fn init_level(&self) -> InitLevel {
        self.level
    }

    /// 级别内优先级
    pub const fn priority(&self) -> u8 {
        self.priority
    }

    /// 是否延迟初始化
    pub const fn is_deferred(&self) -> bool {
        self.deferred
    }

    pub(crate) fn init_fn(&self) -> Option<InitFn> {
        self.init
    }

    /// 设备是否就绪
    ///
    /// 存在于注册表中并不代表可用；使用 `api`/`data` 之前必须检查就绪。
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// 未就绪时返回 [`DeviceError::NoDevice`]
    pub fn usable_check(&self) -> Result<(), DeviceError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(DeviceError::NoDevice)
        }
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("priority", &self.priority)
            .field("deferred", &self.deferred)
            .field("state", self.state)
            .field("handles", &self.handles.map(|deps| deps.as_slice()))
            .finish_non_exhaustive()
    }
}
