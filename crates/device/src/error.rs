//! 设备错误类型
//!
//! [`DeviceError`] 描述注册表与启动流程中可恢复的错误，可通过
//! [`DeviceError::to_errno()`] 转换为系统调用错误码。
//! [`InitError`] 是设备初始化函数返回的非零 8 位结果码。

use core::fmt;
use core::num::NonZeroU8;

/// 设备注册表错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// 设备不存在或未就绪 (-ENODEV)
    NoDevice,
    /// 启动流程或设备初始化正在进行 (-EBUSY)
    Busy,
    /// 设备或初始化级别已完成初始化 (-EALREADY)
    AlreadyInitialized,
    /// 注册表已封存，不再接受启动流程 (-EPERM)
    Sealed,
    /// 设备不是延迟初始化设备 (-EINVAL)
    NotDeferred,
    /// 已注册了另一个全局注册表 (-EEXIST)
    AlreadyRegistered,
    /// 设备初始化函数返回失败
    InitFailed(InitError),
}

impl DeviceError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            DeviceError::NoDevice => -19,
            DeviceError::Busy => -16,
            DeviceError::AlreadyInitialized => -114,
            DeviceError::Sealed => -1,
            DeviceError::NotDeferred => -22,
            DeviceError::AlreadyRegistered => -17,
            DeviceError::InitFailed(err) => -(err.code() as isize),
        }
    }
}

impl From<InitError> for DeviceError {
    fn from(err: InitError) -> Self {
        DeviceError::InitFailed(err)
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NoDevice => f.write_str("no such device"),
            DeviceError::Busy => f.write_str("device busy"),
            DeviceError::AlreadyInitialized => f.write_str("already initialized"),
            DeviceError::Sealed => f.write_str("registry sealed"),
            DeviceError::NotDeferred => f.write_str("device is not deferred"),
            DeviceError::AlreadyRegistered => f.write_str("registry already registered"),
            DeviceError::InitFailed(err) => write!(f, "init failed with code {}", err.code()),
        }
    }
}

/// 设备初始化失败的结果码
///
/// 保存在设备状态的 8 位 `init_res` 字段中，0 表示成功，因此这里永远非零。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InitError(NonZeroU8);

impl InitError {
    /// I/O 错误 (EIO)
    pub const IO: Self = Self::from_code(5);
    /// 设备不存在 (ENODEV)
    pub const NO_DEVICE: Self = Self::from_code(19);
    /// 无效参数 (EINVAL)
    pub const INVALID: Self = Self::from_code(22);
    /// 超时 (ETIMEDOUT)
    pub const TIMEOUT: Self = Self::from_code(110);

    const fn from_code(code: u8) -> Self {
        match NonZeroU8::new(code) {
            Some(code) => Self(code),
            None => panic!("init error code must be non-zero"),
        }
    }

    /// 由非零结果码构造
    pub const fn new(code: NonZeroU8) -> Self {
        Self(code)
    }

    /// 由 errno 风格的返回值构造
    ///
    /// 取绝对值并饱和到 255，`0` 表示成功，返回 `None`。
    pub const fn from_errno(rc: i32) -> Option<Self> {
        let abs = rc.unsigned_abs();
        let code = if abs > u8::MAX as u32 {
            u8::MAX
        } else {
            abs as u8
        };
        match NonZeroU8::new(code) {
            Some(code) => Some(Self(code)),
            None => None,
        }
    }

    /// 8 位结果码
    pub const fn code(self) -> u8 {
        self.0.get()
    }
}
