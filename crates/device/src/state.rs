//! 设备运行状态
//!
//! 每个设备独占一个 [`DeviceState`]，记录是否已初始化以及初始化结果码。
//! 两个字段与一个“初始化中”标记打包在同一个原子字中：
//!
//! ```text
//! bit 0..8   init_res（0 表示成功）
//! bit 8      INITIALIZED
//! bit 9      INITIALIZING
//! ```
//!
//! 状态只能被写入一次：先通过 [`DeviceState::claim`] 独占，
//! 再通过 [`DeviceState::complete`] 一次性发布结果，之后永不改变。

use core::fmt;
use core::sync::atomic::{AtomicU16, Ordering};

use bitflags::bitflags;

use crate::error::{DeviceError, InitError};

bitflags! {
    /// 设备状态标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StateFlags: u16 {
        /// 已完成初始化（无论成功与否）
        const INITIALIZED = 1 << 8;
        /// 初始化函数正在执行
        const INITIALIZING = 1 << 9;
    }
}

const RES_MASK: u16 = 0xff;

/// 设备状态
pub struct DeviceState {
    word: AtomicU16,
}

impl DeviceState {
    /// 创建未初始化的状态
    pub const fn new() -> Self {
        Self {
            word: AtomicU16::new(0),
        }
    }

    fn load(&self) -> (StateFlags, u8) {
        let word = self.word.load(Ordering::Acquire);
        (
            StateFlags::from_bits_truncate(word),
            (word & RES_MASK) as u8,
        )
    }

    /// 当前状态标志
    pub fn flags(&self) -> StateFlags {
        self.load().0
    }

    /// 是否已完成初始化
    pub fn initialized(&self) -> bool {
        self.flags().contains(StateFlags::INITIALIZED)
    }

    /// 初始化结果码，0 表示成功（未初始化时也为 0）
    pub fn init_res(&self) -> u8 {
        self.load().1
    }

    /// 设备是否就绪：已初始化且结果为成功
    pub fn is_ready(&self) -> bool {
        let (flags, res) = self.load();
        flags.contains(StateFlags::INITIALIZED) && res == 0
    }

    /// 独占初始化权
    ///
    /// 每个设备只有第一次调用会成功；正在初始化的设备返回 [`DeviceError::Busy`]，
    /// 已完成初始化的设备返回 [`DeviceError::AlreadyInitialized`]。
    pub(crate) fn claim(&self) -> Result<(), DeviceError> {
        match self.word.compare_exchange(
            0,
            StateFlags::INITIALIZING.bits(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(()),
            Err(word) if StateFlags::from_bits_truncate(word).contains(StateFlags::INITIALIZED) => {
                Err(DeviceError::AlreadyInitialized)
            }
            Err(_) => Err(DeviceError::Busy),
        }
    }

    /// 发布初始化结果
    ///
    /// 调用者必须先通过 [`DeviceState::claim`] 取得初始化权。
    pub(crate) fn complete(&self, result: Result<(), InitError>) {
        let res = match result {
            Ok(()) => 0,
            Err(err) => err.code() as u16,
        };
        debug_assert!(self.flags().contains(StateFlags::INITIALIZING));
        self.word
            .store(StateFlags::INITIALIZED.bits() | res, Ordering::Release);
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (flags, res) = self.load();
        f.debug_struct("DeviceState")
            .field("initialized", &flags.contains(StateFlags::INITIALIZED))
            .field("initializing", &flags.contains(StateFlags::INITIALIZING))
            .field("init_res", &res)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_not_ready() {
        let state = DeviceState::new();
        assert!(!state.initialized());
        assert_eq!(state.init_res(), 0);
        assert!(!state.is_ready());
    }

    #[test]
    fn test_success_makes_ready() {
        let state = DeviceState::new();
        state.claim().unwrap();
        assert!(!state.is_ready());
        assert_eq!(state.flags(), StateFlags::INITIALIZING);

        state.complete(Ok(()));
        assert!(state.initialized());
        assert!(state.is_ready());
        assert_eq!(state.flags(), StateFlags::INITIALIZED);
    }

    #[test]
    fn test_failure_is_permanent() {
        let state = DeviceState::new();
        state.claim().unwrap();
        state.complete(Err(InitError::IO));

        assert!(state.initialized());
        assert_eq!(state.init_res(), 5);
        assert!(!state.is_ready());

        // 不允许重试
        assert_eq!(state.claim(), Err(DeviceError::AlreadyInitialized));
        assert_eq!(state.init_res(), 5);
        assert!(!state.is_ready());
    }

    #[test]
    fn test_claim_while_initializing_is_busy() {
        let state = DeviceState::new();
        state.claim().unwrap();
        assert_eq!(state.claim(), Err(DeviceError::Busy));
        state.complete(Ok(()));
        assert_eq!(state.claim(), Err(DeviceError::AlreadyInitialized));
        assert!(state.is_ready());
    }
}
