//! 设备句柄
//!
//! 句柄是设备在全局有序设备数组中的位置加一，占用 16 位有符号整数。
//! 两端的极值被保留为依赖数组的哨兵，永远不会指向真实设备。

use core::fmt;

/// 紧凑的设备句柄
///
/// - `0` 表示空句柄（无设备）
/// - `1..=i16::MAX - 1` 表示设备数组中下标为 `handle - 1` 的设备
/// - [`DeviceHandle::SEP`] 与 [`DeviceHandle::ENDS`] 为依赖数组的哨兵
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct DeviceHandle(i16);

// 链接脚本中的对齐假设依赖句柄大小
const _: () = assert!(core::mem::size_of::<DeviceHandle>() == 2);

/// 可寻址的最大设备数量
///
/// 句柄 `i16::MAX` 被结束标记占用，因此最大合法句柄为 `i16::MAX - 1`。
pub const MAX_HANDLES: usize = i16::MAX as usize - 1;

impl DeviceHandle {
    /// 空句柄
    pub const NULL: Self = Self(0);
    /// 区域分隔符
    pub const SEP: Self = Self(i16::MIN);
    /// 依赖数组结束标记
    pub const ENDS: Self = Self(i16::MAX);

    /// 从原始值构造句柄，不做任何检查
    pub const fn from_raw(raw: i16) -> Self {
        Self(raw)
    }

    /// 原始值
    pub const fn raw(self) -> i16 {
        self.0
    }

    /// 由设备数组下标得到句柄
    ///
    /// 下标超出 [`MAX_HANDLES`] 时返回 `None`。
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < MAX_HANDLES {
            Some(Self(index as i16 + 1))
        } else {
            None
        }
    }

    /// 句柄对应的设备数组下标
    ///
    /// 空句柄、负值和两个哨兵均返回 `None`。
    pub const fn index(self) -> Option<usize> {
        if self.0 > 0 && self.0 != i16::MAX {
            Some(self.0 as usize - 1)
        } else {
            None
        }
    }

    /// 是否为空句柄
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// 是否为分隔符或结束标记
    pub const fn is_sentinel(self) -> bool {
        self.0 == i16::MIN || self.0 == i16::MAX
    }

    /// 是否可能指向某个设备（不检查设备数量上限）
    pub const fn is_device(self) -> bool {
        self.index().is_some()
    }
}

impl Default for DeviceHandle {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NULL => f.write_str("NULL"),
            Self::SEP => f.write_str("SEP"),
            Self::ENDS => f.write_str("ENDS"),
            Self(raw) => write!(f, "#{}", raw),
        }
    }
}

impl From<DeviceHandle> for i16 {
    fn from(handle: DeviceHandle) -> Self {
        handle.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        for index in [0usize, 1, 2, 100, MAX_HANDLES - 1] {
            let handle = DeviceHandle::from_index(index).unwrap();
            assert_eq!(handle.raw() as usize, index + 1);
            assert_eq!(handle.index(), Some(index));
        }
    }

    #[test]
    fn test_from_index_rejects_end_marker() {
        assert_eq!(DeviceHandle::from_index(MAX_HANDLES), None);
        assert_eq!(DeviceHandle::from_index(usize::MAX), None);
    }

    #[test]
    fn test_sentinels_are_not_devices() {
        assert_eq!(DeviceHandle::NULL.index(), None);
        assert_eq!(DeviceHandle::SEP.index(), None);
        assert_eq!(DeviceHandle::ENDS.index(), None);
        assert_eq!(DeviceHandle::from_raw(-1).index(), None);

        assert!(DeviceHandle::SEP.is_sentinel());
        assert!(DeviceHandle::ENDS.is_sentinel());
        assert!(!DeviceHandle::NULL.is_sentinel());
        assert!(DeviceHandle::NULL.is_null());
    }

    #[test]
    fn test_debug_format() {
        use alloc::format;

        assert_eq!(format!("{:?}", DeviceHandle::SEP), "SEP");
        assert_eq!(format!("{:?}", DeviceHandle::ENDS), "ENDS");
        assert_eq!(format!("{:?}", DeviceHandle::NULL), "NULL");
        assert_eq!(format!("{:?}", DeviceHandle::from_raw(7)), "#7");
    }
}
