//! 链接后的依赖数组
//!
//! 单个数组被两个分隔符划分为三个区域，以结束标记收尾：
//!
//! ```text
//! [ 必需依赖..., SEP, 注入依赖..., SEP, 被支持设备..., ENDS, (NULL 填充)... ]
//! ```
//!
//! 区域边界通过线性扫描得到，而不是固定偏移。数组在构造时完成一次校验，
//! 之后的区域提取都不会失败。

use crate::error::FormatError;
use crate::handle::DeviceHandle;

/// 经过校验的依赖数组（紧凑存储形式）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyArray<'a> {
    handles: &'a [DeviceHandle],
}

/// 一次扫描得到的三个区域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Regions<'a> {
    /// 必需依赖：本设备依赖的设备
    pub required: &'a [DeviceHandle],
    /// 注入依赖：设备定义直接声明的依赖
    pub injected: &'a [DeviceHandle],
    /// 被支持设备：依赖本设备的设备
    pub supported: &'a [DeviceHandle],
}

/// 校验整个数组，返回两个分隔符与结束标记的位置
const fn scan(handles: &[DeviceHandle]) -> Result<(usize, usize, usize), FormatError> {
    let mut seps = [0usize; 2];
    let mut nsep = 0;
    let mut i = 0;
    while i < handles.len() {
        let raw = handles[i].raw();
        if raw == DeviceHandle::SEP.raw() {
            if nsep == 2 {
                return Err(FormatError::UnexpectedSentinel);
            }
            seps[nsep] = i;
            nsep += 1;
        } else if raw == DeviceHandle::ENDS.raw() {
            if nsep < 2 {
                return Err(FormatError::MissingSeparator);
            }
            // 结束标记之后只允许空句柄填充
            let mut j = i + 1;
            while j < handles.len() {
                if handles[j].raw() != DeviceHandle::NULL.raw() {
                    return Err(FormatError::UnexpectedSentinel);
                }
                j += 1;
            }
            return Ok((seps[0], seps[1], i));
        } else if raw <= 0 {
            return Err(FormatError::UnexpectedSentinel);
        }
        i += 1;
    }
    if nsep < 2 {
        Err(FormatError::MissingSeparator)
    } else {
        Err(FormatError::MissingEnd)
    }
}

impl<'a> DependencyArray<'a> {
    /// 校验并包装一个链接后格式的依赖数组
    pub const fn new(handles: &'a [DeviceHandle]) -> Result<Self, FormatError> {
        match scan(handles) {
            Ok(_) => Ok(Self { handles }),
            Err(err) => Err(err),
        }
    }

    /// 在常量上下文中构造，格式错误会导致编译失败
    pub const fn from_static(handles: &'a [DeviceHandle]) -> Self {
        match Self::new(handles) {
            Ok(array) => array,
            Err(err) => panic!("{}", err.as_str()),
        }
    }

    /// 紧凑存储形式（包含哨兵与填充）
    pub const fn as_slice(&self) -> &'a [DeviceHandle] {
        self.handles
    }

    /// 必需依赖区域
    ///
    /// 从偏移 0 扫描到第一个分隔符或结束标记。
    pub fn required(&self) -> &'a [DeviceHandle] {
        take_until(self.handles, |h| h == DeviceHandle::SEP || h == DeviceHandle::ENDS)
    }

    /// 注入依赖区域（第一个与第二个分隔符之间）
    pub fn injected(&self) -> &'a [DeviceHandle] {
        take_until(skip_regions(self.handles, 1), |h| {
            h == DeviceHandle::SEP || h == DeviceHandle::ENDS
        })
    }

    /// 被支持设备区域
    ///
    /// 跳过恰好两个分隔符，再扫描到结束标记。
    pub fn supported(&self) -> &'a [DeviceHandle] {
        take_until(skip_regions(self.handles, 2), |h| h == DeviceHandle::ENDS)
    }

    /// 一次扫描得到全部三个区域
    pub fn split(&self) -> Regions<'a> {
        let mut bounds = [self.handles.len(); 3];
        let mut region = 0;
        for (i, &h) in self.handles.iter().enumerate() {
            if h == DeviceHandle::SEP && region < 2 {
                bounds[region] = i;
                region += 1;
            } else if h == DeviceHandle::ENDS {
                bounds[2] = i;
                break;
            }
        }
        let start_injected = (bounds[0] + 1).min(bounds[1]);
        let start_supported = (bounds[1] + 1).min(bounds[2]);
        Regions {
            required: &self.handles[..bounds[0]],
            injected: &self.handles[start_injected..bounds[1]],
            supported: &self.handles[start_supported..bounds[2]],
        }
    }

    /// 检查每个设备句柄都落在 `1..=count` 内
    pub const fn check_bounds(&self, count: usize) -> Result<(), FormatError> {
        let mut i = 0;
        while i < self.handles.len() {
            let h = self.handles[i];
            if !h.is_sentinel() && !h.is_null() {
                match h.index() {
                    Some(index) if index < count => {}
                    _ => return Err(FormatError::HandleOutOfRange),
                }
            }
            i += 1;
        }
        Ok(())
    }
}

fn take_until(handles: &[DeviceHandle], stop: impl Fn(DeviceHandle) -> bool) -> &[DeviceHandle] {
    let len = handles
        .iter()
        .position(|&h| stop(h))
        .unwrap_or(handles.len());
    &handles[..len]
}

/// 跳过 `regions` 个分隔符之后的剩余部分
fn skip_regions(handles: &[DeviceHandle], regions: usize) -> &[DeviceHandle] {
    handles
        .iter()
        .enumerate()
        .filter(|&(_, &h)| h == DeviceHandle::SEP)
        .nth(regions - 1)
        .map_or(&[] as &[DeviceHandle], |(i, _)| &handles[i + 1..])
}

/// 以链接后格式书写依赖数组
///
/// 三个区域以 `;` 分隔，任一区域可以为空：
///
/// ```
/// use devhandle::{DependencyArray, DeviceHandle, dep_array};
///
/// static DEPS: [DeviceHandle; 6] = dep_array![1, 2; ; 3];
/// let deps = DependencyArray::new(&DEPS).unwrap();
/// assert_eq!(deps.required().len(), 2);
/// assert_eq!(deps.supported(), &[DeviceHandle::from_raw(3)]);
/// ```
#[macro_export]
macro_rules! dep_array {
    ($($req:expr),* ; $($inj:expr),* ; $($sup:expr),* $(,)?) => {
        [
            $($crate::DeviceHandle::from_raw($req),)*
            $crate::DeviceHandle::SEP,
            $($crate::DeviceHandle::from_raw($inj),)*
            $crate::DeviceHandle::SEP,
            $($crate::DeviceHandle::from_raw($sup),)*
            $crate::DeviceHandle::ENDS,
        ]
    };
}
