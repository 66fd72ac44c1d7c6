//! 链接前的依赖数组与序号改写
//!
//! 生成器为每个设备输出的链接前数组格式为：
//!
//! ```text
//! [ 自身序号 (或 NULL), 必需依赖序号..., SEP, 注入依赖序号..., SEP, 被支持设备序号... ]
//! ```
//!
//! 设备顺序确定之后，改写步骤把每个序号替换为承载该序号的设备句柄，
//! 丢弃没有对应设备的序号，追加结束标记，并用 NULL 把数组填充回原长度，
//! 使改写结果可以原地覆盖链接前数组。
//!
//! 序号 0 视为“无序号”，永远不会匹配任何设备。

use crate::error::FormatError;
use crate::handle::{DeviceHandle, MAX_HANDLES};

const SEP: i16 = DeviceHandle::SEP.raw();
const ENDS: i16 = DeviceHandle::ENDS.raw();
const NULL: i16 = DeviceHandle::NULL.raw();

/// 解析后的链接前数组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrelinkArray<'a> {
    own: i16,
    required: &'a [i16],
    injected: &'a [i16],
    supported: &'a [i16],
}

/// 校验链接前格式，返回两个分隔符的位置
const fn scan_prelink(raw: &[i16]) -> Result<(usize, usize), FormatError> {
    if raw.is_empty() {
        return Err(FormatError::MissingSeparator);
    }
    if raw[0] < 0 || raw[0] == ENDS {
        return Err(FormatError::UnexpectedSentinel);
    }
    let mut seps = [0usize; 2];
    let mut nsep = 0;
    let mut i = 1;
    while i < raw.len() {
        let v = raw[i];
        if v == SEP {
            if nsep == 2 {
                return Err(FormatError::UnexpectedSentinel);
            }
            seps[nsep] = i;
            nsep += 1;
        } else if v < 0 || v == ENDS {
            return Err(FormatError::UnexpectedSentinel);
        }
        i += 1;
    }
    if nsep < 2 {
        return Err(FormatError::MissingSeparator);
    }
    Ok((seps[0], seps[1]))
}

impl<'a> PrelinkArray<'a> {
    /// 解析链接前数组
    pub fn new(raw: &'a [i16]) -> Result<Self, FormatError> {
        let (first, second) = scan_prelink(raw)?;
        Ok(Self {
            own: raw[0],
            required: &raw[1..first],
            injected: &raw[first + 1..second],
            supported: &raw[second + 1..],
        })
    }

    /// 设备自身的序号，非硬件描述节点返回 `None`
    pub fn own_ordinal(&self) -> Option<i16> {
        (self.own != NULL).then_some(self.own)
    }

    /// 必需依赖序号
    pub fn required(&self) -> &'a [i16] {
        self.required
    }

    /// 注入依赖序号
    pub fn injected(&self) -> &'a [i16] {
        self.injected
    }

    /// 被支持设备序号
    pub fn supported(&self) -> &'a [i16] {
        self.supported
    }
}

/// 查找承载 `ordinal` 的设备句柄
const fn lookup(ordinal: i16, link_order: &[i16]) -> Option<i16> {
    if ordinal == NULL {
        return None;
    }
    let mut i = 0;
    while i < link_order.len() {
        if link_order[i] == ordinal {
            return Some(i as i16 + 1);
        }
        i += 1;
    }
    None
}

/// 原地把链接前数组改写为链接后格式
///
/// `link_order[i]` 是句柄为 `i + 1` 的设备的序号（非硬件描述设备为 NULL）。
/// 返回编码长度（含结束标记），其后的元素均被置为 NULL。
pub const fn rewrite_in_place(buf: &mut [i16], link_order: &[i16]) -> Result<usize, FormatError> {
    if link_order.len() > MAX_HANDLES {
        return Err(FormatError::HandleOutOfRange);
    }
    if let Err(err) = scan_prelink(buf) {
        return Err(err);
    }

    // 自身序号的槽位被释放，写指针始终落后于读指针
    let mut w = 0;
    let mut r = 1;
    while r < buf.len() {
        let v = buf[r];
        if v == SEP {
            buf[w] = SEP;
            w += 1;
        } else if let Some(handle) = lookup(v, link_order) {
            buf[w] = handle;
            w += 1;
        }
        r += 1;
    }
    buf[w] = ENDS;
    w += 1;

    let end = w;
    while w < buf.len() {
        buf[w] = NULL;
        w += 1;
    }
    Ok(end)
}

/// 在常量上下文中完成改写，格式错误会导致编译失败
///
/// ```
/// use devhandle::{DependencyArray, DeviceHandle, rewrite};
///
/// // 设备 1 的序号为 10，设备 2 的序号为 20
/// const LINK_ORDER: [i16; 2] = [10, 20];
/// static DEPS: [DeviceHandle; 5] = rewrite([10, 20, i16::MIN, i16::MIN, 30], &LINK_ORDER);
///
/// let deps = DependencyArray::new(&DEPS).unwrap();
/// assert_eq!(deps.required(), &[DeviceHandle::from_raw(2)]);
/// assert!(deps.supported().is_empty());
/// ```
pub const fn rewrite<const N: usize>(prelink: [i16; N], link_order: &[i16]) -> [DeviceHandle; N] {
    let mut buf = prelink;
    if let Err(err) = rewrite_in_place(&mut buf, link_order) {
        panic!("{}", err.as_str());
    }
    let mut out = [DeviceHandle::NULL; N];
    let mut i = 0;
    while i < N {
        out[i] = DeviceHandle::from_raw(buf[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::DependencyArray;

    fn h(raw: i16) -> DeviceHandle {
        DeviceHandle::from_raw(raw)
    }

    #[test]
    fn test_parse_prelink() {
        let raw = [7, 3, 4, SEP, 9, SEP, 11];
        let pre = PrelinkArray::new(&raw).unwrap();
        assert_eq!(pre.own_ordinal(), Some(7));
        assert_eq!(pre.required(), &[3, 4]);
        assert_eq!(pre.injected(), &[9]);
        assert_eq!(pre.supported(), &[11]);

        let anonymous = [NULL, SEP, SEP];
        let pre = PrelinkArray::new(&anonymous).unwrap();
        assert_eq!(pre.own_ordinal(), None);
        assert!(pre.required().is_empty());
        assert!(pre.supported().is_empty());
    }

    #[test]
    fn test_parse_prelink_rejects_malformed() {
        assert_eq!(PrelinkArray::new(&[]), Err(FormatError::MissingSeparator));
        assert_eq!(
            PrelinkArray::new(&[1, 2, SEP]),
            Err(FormatError::MissingSeparator)
        );
        assert_eq!(
            PrelinkArray::new(&[1, SEP, SEP, ENDS]),
            Err(FormatError::UnexpectedSentinel)
        );
        assert_eq!(
            PrelinkArray::new(&[1, SEP, SEP, SEP]),
            Err(FormatError::UnexpectedSentinel)
        );
    }

    #[test]
    fn test_rewrite_maps_ordinals_to_handles() {
        // 句柄 1..=3 的设备序号分别为 5, 8, 2
        let link_order = [5, 8, 2];
        let mut buf = [5, 8, SEP, 2, SEP, 8, 2];
        let end = rewrite_in_place(&mut buf, &link_order).unwrap();
        assert_eq!(end, 7);
        assert_eq!(buf, [2, SEP, 3, SEP, 2, 3, ENDS]);
    }

    #[test]
    fn test_rewrite_drops_unknown_ordinals_and_pads() {
        let link_order = [5, NULL, 8];
        // 序号 42 与 0 没有对应设备
        let mut buf = [8, 5, 42, 0, SEP, SEP, 42];
        let end = rewrite_in_place(&mut buf, &link_order).unwrap();
        assert_eq!(end, 4);
        assert_eq!(buf, [1, SEP, SEP, ENDS, NULL, NULL, NULL]);
    }

    #[test]
    fn test_rewrite_minimal_array() {
        let mut buf = [NULL, SEP, SEP];
        assert_eq!(rewrite_in_place(&mut buf, &[]), Ok(3));
        assert_eq!(buf, [SEP, SEP, ENDS]);
    }

    #[test]
    fn test_rewrite_const() {
        const LINK_ORDER: [i16; 3] = [10, 20, 30];
        static DEPS: [DeviceHandle; 7] = rewrite([20, 10, SEP, 30, SEP, 30, 99], &LINK_ORDER);

        assert_eq!(
            DEPS,
            [
                h(1),
                DeviceHandle::SEP,
                h(3),
                DeviceHandle::SEP,
                h(3),
                DeviceHandle::ENDS,
                DeviceHandle::NULL
            ]
        );
        let deps = DependencyArray::from_static(&DEPS);
        assert_eq!(deps.injected(), &[h(3)]);
        assert_eq!(deps.supported(), &[h(3)]);
    }
}
