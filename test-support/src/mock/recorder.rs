//! 调用记录器
//!
//! 设备初始化函数是普通函数指针，无法捕获环境，
//! 测试通过静态的 [`CallRecorder`] 记录调用顺序。

use alloc::vec::Vec;
use core::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

/// 定长调用记录器，超出容量的记录被丢弃
pub struct CallRecorder<const N: usize> {
    slots: [AtomicI32; N],
    len: AtomicUsize,
}

impl<const N: usize> CallRecorder<N> {
    /// 创建空记录器
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicI32::new(0) }; N],
            len: AtomicUsize::new(0),
        }
    }

    /// 追加一条记录
    pub fn record(&self, value: i32) {
        let index = self.len.fetch_add(1, Ordering::AcqRel);
        if let Some(slot) = self.slots.get(index) {
            slot.store(value, Ordering::Release);
        }
    }

    /// 已保存的记录数
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire).min(N)
    }

    /// 是否没有记录
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按记录顺序导出
    pub fn to_vec(&self) -> Vec<i32> {
        self.slots[..self.len()]
            .iter()
            .map(|slot| slot.load(Ordering::Acquire))
            .collect()
    }

    /// 清空记录
    pub fn clear(&self) {
        self.len.store(0, Ordering::Release);
    }
}

impl<const N: usize> Default for CallRecorder<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let rec: CallRecorder<4> = CallRecorder::new();
        assert!(rec.is_empty());
        rec.record(3);
        rec.record(1);
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.to_vec(), [3, 1]);

        rec.clear();
        assert!(rec.is_empty());
        rec.record(7);
        assert_eq!(rec.to_vec(), [7]);
    }

    #[test]
    fn test_overflow_is_dropped() {
        let rec: CallRecorder<2> = CallRecorder::new();
        for value in 0..5 {
            rec.record(value);
        }
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.to_vec(), [0, 1]);
    }
}
