//! 静态设备注册表
//!
//! 注册表包装一个在构建期确定顺序的设备数组，并在句柄与设备之间做 O(1) 映射：
//! 句柄 = 设备下标 + 1，0 为空句柄。
//!
//! 构造函数是 `const fn`，在静态初始化器中会检查：
//! - 设备数量不超过 [`MAX_DEVICES`]
//! - 设备按（初始化级别，优先级）非递减排列
//! - 每个依赖数组中的句柄都指向本注册表内的设备
//!
//! 任何一项不满足都会导致编译失败。

use core::mem::size_of;
use core::ptr;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use devhandle::DeviceHandle;

use crate::config::MAX_DEVICES;
use crate::device::Device;

/// 静态设备注册表
pub struct DeviceRegistry {
    devices: &'static [Device],
    /// 已完成的初始化级别数
    pub(crate) levels_done: AtomicU8,
    /// 启动流程正在执行
    pub(crate) running: AtomicBool,
    pub(crate) sealed: AtomicBool,
}

const fn validate(devices: &[Device]) {
    assert!(devices.len() <= MAX_DEVICES, "too many devices for 16-bit handles");
    let mut i = 0;
    while i < devices.len() {
        let dev = &devices[i];
        if let Some(deps) = dev.dependencies() {
            if let Err(err) = deps.check_bounds(devices.len()) {
                panic!("{}", err.as_str());
            }
        }
        if i > 0 {
            let prev = &devices[i - 1];
            let prev_level = prev.init_level().index();
            let level = dev.init_level().index();
            assert!(
                prev_level < level || (prev_level == level && prev.priority() <= dev.priority()),
                "devices must be sorted by init level and priority"
            );
        }
        i += 1;
    }
}

impl DeviceRegistry {
    /// 由构建期排好序的设备数组创建注册表
    pub const fn new(devices: &'static [Device]) -> Self {
        validate(devices);
        Self {
            devices,
            levels_done: AtomicU8::new(0),
            running: AtomicBool::new(false),
            sealed: AtomicBool::new(false),
        }
    }

    /// 设备数量
    pub const fn len(&self) -> usize {
        self.devices.len()
    }

    /// 注册表是否为空
    pub const fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// 全部设备，顺序与句柄计算使用的顺序一致
    pub const fn all_devices(&self) -> &'static [Device] {
        self.devices
    }

    /// 设备在数组中的下标，不属于本注册表时返回 `None`
    fn index_of(&self, dev: &Device) -> Option<usize> {
        let base = self.devices.as_ptr().addr();
        let offset = ptr::from_ref(dev).addr().checked_sub(base)?;
        let index = offset / size_of::<Device>();
        (offset % size_of::<Device>() == 0 && index < self.devices.len())
            .then_some(index)
            .filter(|&index| ptr::eq(&self.devices[index], dev))
    }

    /// 设备是否属于本注册表
    pub fn contains(&self, dev: &Device) -> bool {
        self.index_of(dev).is_some()
    }

    /// 设备 → 句柄
    ///
    /// `None` 或不属于本注册表的设备得到空句柄。
    pub fn handle_of(&self, dev: Option<&Device>) -> DeviceHandle {
        dev.and_then(|dev| self.index_of(dev))
            .and_then(DeviceHandle::from_index)
            .unwrap_or(DeviceHandle::NULL)
    }

    /// 句柄 → 设备
    ///
    /// 空句柄、哨兵以及超出 `1..=len` 的句柄返回 `None`。
    pub fn device_of(&self, handle: DeviceHandle) -> Option<&'static Device> {
        self.devices.get(handle.index()?)
    }

    /// 按名字查找已就绪的设备
    ///
    /// 未就绪的设备不可见，空名字直接返回 `None`。
    pub fn get_binding(&self, name: &str) -> Option<&'static Device> {
        if name.is_empty() {
            return None;
        }
        self.devices
            .iter()
            .find(|dev| dev.is_ready() && dev.name() == name)
    }
}

impl core::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceRegistry")
            .field("devices", &self.devices.len())
            .field("levels_done", &self.levels_done.load(Ordering::Relaxed))
            .field("sealed", &self.sealed.load(Ordering::Relaxed))
            .finish()
    }
}
