//! 依赖遍历
//!
//! 按数组顺序（即生成器输出依赖序号的顺序）访问设备的依赖区域，
//! 每个句柄都通过注册表解析为设备。
//!
//! 访问者返回 `Err` 时遍历立即停止，并把该错误作为整体结果返回；
//! 区域为空、设备没有依赖数组、或全部访问都成功时返回 `Ok(())`。
//!
//! 依赖数组中的句柄只在设备所属的注册表内有意义，
//! 不属于本注册表的设备按没有依赖信息处理。

use core::iter::FusedIterator;
use core::slice;

use devhandle::DeviceHandle;

use crate::device::Device;
use crate::registry::DeviceRegistry;

/// 依赖区域中设备的迭代器
#[derive(Debug, Clone)]
pub struct DeviceIter<'r> {
    registry: &'r DeviceRegistry,
    handles: slice::Iter<'static, DeviceHandle>,
}

impl<'r> DeviceIter<'r> {
    fn new(registry: &'r DeviceRegistry, handles: Option<&'static [DeviceHandle]>) -> Self {
        Self {
            registry,
            handles: handles.unwrap_or_default().iter(),
        }
    }
}

impl Iterator for DeviceIter<'_> {
    type Item = &'static Device;

    fn next(&mut self) -> Option<Self::Item> {
        // 注册表构造时已校验句柄范围，这里总能解析成功
        let registry = self.registry;
        self.handles
            .by_ref()
            .find_map(|&handle| registry.device_of(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.handles.len()))
    }
}

impl FusedIterator for DeviceIter<'_> {}

impl DeviceRegistry {
    fn region_of(
        &self,
        dev: &Device,
        region: fn(&Device) -> Option<&'static [DeviceHandle]>,
    ) -> DeviceIter<'_> {
        let handles = if self.contains(dev) { region(dev) } else { None };
        DeviceIter::new(self, handles)
    }

    /// 必需依赖设备
    pub fn required_devices(&self, dev: &Device) -> DeviceIter<'_> {
        self.region_of(dev, Device::required_handles)
    }

    /// 注入依赖设备
    pub fn injected_devices(&self, dev: &Device) -> DeviceIter<'_> {
        self.region_of(dev, Device::injected_handles)
    }

    /// 被支持设备（依赖本设备的设备）
    pub fn supported_devices(&self, dev: &Device) -> DeviceIter<'_> {
        self.region_of(dev, Device::supported_handles)
    }

    /// 依次访问必需依赖，访问者出错时立即停止
    pub fn for_each_required<E, F>(&self, dev: &Device, visitor: F) -> Result<(), E>
    where
        F: FnMut(&'static Device) -> Result<(), E>,
    {
        self.required_devices(dev).try_for_each(visitor)
    }

    /// 依次访问注入依赖，访问者出错时立即停止
    pub fn for_each_injected<E, F>(&self, dev: &Device, visitor: F) -> Result<(), E>
    where
        F: FnMut(&'static Device) -> Result<(), E>,
    {
        self.injected_devices(dev).try_for_each(visitor)
    }

    /// 依次访问被支持设备，访问者出错时立即停止
    pub fn for_each_supported<E, F>(&self, dev: &Device, visitor: F) -> Result<(), E>
    where
        F: FnMut(&'static Device) -> Result<(), E>,
    {
        self.supported_devices(dev).try_for_each(visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DeviceState;
    use alloc::vec::Vec;
    use devhandle::dep_array;

    static STATES: [DeviceState; 4] = [const { DeviceState::new() }; 4];
    static HUB_DEPS: [DeviceHandle; 8] = dep_array![2, 3, 4; 4; 2];
    static DEVICES: [Device; 4] = [
        Device::new("hub", &STATES[0]).handles(&HUB_DEPS),
        Device::new("clk", &STATES[1]),
        Device::new("pwr", &STATES[2]),
        Device::new("pin", &STATES[3]),
    ];
    static REGISTRY: DeviceRegistry = DeviceRegistry::new(&DEVICES);

    // 与 hub 的依赖数组相同，但不在 REGISTRY 中
    static STRAY_STATE: DeviceState = DeviceState::new();
    static STRAY: Device = Device::new("stray", &STRAY_STATE).handles(&HUB_DEPS);

    fn names(iter: DeviceIter<'_>) -> Vec<&'static str> {
        iter.map(Device::name).collect()
    }

    #[test]
    fn test_visit_in_array_order() {
        let hub = &DEVICES[0];
        assert_eq!(names(REGISTRY.required_devices(hub)), ["clk", "pwr", "pin"]);
        assert_eq!(names(REGISTRY.injected_devices(hub)), ["pin"]);
        assert_eq!(names(REGISTRY.supported_devices(hub)), ["clk"]);
    }

    #[test]
    fn test_short_circuit_on_error() {
        let hub = &DEVICES[0];
        let mut visited = Vec::new();
        let res = REGISTRY.for_each_required(hub, |dev| {
            visited.push(dev.name());
            if dev.name() == "pwr" { Err(-5) } else { Ok(()) }
        });
        assert_eq!(res, Err(-5));
        assert_eq!(visited, ["clk", "pwr"]);
    }

    #[test]
    fn test_absent_array_visits_nothing() {
        let clk = &DEVICES[1];
        let mut count = 0;
        let res: Result<(), ()> = REGISTRY.for_each_required(clk, |_| {
            count += 1;
            Ok(())
        });
        assert_eq!(res, Ok(()));
        assert_eq!(count, 0);
        assert_eq!(REGISTRY.supported_devices(clk).count(), 0);
    }

    #[test]
    fn test_foreign_device_visits_nothing() {
        assert_eq!(STRAY.required_count(), 3);
        assert_eq!(REGISTRY.required_devices(&STRAY).count(), 0);
        assert_eq!(REGISTRY.injected_devices(&STRAY).count(), 0);
        assert_eq!(REGISTRY.supported_devices(&STRAY).count(), 0);

        let mut visited = Vec::new();
        let res: Result<(), ()> = REGISTRY.for_each_required(&STRAY, |dev| {
            visited.push(dev.name());
            Ok(())
        });
        assert_eq!(res, Ok(()));
        assert!(visited.is_empty());
    }
}
