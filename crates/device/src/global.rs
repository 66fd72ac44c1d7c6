//! 全局设备注册表
//!
//! 内核在启动时注册唯一的静态注册表，之后各子系统通过本模块的函数访问设备，
//! 无需传递注册表引用。

use core::ptr;
use core::sync::atomic::{AtomicPtr, Ordering};

use devhandle::DeviceHandle;

use crate::device::Device;
use crate::error::DeviceError;
use crate::registry::DeviceRegistry;

static REGISTRY: AtomicPtr<DeviceRegistry> = AtomicPtr::new(ptr::null_mut());

/// 注册全局设备注册表
///
/// 只能注册一次；重复注册同一个注册表是无操作，注册另一个则返回
/// [`DeviceError::AlreadyRegistered`]。
pub fn register_registry(registry: &'static DeviceRegistry) -> Result<(), DeviceError> {
    let new = ptr::from_ref(registry).cast_mut();
    match REGISTRY.compare_exchange(ptr::null_mut(), new, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => Ok(()),
        Err(current) if current == new => Ok(()),
        Err(_) => Err(DeviceError::AlreadyRegistered),
    }
}

/// 获取已注册的全局注册表
pub fn try_registry() -> Option<&'static DeviceRegistry> {
    let ptr = REGISTRY.load(Ordering::Acquire);
    // SAFETY: 只有 register_registry 会写入，写入的总是 &'static 引用，且永不移除
    unsafe { ptr.as_ref() }
}

/// 获取已注册的全局注册表
///
/// # Panics
/// 如果尚未调用 [`register_registry`]，则 panic
#[inline]
pub fn registry() -> &'static DeviceRegistry {
    match try_registry() {
        Some(registry) => registry,
        None => panic!("device: registry not registered, call register_registry first"),
    }
}

/// 设备 → 句柄，见 [`DeviceRegistry::handle_of`]
pub fn handle_of(dev: Option<&Device>) -> DeviceHandle {
    registry().handle_of(dev)
}

/// 句柄 → 设备，见 [`DeviceRegistry::device_of`]
pub fn device_of(handle: DeviceHandle) -> Option<&'static Device> {
    registry().device_of(handle)
}

/// 全部静态设备
pub fn all_devices() -> &'static [Device] {
    registry().all_devices()
}

/// 按名字查找已就绪的设备
pub fn get_binding(name: &str) -> Option<&'static Device> {
    registry().get_binding(name)
}

/// 依次访问必需依赖，见 [`DeviceRegistry::for_each_required`]
pub fn for_each_required<E, F>(dev: &Device, visitor: F) -> Result<(), E>
where
    F: FnMut(&'static Device) -> Result<(), E>,
{
    registry().for_each_required(dev, visitor)
}

/// 依次访问被支持设备，见 [`DeviceRegistry::for_each_supported`]
pub fn for_each_supported<E, F>(dev: &Device, visitor: F) -> Result<(), E>
where
    F: FnMut(&'static Device) -> Result<(), E>,
{
    registry().for_each_supported(dev, visitor)
}
