//! 启动流程
//!
//! 启动流程按初始化级别依次执行，级别内按设备数组顺序（即优先级顺序）
//! 调用每个设备的初始化函数恰好一次，并立即记录结果。
//!
//! - 没有初始化函数的设备在轮到它时直接视为初始化成功
//! - 延迟初始化设备被跳过，之后通过 [`DeviceRegistry::init_deferred`] 单独初始化
//! - 初始化失败是永久的：结果码被记录，设备永远不就绪，不会重试
//!
//! 同一时刻只允许一个启动流程执行；[`DeviceRegistry::init_all`] 完成后注册表被封存，
//! 此后只有延迟初始化设备的状态还会被写入（每个设备至多一次）。

use core::ops::AddAssign;
use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use crate::device::{Device, InitLevel};
use crate::error::{DeviceError, InitError};
use crate::registry::DeviceRegistry;

/// 一次启动流程的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    /// 初始化成功的设备数
    pub initialized: usize,
    /// 初始化失败的设备数
    pub failed: usize,
    /// 被跳过的设备数（延迟初始化或已初始化）
    pub skipped: usize,
}

impl AddAssign for InitReport {
    fn add_assign(&mut self, rhs: Self) {
        self.initialized += rhs.initialized;
        self.failed += rhs.failed;
        self.skipped += rhs.skipped;
    }
}

/// 启动流程互斥标记的 RAII 保护器
struct BringUpGuard<'a> {
    running: &'a AtomicBool,
}

impl<'a> BringUpGuard<'a> {
    fn acquire(running: &'a AtomicBool) -> Result<Self, DeviceError> {
        running
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| Self { running })
            .map_err(|_| DeviceError::Busy)
    }
}

impl Drop for BringUpGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl DeviceRegistry {
    /// 执行所有尚未执行的级别，直到并包括 `level`
    ///
    /// # 错误
    /// - [`DeviceError::Sealed`]：注册表已封存
    /// - [`DeviceError::Busy`]：另一个启动流程正在执行
    /// - [`DeviceError::AlreadyInitialized`]：`level` 已经执行过
    pub fn run_level(&self, level: InitLevel) -> Result<InitReport, DeviceError> {
        if self.is_sealed() {
            return Err(DeviceError::Sealed);
        }
        let _guard = BringUpGuard::acquire(&self.running)?;

        let done = self.levels_done.load(Ordering::Acquire);
        if level.index() < done {
            return Err(DeviceError::AlreadyInitialized);
        }

        let mut report = InitReport::default();
        for &lvl in &InitLevel::ALL[done as usize..=level.index() as usize] {
            let level_report = self.run_one_level(lvl);
            info!(
                "device: level {:?} done, {} ok, {} failed, {} skipped",
                lvl, level_report.initialized, level_report.failed, level_report.skipped
            );
            report += level_report;
            self.levels_done.store(lvl.index() + 1, Ordering::Release);
        }
        Ok(report)
    }

    /// 执行全部级别并封存注册表
    pub fn init_all(&self) -> Result<InitReport, DeviceError> {
        let report = self.run_level(InitLevel::Smp)?;
        self.seal();
        Ok(report)
    }

    /// 封存注册表，之后不再接受启动流程
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    /// 注册表是否已封存
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// 初始化单个延迟初始化设备
    ///
    /// 每个设备至多成功调用一次；初始化函数失败时返回
    /// [`DeviceError::InitFailed`]，设备保持未就绪。
    pub fn init_deferred(&self, dev: &'static Device) -> Result<(), DeviceError> {
        if !self.contains(dev) {
            return Err(DeviceError::NoDevice);
        }
        if !dev.is_deferred() {
            return Err(DeviceError::NotDeferred);
        }
        dev.state().claim()?;
        self.call_init(dev)?;
        Ok(())
    }

    fn run_one_level(&self, level: InitLevel) -> InitReport {
        let mut report = InitReport::default();
        for dev in self.all_devices().iter().filter(|d| d.init_level() == level) {
            if dev.is_deferred() {
                report.skipped += 1;
                continue;
            }
            if let Err(err) = dev.state().claim() {
                debug!("device: skip {}: {}", dev.name(), err);
                report.skipped += 1;
                continue;
            }
            match self.call_init(dev) {
                Ok(()) => report.initialized += 1,
                Err(_) => report.failed += 1,
            }
        }
        report
    }

    /// 调用初始化函数并发布结果，调用者已取得初始化权
    fn call_init(&self, dev: &'static Device) -> Result<(), InitError> {
        for dep in self.required_devices(dev).filter(|dep| !dep.is_ready()) {
            warn!(
                "device: {} initialized before its dependency {} is ready",
                dev.name(),
                dep.name()
            );
        }

        let result = dev.init_fn().map_or(Ok(()), |init| init(dev));
        dev.state().complete(result);

        match result {
            Ok(()) => debug!(
                "device: {} initialized (level {:?}, priority {})",
                dev.name(),
                dev.init_level(),
                dev.priority()
            ),
            Err(err) => warn!("device: {} init failed with code {}", dev.name(), err.code()),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DeviceState;

    fn ok(_: &'static Device) -> Result<(), InitError> {
        Ok(())
    }

    fn fail(_: &'static Device) -> Result<(), InitError> {
        Err(InitError::IO)
    }

    static STATES: [DeviceState; 4] = [const { DeviceState::new() }; 4];
    static DEVICES: [Device; 4] = [
        Device::new("early", &STATES[0]).init(ok).level(InitLevel::PreKernel1, 0),
        Device::new("broken", &STATES[1]).init(fail).level(InitLevel::PreKernel2, 0),
        Device::new("plain", &STATES[2]).level(InitLevel::PostKernel, 5),
        Device::new("lazy", &STATES[3]).init(ok).level(InitLevel::PostKernel, 9).deferred(),
    ];
    static REGISTRY: DeviceRegistry = DeviceRegistry::new(&DEVICES);

    #[test]
    fn test_bring_up_sequence() {
        let report = REGISTRY.run_level(InitLevel::PreKernel1).unwrap();
        assert_eq!(report, InitReport { initialized: 1, failed: 0, skipped: 0 });
        assert!(DEVICES[0].is_ready());
        assert!(!DEVICES[1].state().initialized());

        assert_eq!(
            REGISTRY.run_level(InitLevel::PreKernel1),
            Err(DeviceError::AlreadyInitialized)
        );

        let report = REGISTRY.init_all().unwrap();
        assert_eq!(report, InitReport { initialized: 1, failed: 1, skipped: 1 });
        assert!(REGISTRY.is_sealed());

        assert!(!DEVICES[1].is_ready());
        assert_eq!(DEVICES[1].state().init_res(), 5);
        assert!(DEVICES[2].is_ready());
        assert!(!DEVICES[3].state().initialized());

        assert_eq!(REGISTRY.run_level(InitLevel::Smp), Err(DeviceError::Sealed));

        // 延迟初始化设备在封存后仍可初始化一次
        assert_eq!(
            REGISTRY.init_deferred(&DEVICES[2]),
            Err(DeviceError::NotDeferred)
        );
        assert_eq!(REGISTRY.init_deferred(&DEVICES[3]), Ok(()));
        assert!(DEVICES[3].is_ready());
        assert_eq!(
            REGISTRY.init_deferred(&DEVICES[3]),
            Err(DeviceError::AlreadyInitialized)
        );
    }

    #[test]
    fn test_busy_guard() {
        let running = AtomicBool::new(false);
        let guard = BringUpGuard::acquire(&running).unwrap();
        assert!(matches!(BringUpGuard::acquire(&running), Err(DeviceError::Busy)));
        drop(guard);
        assert!(BringUpGuard::acquire(&running).is_ok());
    }
}
