//! 设备注册表的编译期配置

/// 设备名最大长度（不含结束符）
pub const MAX_NAME_LEN: usize = 47;

/// 设备名缓冲区长度（含结束符）
pub const NAME_BUF_LEN: usize = MAX_NAME_LEN + 1;

/// 单个注册表可容纳的最大设备数量
///
/// 受 16 位句柄限制，见 [`devhandle::MAX_HANDLES`]。
pub const MAX_DEVICES: usize = devhandle::MAX_HANDLES;
