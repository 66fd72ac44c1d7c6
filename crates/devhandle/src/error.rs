//! 依赖数组格式错误
//!
//! 依赖数组在构建期生成，格式错误意味着生成器或链接后改写出错。
//! 常量上下文中的构造会把这些错误变成编译失败。

/// 依赖数组格式错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// 缺少区域分隔符（应恰好出现两次）
    MissingSeparator,
    /// 链接后格式缺少结束标记
    MissingEnd,
    /// 区域内出现了哨兵或负值，或结束标记后出现非空值
    UnexpectedSentinel,
    /// 句柄超出设备数量范围
    HandleOutOfRange,
}

impl FormatError {
    /// 转换为系统调用错误码（负数）
    pub const fn to_errno(&self) -> isize {
        match self {
            FormatError::MissingSeparator
            | FormatError::MissingEnd
            | FormatError::UnexpectedSentinel => -22,
            FormatError::HandleOutOfRange => -34,
        }
    }

    /// 错误描述，供常量求值失败时输出
    pub const fn as_str(&self) -> &'static str {
        match self {
            FormatError::MissingSeparator => "dependency array: missing separator",
            FormatError::MissingEnd => "dependency array: missing end marker",
            FormatError::UnexpectedSentinel => "dependency array: unexpected sentinel",
            FormatError::HandleOutOfRange => "dependency array: handle out of range",
        }
    }
}

impl core::fmt::Display for FormatError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
