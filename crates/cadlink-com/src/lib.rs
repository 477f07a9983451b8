//! CADLink COM 绑定
//!
//! 在 Windows 上通过 COM 自动化（`IDispatch`）实现宿主能力接口：
//! - `CLSIDFromProgID` 解析标识符
//! - `GetActiveObject` 附加到运行中的实例
//! - `CoCreateInstance` 启动新实例
//!
//! 其他平台没有 COM，[`UnsupportedRegistry`] 对所有调用返回
//! [`HostError::Unsupported`](cadlink_core::error::HostError::Unsupported)。

#[cfg(windows)]
mod apartment;
#[cfg(windows)]
mod dispatch;
#[cfg(windows)]
mod registry;
mod unsupported;

#[cfg(windows)]
pub use registry::{ComApplication, ComDocument, ComModelSpace, ComRegistry};
pub use unsupported::UnsupportedRegistry;

/// 当前平台是否有 COM 绑定
pub const fn is_supported() -> bool {
    cfg!(windows)
}
