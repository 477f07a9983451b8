//! COM 套间初始化

use cadlink_core::error::HostError;
use tracing::debug;
use windows::Win32::Foundation::RPC_E_CHANGED_MODE;
use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED};

/// 当前线程的 COM 初始化
///
/// 所有 COM 句柄都持有它的引用，保证 `CoUninitialize` 发生在最后一次 `Release` 之后。
#[derive(Debug)]
pub(crate) struct Apartment {
    /// 本对象是否负责 `CoUninitialize`
    owned: bool,
}

impl Apartment {
    pub fn enter() -> Result<Self, HostError> {
        let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) };

        // 线程已按其他模型初始化，可以直接使用，但不能由我们反初始化
        if hr == RPC_E_CHANGED_MODE {
            debug!("COM already initialised with a different threading model");
            return Ok(Self { owned: false });
        }

        hr.ok()
            .map_err(|e| HostError::Unsupported(format!("CoInitializeEx failed: {}", e.message())))?;
        Ok(Self { owned: true })
    }
}

impl Drop for Apartment {
    fn drop(&mut self) {
        if self.owned {
            unsafe { CoUninitialize() };
        }
    }
}
