//! 无 COM 平台上的注册表

use cadlink_core::error::HostError;
use cadlink_core::host::{DrawingSpace, HostApplication, HostDocument, HostRegistry};
use cadlink_core::math::Point3;
use std::convert::Infallible;

const REASON: &str = "COM automation is only available on Windows";

/// 所有附加/启动请求都失败的注册表
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedRegistry;

impl HostRegistry for UnsupportedRegistry {
    type Application = Never;

    fn attach(&self, _prog_id: &str) -> Result<Self::Application, HostError> {
        Err(HostError::Unsupported(REASON.to_string()))
    }

    fn launch(&self, _prog_id: &str) -> Result<Self::Application, HostError> {
        Err(HostError::Unsupported(REASON.to_string()))
    }
}

/// 无法构造的句柄类型
#[derive(Debug)]
pub struct Never(Infallible);

impl HostApplication for Never {
    type Document = Never;

    fn active_document(&self) -> Result<Self::Document, HostError> {
        match self.0 {}
    }

    fn name(&self) -> Result<String, HostError> {
        match self.0 {}
    }

    fn version(&self) -> Result<String, HostError> {
        match self.0 {}
    }

    fn set_visible(&self, _visible: bool) -> Result<(), HostError> {
        match self.0 {}
    }

    fn zoom_extents(&self) -> Result<(), HostError> {
        match self.0 {}
    }

    fn release(self) -> Result<(), HostError> {
        match self.0 {}
    }
}

impl HostDocument for Never {
    type Space = Never;

    fn name(&self) -> Result<String, HostError> {
        match self.0 {}
    }

    fn model_space(&self) -> Result<Self::Space, HostError> {
        match self.0 {}
    }

    fn send_command(&self, _text: &str) -> Result<(), HostError> {
        match self.0 {}
    }

    fn release(self) -> Result<(), HostError> {
        match self.0 {}
    }
}

impl DrawingSpace for Never {
    fn add_line(&self, _start: Point3, _end: Point3) -> Result<(), HostError> {
        match self.0 {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadlink_core::prelude::{CadError, ConnectionConfig, ConnectionManager};

    #[test]
    fn test_every_attempt_unsupported() {
        let mut manager = ConnectionManager::new(UnsupportedRegistry, ConnectionConfig::instant());

        let Err(CadError::NoHostAvailable { attempts }) = manager.connect() else {
            panic!("expected probe failure");
        };
        assert_eq!(attempts.len(), 10);
        assert!(attempts
            .iter()
            .all(|a| matches!(a.error, HostError::Unsupported(_))));
        assert!(!manager.is_connected());
    }
}
