//! 错误定义

use crate::probe::ProbeAttempt;
use thiserror::Error;

/// 宿主调用错误
///
/// 由能力接口的实现（COM 绑定、模拟宿主）返回。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// 标识符无法解析（未安装或未运行）
    #[error("{prog_id} is not available")]
    NotRegistered { prog_id: String },

    /// 宿主进程存在但尚未完成初始化
    #[error("{prog_id} is still starting up")]
    Unavailable { prog_id: String },

    /// 远程成员调用失败
    #[error("{member} failed: {message}")]
    Call { member: String, message: String },

    /// 当前平台没有可用的绑定
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl HostError {
    pub fn call(member: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Call {
            member: member.into(),
            message: message.into(),
        }
    }

    /// 是否为"尚未就绪"，此时允许重试一次
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// 连接管理器对外的错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CadError {
    #[error("Not connected to AutoCAD/ZWCAD")]
    NotConnected,

    #[error("No AutoCAD or ZWCAD instance could be attached or started ({} attempts)", attempts.len())]
    NoHostAvailable { attempts: Vec<ProbeAttempt> },

    #[error(transparent)]
    Host(#[from] HostError),
}

/// 配置文件错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_detection() {
        let err = HostError::Unavailable {
            prog_id: "AutoCAD.Application".to_string(),
        };
        assert!(err.is_unavailable());
        assert!(!HostError::call("ZoomExtents", "disposed").is_unavailable());
    }

    #[test]
    fn test_messages() {
        assert_eq!(CadError::NotConnected.to_string(), "Not connected to AutoCAD/ZWCAD");
        let err: CadError = HostError::call("AddLine", "Invalid argument").into();
        assert_eq!(err.to_string(), "AddLine failed: Invalid argument");
    }
}
