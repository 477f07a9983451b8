//! 连接管理器
//!
//! 持有宿主应用和活动文档两个句柄，并把少量操作转发给宿主。
//! 两个句柄总是一起获取、一起释放：`is_connected()` 为真当且仅当二者都存在。

use crate::config::ConnectionConfig;
use crate::error::CadError;
use crate::host::{DrawingSpace, HostApplication, HostDocument, HostRegistry};
use crate::math::on_plane;
use crate::probe;
use std::fmt;
use tracing::{debug, info, warn};

/// 未连接时 `document_info_text` 返回的文本
pub const NOT_CONNECTED_MESSAGE: &str = "Not connected to AutoCAD/ZWCAD";

/// 当前文档信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub application: String,
    pub version: String,
    pub document: String,
}

impl fmt::Display for DocumentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Application: {}\nVersion: {}\nDocument: {}",
            self.application, self.version, self.document
        )
    }
}

/// 已建立的连接
struct Link<A: HostApplication> {
    application: A,
    document: A::Document,
    label: String,
}

/// AutoCAD / ZWCAD 连接管理器
///
/// 不做任何内部加锁：`connect`/`disconnect` 需要 `&mut self`，
/// 由所有者（通常是 [`crate::session::Session`] 的工作线程）保证串行调用。
pub struct ConnectionManager<R: HostRegistry> {
    registry: R,
    config: ConnectionConfig,
    link: Option<Link<R::Application>>,
}

impl<R: HostRegistry> ConnectionManager<R> {
    pub fn new(registry: R, config: ConnectionConfig) -> Self {
        Self {
            registry,
            config,
            link: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// 已连接的应用名称，如 "AutoCAD (AutoCAD.Application.25)" 或 "ZWCAD"
    pub fn connected_application(&self) -> Option<&str> {
        self.link.as_ref().map(|link| link.label.as_str())
    }

    /// 连接到 AutoCAD 或 ZWCAD
    ///
    /// 已连接时不重新探测，直接返回当前应用名称。
    /// 全部尝试失败时返回 [`CadError::NoHostAvailable`]，其中列出每次尝试。
    pub fn connect(&mut self) -> Result<String, CadError> {
        if let Some(label) = self.connected_application() {
            debug!("Already connected to {}", label);
            return Ok(label.to_string());
        }

        info!("Probing for AutoCAD/ZWCAD...");
        match probe::acquire(&self.registry, &self.config) {
            Ok(acquired) => {
                let label = acquired.label.clone();
                self.link = Some(Link {
                    application: acquired.application,
                    document: acquired.document,
                    label: acquired.label,
                });
                Ok(label)
            }
            Err(attempts) => {
                warn!("No CAD host found after {} attempts", attempts.len());
                Err(CadError::NoHostAvailable { attempts })
            }
        }
    }

    /// 断开连接
    ///
    /// 未连接时什么也不做。先释放文档再释放应用；
    /// 释放失败只记录日志（宿主进程可能已经退出），状态总会被清空。
    pub fn disconnect(&mut self) {
        let Some(Link {
            application,
            document,
            label,
        }) = self.link.take()
        else {
            return;
        };

        if let Err(e) = document.release() {
            warn!("Failed to release document of {}: {}", label, e);
        }
        if let Err(e) = application.release() {
            warn!("Failed to release {}: {}", label, e);
        }

        info!("Disconnected from {}", label);
    }

    /// 在模型空间中画一条 z = 0 的直线，然后缩放至全部
    ///
    /// 失败不会断开连接。
    pub fn draw_line(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), CadError> {
        let link = self.link()?;

        let result = link
            .document
            .model_space()
            .and_then(|space| space.add_line(on_plane(x1, y1), on_plane(x2, y2)))
            .and_then(|_| link.application.zoom_extents());

        result
            .inspect_err(|e| warn!("Error drawing line: {}", e))
            .map_err(CadError::from)
    }

    /// 将命令原样（附加换行）送入宿主命令行
    ///
    /// 只反映调用本身是否成功，宿主对命令的执行结果不会返回。
    pub fn send_command(&self, command: &str) -> Result<(), CadError> {
        let link = self.link()?;

        link.document
            .send_command(&format!("{}\n", command))
            .inspect_err(|e| warn!("Error sending command '{}': {}", command, e))
            .map_err(CadError::from)
    }

    /// 读取文档名、应用名和版本
    pub fn document_info(&self) -> Result<DocumentInfo, CadError> {
        let link = self.link()?;

        Ok(DocumentInfo {
            document: link.document.name()?,
            application: link.application.name()?,
            version: link.application.version()?,
        })
    }

    /// 文档信息的文本形式，任何失败都转成描述文字
    pub fn document_info_text(&self) -> String {
        match self.document_info() {
            Ok(info) => info.to_string(),
            Err(CadError::NotConnected) => NOT_CONNECTED_MESSAGE.to_string(),
            Err(e) => format!("Error getting document info: {}", e),
        }
    }

    /// 视图缩放至全部内容
    pub fn zoom_extents(&self) -> Result<(), CadError> {
        let link = self.link()?;

        link.application
            .zoom_extents()
            .inspect_err(|e| warn!("Error zooming to extents: {}", e))
            .map_err(CadError::from)
    }

    fn link(&self) -> Result<&Link<R::Application>, CadError> {
        self.link.as_ref().ok_or(CadError::NotConnected)
    }
}

impl<R: HostRegistry> Drop for ConnectionManager<R> {
    fn drop(&mut self) {
        // 调用方忘记断开时兜底释放句柄
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::{HostCall, SimulatedRegistry};

    fn connected() -> (SimulatedRegistry, ConnectionManager<SimulatedRegistry>) {
        let registry = SimulatedRegistry::demo();
        let mut manager = ConnectionManager::new(registry.clone(), ConnectionConfig::instant());
        manager.connect().expect("Failed to connect");
        (registry, manager)
    }

    #[test]
    fn test_initial_state() {
        let manager = ConnectionManager::new(SimulatedRegistry::new(), ConnectionConfig::instant());
        assert!(!manager.is_connected());
        assert_eq!(manager.connected_application(), None);
    }

    #[test]
    fn test_disconnect_without_connect() {
        let registry = SimulatedRegistry::new();
        let mut manager = ConnectionManager::new(registry.clone(), ConnectionConfig::instant());

        manager.disconnect();
        manager.disconnect();

        assert!(!manager.is_connected());
        assert!(registry.journal().is_empty());
    }

    #[test]
    fn test_connect_and_disconnect() {
        let (registry, mut manager) = connected();
        assert!(manager.is_connected());
        assert_eq!(
            manager.connected_application(),
            Some("AutoCAD (AutoCAD.Application.25)")
        );
        assert_eq!(registry.live_handles(), 2);

        manager.disconnect();
        assert!(!manager.is_connected());
        assert_eq!(manager.connected_application(), None);
        assert_eq!(registry.live_handles(), 0);
    }

    #[test]
    fn test_release_order() {
        let (registry, mut manager) = connected();
        registry.clear_journal();

        manager.disconnect();
        assert_eq!(
            registry.journal(),
            vec![HostCall::ReleaseDocument, HostCall::ReleaseApplication]
        );
    }

    #[test]
    fn test_release_failure_still_clears_state() {
        let (registry, mut manager) = connected();
        registry.fail_member("ReleaseDocument");
        registry.fail_member("ReleaseApplication");

        manager.disconnect();
        assert!(!manager.is_connected());
        assert_eq!(manager.connected_application(), None);
    }

    #[test]
    fn test_operations_require_connection() {
        let manager = ConnectionManager::new(SimulatedRegistry::demo(), ConnectionConfig::instant());

        assert_eq!(manager.draw_line(0.0, 0.0, 1.0, 1.0), Err(CadError::NotConnected));
        assert_eq!(manager.send_command("LINE"), Err(CadError::NotConnected));
        assert_eq!(manager.zoom_extents(), Err(CadError::NotConnected));
        assert_eq!(manager.document_info(), Err(CadError::NotConnected));
        assert_eq!(manager.document_info_text(), NOT_CONNECTED_MESSAGE);
    }

    #[test]
    fn test_draw_line() {
        let (registry, manager) = connected();
        registry.clear_journal();

        manager.draw_line(0.0, 0.0, 100.0, 100.0).unwrap();

        let lines = registry.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, on_plane(0.0, 0.0));
        assert_eq!(lines[0].1, on_plane(100.0, 100.0));
        assert_eq!(
            registry.journal(),
            vec![
                HostCall::ModelSpace,
                HostCall::AddLine(on_plane(0.0, 0.0), on_plane(100.0, 100.0)),
                HostCall::ZoomExtents,
            ]
        );
    }

    #[test]
    fn test_draw_line_failure_keeps_connection() {
        let (registry, manager) = connected();
        registry.fail_member("AddLine");

        let result = manager.draw_line(0.0, 0.0, 10.0, 0.0);
        assert!(matches!(result, Err(CadError::Host(_))));
        assert!(manager.is_connected());
        assert_eq!(registry.zoom_count(), 0);
    }

    #[test]
    fn test_send_command_appends_newline() {
        let (registry, manager) = connected();

        manager.send_command("LINE").unwrap();
        assert_eq!(registry.commands(), vec!["LINE\n".to_string()]);
    }

    #[test]
    fn test_document_info() {
        let (registry, manager) = connected();
        registry.set_identity("AutoCAD", "24.1s (LMS Tech)", "Plan.dwg");

        let info = manager.document_info().unwrap();
        assert_eq!(info.document, "Plan.dwg");
        assert_eq!(
            manager.document_info_text(),
            "Application: AutoCAD\nVersion: 24.1s (LMS Tech)\nDocument: Plan.dwg"
        );
    }

    #[test]
    fn test_document_info_failure_is_text() {
        let (registry, manager) = connected();
        registry.fail_member("Version");

        let text = manager.document_info_text();
        assert!(text.starts_with("Error getting document info:"));
        assert!(manager.is_connected());
    }

    #[test]
    fn test_zoom_extents() {
        let (registry, manager) = connected();

        manager.zoom_extents().unwrap();
        assert_eq!(registry.zoom_count(), 1);

        registry.fail_member("ZoomExtents");
        assert!(manager.zoom_extents().is_err());
        assert!(manager.is_connected());
    }

    #[test]
    fn test_drop_releases_handles() {
        let (registry, manager) = connected();
        assert_eq!(registry.live_handles(), 2);

        drop(manager);
        assert_eq!(registry.live_handles(), 0);
    }
}
