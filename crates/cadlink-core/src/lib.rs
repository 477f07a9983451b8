//! CADLink 核心
//!
//! 通过自动化接口连接正在运行（或新启动）的 AutoCAD / ZWCAD，
//! 并转发少量绘图命令（画线、发送命令、缩放至全部、查询文档信息）。
//!
//! # 架构设计
//!
//! - `host`: 宿主能力接口（注册表 / 应用 / 文档 / 模型空间）
//! - `probe`: 按固定顺序探测宿主的连接流程
//! - `connection`: `ConnectionManager`，持有连接句柄并转发操作
//! - `session`: 在后台线程中运行 `ConnectionManager`，避免阻塞界面
//! - `simulated`: 进程内模拟宿主，用于测试和无 CAD 环境下的演示
//!
//! # 示例
//!
//! ```rust
//! use cadlink_core::prelude::*;
//!
//! let registry = SimulatedRegistry::new();
//! registry.add_running("AutoCAD.Application.25");
//!
//! let mut manager = ConnectionManager::new(registry, ConnectionConfig::instant());
//! manager.connect().unwrap();
//! manager.draw_line(0.0, 0.0, 100.0, 100.0).unwrap();
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod host;
pub mod math;
pub mod probe;
pub mod session;
pub mod simulated;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::config::{ConnectionConfig, HostProfile, ProbeTimings};
    pub use crate::connection::{ConnectionManager, DocumentInfo, NOT_CONNECTED_MESSAGE};
    pub use crate::error::{CadError, ConfigError, HostError};
    pub use crate::host::{DrawingSpace, HostApplication, HostDocument, HostRegistry};
    pub use crate::math::Point3;
    pub use crate::probe::{ProbeAttempt, ProbePhase};
    pub use crate::session::{Reply, Request, Session};
    pub use crate::simulated::{HostCall, SimulatedRegistry};
}
