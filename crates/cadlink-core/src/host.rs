//! 宿主能力接口
//!
//! 对 AutoCAD / ZWCAD 自动化对象模型的最小抽象。连接管理器只依赖这些 trait，
//! 与具体绑定方式（COM、模拟宿主）无关。
//!
//! 所有句柄通过 `release(self)` 显式释放，调用方不应直接丢弃。

use crate::error::HostError;
use crate::math::Point3;

/// 宿主注册表：按标识符附加到运行中的实例或启动新实例
pub trait HostRegistry {
    type Application: HostApplication;

    /// 附加到已运行的实例
    fn attach(&self, prog_id: &str) -> Result<Self::Application, HostError>;

    /// 启动新实例
    fn launch(&self, prog_id: &str) -> Result<Self::Application, HostError>;
}

/// 宿主应用（自动化根对象）
pub trait HostApplication {
    type Document: HostDocument;

    /// 当前活动文档
    fn active_document(&self) -> Result<Self::Document, HostError>;

    fn name(&self) -> Result<String, HostError>;

    fn version(&self) -> Result<String, HostError>;

    fn set_visible(&self, visible: bool) -> Result<(), HostError>;

    /// 视图缩放至全部内容
    fn zoom_extents(&self) -> Result<(), HostError>;

    fn release(self) -> Result<(), HostError>;
}

/// 宿主文档
pub trait HostDocument {
    type Space: DrawingSpace;

    fn name(&self) -> Result<String, HostError>;

    /// 模型空间（新图元的默认容器）
    fn model_space(&self) -> Result<Self::Space, HostError>;

    /// 将文本原样送入宿主命令行
    fn send_command(&self, text: &str) -> Result<(), HostError>;

    fn release(self) -> Result<(), HostError>;
}

/// 绘图容器
pub trait DrawingSpace {
    fn add_line(&self, start: Point3, end: Point3) -> Result<(), HostError>;
}
