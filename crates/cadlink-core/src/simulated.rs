//! 模拟宿主
//!
//! 进程内实现的 `HostRegistry`，不依赖任何 CAD 软件：
//! - 测试中精确控制每个标识符的行为（运行中 / 已安装 / 尚未就绪）
//! - 记录所有调用，便于断言探测顺序和转发内容
//! - 在没有 AutoCAD/ZWCAD 的平台上作为演示宿主

use crate::error::HostError;
use crate::host::{DrawingSpace, HostApplication, HostDocument, HostRegistry};
use crate::math::Point3;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// 对模拟宿主的一次调用
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Attach(String),
    Launch(String),
    ActiveDocument,
    ApplicationName,
    Version,
    SetVisible(bool),
    ZoomExtents,
    ReleaseApplication,
    DocumentName,
    ModelSpace,
    AddLine(Point3, Point3),
    SendCommand(String),
    ReleaseDocument,
}

/// 宿主标识信息
#[derive(Debug, Clone)]
struct Identity {
    application: String,
    version: String,
    document: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            application: "AutoCAD".to_string(),
            version: "25.0s (LMS Tech)".to_string(),
            document: "Drawing1.dwg".to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    running: HashSet<String>,
    installed: HashSet<String>,
    /// 剩余的"尚未就绪"次数
    unavailable: HashMap<String, u32>,
    failing: HashSet<String>,
    identity: Identity,
    journal: Vec<HostCall>,
    lines: Vec<(Point3, Point3)>,
    commands: Vec<String>,
    zooms: usize,
    visible: bool,
    /// 未释放的句柄数（应用 + 文档）
    live_handles: usize,
}

impl SimState {
    fn call(&mut self, call: HostCall, member: &str) -> Result<(), HostError> {
        self.journal.push(call);
        if self.failing.contains(member) {
            return Err(HostError::call(member, "simulated failure"));
        }
        Ok(())
    }
}

/// 模拟宿主注册表
///
/// 克隆共享同一份状态，测试可在交给 `ConnectionManager` 后继续观察。
#[derive(Debug, Clone, Default)]
pub struct SimulatedRegistry {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 默认宿主列表中第一个 AutoCAD 标识符正在运行的演示宿主
    pub fn demo() -> Self {
        let registry = Self::new();
        registry.add_running("AutoCAD.Application.25");
        registry
    }

    /// 标识符对应的实例正在运行（可附加）
    pub fn add_running(&self, prog_id: &str) {
        self.state.lock().running.insert(prog_id.to_string());
    }

    /// 标识符已安装（可启动）
    pub fn add_installed(&self, prog_id: &str) {
        self.state.lock().installed.insert(prog_id.to_string());
    }

    /// 接下来 `times` 次附加该标识符时报告"尚未就绪"
    pub fn set_unavailable(&self, prog_id: &str, times: u32) {
        self.state.lock().unavailable.insert(prog_id.to_string(), times);
    }

    /// 让指定成员（如 "AddLine"、"ZoomExtents"）调用失败
    pub fn fail_member(&self, member: &str) {
        self.state.lock().failing.insert(member.to_string());
    }

    pub fn restore_member(&self, member: &str) {
        self.state.lock().failing.remove(member);
    }

    pub fn set_identity(&self, application: &str, version: &str, document: &str) {
        self.state.lock().identity = Identity {
            application: application.to_string(),
            version: version.to_string(),
            document: document.to_string(),
        };
    }

    /// 所有调用记录
    pub fn journal(&self) -> Vec<HostCall> {
        self.state.lock().journal.clone()
    }

    /// 仅注册表层面的调用（附加 / 启动）
    pub fn probes(&self) -> Vec<HostCall> {
        self.state
            .lock()
            .journal
            .iter()
            .filter(|call| matches!(call, HostCall::Attach(_) | HostCall::Launch(_)))
            .cloned()
            .collect()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    pub fn lines(&self) -> Vec<(Point3, Point3)> {
        self.state.lock().lines.clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().commands.clone()
    }

    pub fn zoom_count(&self) -> usize {
        self.state.lock().zooms
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    pub fn live_handles(&self) -> usize {
        self.state.lock().live_handles
    }

    fn application(&self) -> SimulatedApplication {
        self.state.lock().live_handles += 1;
        SimulatedApplication {
            state: self.state.clone(),
        }
    }
}

impl HostRegistry for SimulatedRegistry {
    type Application = SimulatedApplication;

    fn attach(&self, prog_id: &str) -> Result<Self::Application, HostError> {
        {
            let mut state = self.state.lock();
            state.journal.push(HostCall::Attach(prog_id.to_string()));

            if let Some(remaining) = state.unavailable.get_mut(prog_id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(HostError::Unavailable {
                        prog_id: prog_id.to_string(),
                    });
                }
            }

            if !state.running.contains(prog_id) {
                return Err(HostError::NotRegistered {
                    prog_id: prog_id.to_string(),
                });
            }
        }

        debug!("Simulated attach to {}", prog_id);
        Ok(self.application())
    }

    fn launch(&self, prog_id: &str) -> Result<Self::Application, HostError> {
        {
            let mut state = self.state.lock();
            state.journal.push(HostCall::Launch(prog_id.to_string()));

            if !state.installed.contains(prog_id) {
                return Err(HostError::NotRegistered {
                    prog_id: prog_id.to_string(),
                });
            }
            state.running.insert(prog_id.to_string());
        }

        debug!("Simulated launch of {}", prog_id);
        Ok(self.application())
    }
}

/// 模拟宿主应用
#[derive(Debug)]
pub struct SimulatedApplication {
    state: Arc<Mutex<SimState>>,
}

impl HostApplication for SimulatedApplication {
    type Document = SimulatedDocument;

    fn active_document(&self) -> Result<Self::Document, HostError> {
        let mut state = self.state.lock();
        state.call(HostCall::ActiveDocument, "ActiveDocument")?;
        state.live_handles += 1;
        Ok(SimulatedDocument {
            state: self.state.clone(),
        })
    }

    fn name(&self) -> Result<String, HostError> {
        let mut state = self.state.lock();
        state.call(HostCall::ApplicationName, "Name")?;
        Ok(state.identity.application.clone())
    }

    fn version(&self) -> Result<String, HostError> {
        let mut state = self.state.lock();
        state.call(HostCall::Version, "Version")?;
        Ok(state.identity.version.clone())
    }

    fn set_visible(&self, visible: bool) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.call(HostCall::SetVisible(visible), "Visible")?;
        state.visible = visible;
        Ok(())
    }

    fn zoom_extents(&self) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.call(HostCall::ZoomExtents, "ZoomExtents")?;
        state.zooms += 1;
        Ok(())
    }

    fn release(self) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.live_handles = state.live_handles.saturating_sub(1);
        state.call(HostCall::ReleaseApplication, "ReleaseApplication")
    }
}

/// 模拟宿主文档
#[derive(Debug)]
pub struct SimulatedDocument {
    state: Arc<Mutex<SimState>>,
}

impl HostDocument for SimulatedDocument {
    type Space = SimulatedModelSpace;

    fn name(&self) -> Result<String, HostError> {
        let mut state = self.state.lock();
        state.call(HostCall::DocumentName, "Name")?;
        Ok(state.identity.document.clone())
    }

    fn model_space(&self) -> Result<Self::Space, HostError> {
        self.state.lock().call(HostCall::ModelSpace, "ModelSpace")?;
        Ok(SimulatedModelSpace {
            state: self.state.clone(),
        })
    }

    fn send_command(&self, text: &str) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.call(HostCall::SendCommand(text.to_string()), "SendCommand")?;
        state.commands.push(text.to_string());
        Ok(())
    }

    fn release(self) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.live_handles = state.live_handles.saturating_sub(1);
        state.call(HostCall::ReleaseDocument, "ReleaseDocument")
    }
}

/// 模拟模型空间
#[derive(Debug)]
pub struct SimulatedModelSpace {
    state: Arc<Mutex<SimState>>,
}

impl DrawingSpace for SimulatedModelSpace {
    fn add_line(&self, start: Point3, end: Point3) -> Result<(), HostError> {
        let mut state = self.state.lock();
        state.call(HostCall::AddLine(start, end), "AddLine")?;
        state.lines.push((start, end));
        Ok(())
    }
}
