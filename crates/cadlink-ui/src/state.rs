//! 面板状态管理
//!
//! 与 egui 无关的纯状态：按钮点击产生 [`Request`]，工作线程的 [`Reply`] 更新状态并生成提示。

use cadlink_core::error::CadError;
use cadlink_core::session::{Reply, Request};
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// "Draw Line" 按钮绘制的示例直线
pub const SAMPLE_LINE: (f64, f64, f64, f64) = (0.0, 0.0, 100.0, 100.0);

/// 命令输入框的默认内容
pub const DEFAULT_COMMAND: &str = "LINE";

/// 当前页面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// 欢迎页
    Welcome,
    /// CAD 工具面板
    Tools,
}

/// 连接状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    /// 探测进行中
    Connecting,
    /// 已连接，附带应用名称
    Connected(String),
}

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// 弹出提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn info(title: &str, body: impl Into<String>) -> Self {
        Self::new(title, body, NoticeLevel::Info)
    }

    pub fn warning(title: &str, body: impl Into<String>) -> Self {
        Self::new(title, body, NoticeLevel::Warning)
    }

    pub fn error(title: &str, body: impl Into<String>) -> Self {
        Self::new(title, body, NoticeLevel::Error)
    }

    fn new(title: &str, body: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            title: title.to_string(),
            body: body.into(),
            level,
        }
    }
}

/// 各按钮是否可用
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonStates {
    pub connect: bool,
    pub disconnect: bool,
    pub draw_line: bool,
    pub get_info: bool,
    pub zoom_extents: bool,
    pub send_command: bool,
}

/// 面板状态
#[derive(Debug)]
pub struct PanelState {
    pub screen: Screen,

    pub connection: ConnectionStatus,

    /// 正在等待回复的请求
    pub in_flight: Option<&'static str>,

    /// 宿主绑定是否可用（初始化失败后为 false）
    pub integration_available: bool,

    /// 命令输入框内容；`None` 表示输入框未打开
    pub command_prompt: Option<String>,

    /// 待显示的提示（先进先出）
    pub notices: VecDeque<Notice>,

    /// 待发送给工作线程的请求
    pub pending_request: Option<Request>,

    /// 用户要求关闭窗口
    pub close_requested: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            screen: Screen::Welcome,
            connection: ConnectionStatus::Disconnected,
            in_flight: None,
            integration_available: true,
            command_prompt: None,
            notices: VecDeque::new(),
            pending_request: None,
            close_requested: false,
        }
    }
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.connection, ConnectionStatus::Connected(_))
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// 状态栏文字
    pub fn status_text(&self) -> String {
        match &self.connection {
            ConnectionStatus::Disconnected => "Not Connected".to_string(),
            ConnectionStatus::Connecting => "Connecting...".to_string(),
            ConnectionStatus::Connected(label) => format!("Connected to {}", label),
        }
    }

    /// 已连接时只允许断开和 CAD 操作，未连接时只允许连接；等待回复期间全部禁用
    pub fn buttons(&self) -> ButtonStates {
        let idle = !self.is_busy();
        let connected = self.is_connected();
        ButtonStates {
            connect: idle && !connected,
            disconnect: idle && connected,
            draw_line: idle && connected,
            get_info: idle && connected,
            zoom_extents: idle && connected,
            send_command: idle && connected,
        }
    }

    /// 从欢迎页进入工具面板
    pub fn open_tools(&mut self) {
        self.screen = Screen::Tools;
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn click_connect(&mut self) {
        if self.ensure_integration() {
            self.connection = ConnectionStatus::Connecting;
            self.submit(Request::Connect);
        }
    }

    pub fn click_disconnect(&mut self) {
        if self.ensure_integration() {
            self.submit(Request::Disconnect);
        }
    }

    pub fn click_draw_line(&mut self) {
        if self.ensure_integration() {
            let (x1, y1, x2, y2) = SAMPLE_LINE;
            self.submit(Request::DrawLine { x1, y1, x2, y2 });
        }
    }

    pub fn click_get_info(&mut self) {
        if self.ensure_integration() {
            self.submit(Request::DocumentInfo);
        }
    }

    pub fn click_zoom_extents(&mut self) {
        if self.ensure_integration() {
            self.submit(Request::ZoomExtents);
        }
    }

    /// 打开命令输入框
    pub fn click_send_command(&mut self) {
        if self.ensure_integration() {
            self.command_prompt = Some(DEFAULT_COMMAND.to_string());
        }
    }

    /// 提交命令输入框；空输入直接忽略
    pub fn submit_command(&mut self) {
        let Some(command) = self.command_prompt.take() else {
            return;
        };
        if command.is_empty() {
            return;
        }
        self.submit(Request::SendCommand(command));
    }

    pub fn cancel_command(&mut self) {
        self.command_prompt = None;
    }

    /// 取出待发送的请求
    pub fn take_request(&mut self) -> Option<Request> {
        self.pending_request.take()
    }

    /// 关闭最早的一条提示
    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    /// 处理工作线程的回复
    pub fn apply(&mut self, reply: Reply) {
        debug!("Panel reply: {:?}", reply);

        if !matches!(reply, Reply::Unavailable(_)) {
            self.in_flight = None;
        }

        match reply {
            Reply::Connected(label) => {
                self.notify(Notice::info(
                    "Connection Success",
                    format!("Successfully connected to {}!", label),
                ));
                self.connection = ConnectionStatus::Connected(label);
            }
            Reply::ConnectFailed(error) => {
                self.connection = ConnectionStatus::Disconnected;
                match error {
                    CadError::NoHostAvailable { .. } => self.notify(Notice::warning(
                        "Connection Failed",
                        "Failed to connect to AutoCAD or ZWCAD.\n\n\
                         Please ensure one of the following is installed and running:\n\
                         • AutoCAD\n\
                         • ZWCAD",
                    )),
                    other => self.notify(Notice::error("Error", format!("Connection error: {}", other))),
                }
            }
            Reply::Disconnected => {
                self.connection = ConnectionStatus::Disconnected;
                self.notify(Notice::info("Disconnected", "Disconnected from AutoCAD/ZWCAD"));
            }
            Reply::LineDrawn => {
                let (x1, y1, x2, y2) = SAMPLE_LINE;
                self.notify(Notice::info(
                    "Draw Line",
                    format!(
                        "Line drawn successfully from ({},{}) to ({},{})!",
                        x1, y1, x2, y2
                    ),
                ));
            }
            Reply::CommandSent(command) => {
                self.notify(Notice::info(
                    "Send Command",
                    format!("Command '{}' sent successfully!", command),
                ));
            }
            Reply::DocumentInfo(text) => {
                self.notify(Notice::info("Document Information", text));
            }
            Reply::Zoomed => {
                self.notify(Notice::info("Zoom Extents", "Zoomed to extents successfully!"));
            }
            Reply::Unavailable(error) => self.integration_unavailable(&error),
            Reply::Failed { request, error } => self.notify(failure_notice(request, &error)),
        }
    }

    /// 后台会话无法工作（启动失败或初始化宿主失败）
    pub fn integration_unavailable(&mut self, reason: &dyn fmt::Display) {
        self.integration_available = false;
        self.notify(Notice::warning(
            "AutoCAD Connection Warning",
            format!(
                "Warning: AutoCAD/ZWCAD connection initialization failed: {}\n\n\
                 The application will continue to work, but AutoCAD integration \
                 features may not be available.",
                reason
            ),
        ));
    }

    /// 工作线程已退出，请求无法送达
    pub fn session_lost(&mut self) {
        self.in_flight = None;
        self.integration_available = false;
        // 工作线程退出时连接管理器已随之释放句柄
        self.connection = ConnectionStatus::Disconnected;
    }

    fn submit(&mut self, request: Request) {
        self.in_flight = Some(request.name());
        self.pending_request = Some(request);
    }

    fn ensure_integration(&mut self) -> bool {
        if !self.integration_available {
            self.notify(Notice::error(
                "Connection Error",
                "AutoCAD connection is not available. Please restart the application.",
            ));
        }
        self.integration_available
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }
}

fn failure_notice(request: &str, error: &CadError) -> Notice {
    if matches!(error, CadError::NotConnected) {
        return Notice::warning("Connection Error", error.to_string());
    }

    match request {
        "DrawLine" => Notice::error("Drawing Error", format!("Error drawing line: {}", error)),
        "SendCommand" => Notice::error("Command Error", format!("Error sending command: {}", error)),
        "ZoomExtents" => Notice::error("Zoom Error", format!("Error zooming to extents: {}", error)),
        other => Notice::error("Error", format!("{} failed: {}", other, error)),
    }
}
