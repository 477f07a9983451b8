//! CADLink 主应用程序入口
//! 使用 eframe 作为应用框架，界面线程只负责绘制，连接操作在后台会话中执行

use anyhow::{Context as _, Result};
use eframe::egui;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use cadlink_core::config::{ConnectionConfig, CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE};
use cadlink_core::session::Session;
use cadlink_core::simulated::SimulatedRegistry;
use cadlink_ui::command_line::show_command_prompt;
use cadlink_ui::notices::show_notices;
use cadlink_ui::state::{PanelState, Screen};
use cadlink_ui::tools::show_tools;
use cadlink_ui::welcome::show_welcome;

/// 启用模拟宿主的环境变量
const SIMULATE_ENV_VAR: &str = "CADLINK_SIMULATE";

/// 宿主后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    /// 真实 COM 自动化
    Com,
    /// 进程内模拟宿主
    Simulated,
}

impl Backend {
    /// 由环境变量决定；未设置时，没有 COM 的平台使用模拟宿主
    fn from_env() -> Self {
        let simulate = match std::env::var(SIMULATE_ENV_VAR) {
            Ok(value) => matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
            Err(_) => !cadlink_com::is_supported(),
        };

        if simulate {
            Backend::Simulated
        } else {
            Backend::Com
        }
    }
}

/// CADLink 应用程序
struct CadLinkApp {
    state: PanelState,
    session: Option<Session>,
}

impl CadLinkApp {
    fn new(ctx: &egui::Context, config: ConnectionConfig, backend: Backend) -> Self {
        let mut state = PanelState::new();

        let session = match start_session(ctx, config, backend) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Failed to start CAD session: {}", e);
                state.integration_unavailable(&e);
                None
            }
        };

        Self { state, session }
    }

    /// 收取后台回复并发送待处理的请求
    fn pump_session(&mut self) {
        let Some(session) = &self.session else {
            return;
        };

        while let Some(reply) = session.try_recv() {
            self.state.apply(reply);
        }

        if let Some(request) = self.state.take_request() {
            if !session.send(request) {
                warn!("CAD session worker is gone");
                self.state.session_lost();
            }
        }
    }
}

fn start_session(ctx: &egui::Context, config: ConnectionConfig, backend: Backend) -> Result<Session> {
    let repaint = ctx.clone();
    let notify = move || repaint.request_repaint();

    let session = match backend {
        Backend::Simulated => {
            info!("Using simulated CAD host");
            let registry = SimulatedRegistry::new();
            if let Some(prog_id) = config.hosts.first().and_then(|host| host.prog_ids.first()) {
                registry.add_running(prog_id);
            }
            Session::spawn(config, move || Ok(registry), notify)?
        }
        #[cfg(windows)]
        Backend::Com => Session::spawn(config, cadlink_com::ComRegistry::new, notify)?,
        #[cfg(not(windows))]
        Backend::Com => Session::spawn(config, || Ok(cadlink_com::UnsupportedRegistry), notify)?,
    };

    Ok(session)
}

impl eframe::App for CadLinkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_session();

        match self.state.screen {
            Screen::Welcome => show_welcome(ctx, &mut self.state),
            Screen::Tools => show_tools(ctx, &mut self.state),
        }

        show_command_prompt(ctx, &mut self.state);
        show_notices(ctx, &mut self.state);

        // 按钮产生的请求在同一帧内发出
        self.pump_session();

        if self.state.close_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl Drop for CadLinkApp {
    fn drop(&mut self) {
        // 关闭窗口时断开连接
        if let Some(session) = self.session.take() {
            session.shutdown();
        }
    }
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn main() -> Result<()> {
    // 初始化日志
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(Level::INFO).finish()
    )?;

    info!("Starting CADLink...");

    let path = config_path();
    let config = ConnectionConfig::load_or_default(&path)
        .with_context(|| format!("invalid connection config {}", path.display()))?;
    let backend = Backend::from_env();
    info!("Backend: {:?}, {} host profile(s)", backend, config.hosts.len());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([440.0, 280.0])
            .with_decorations(false)
            .with_title("CADLink"),
        ..Default::default()
    };

    eframe::run_native(
        "CADLink",
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Ok(Box::new(CadLinkApp::new(&cc.egui_ctx, config, backend)))
        }),
    ).map_err(|e| anyhow::anyhow!("eframe error: {}", e))?;

    Ok(())
}
