//! CADLink 用户界面
//!
//! 基于egui的即时模式GUI：欢迎页、连接状态指示、CAD 操作按钮、命令输入和提示窗口。

pub mod command_line;
pub mod notices;
pub mod state;
pub mod status;
pub mod tools;
pub mod welcome;

pub use state::{ButtonStates, ConnectionStatus, Notice, NoticeLevel, PanelState, Screen};

/// 让整个窗口背景都可以拖动（无边框窗口）
///
/// 需要在其他控件之前调用，这样按钮等控件仍能正常响应点击。
pub fn drag_anywhere(ui: &mut egui::Ui) {
    let response = ui.interact(
        ui.max_rect(),
        egui::Id::new("window_drag_area"),
        egui::Sense::click_and_drag(),
    );

    if response.drag_started_by(egui::PointerButton::Primary) {
        ui.ctx().send_viewport_cmd(egui::ViewportCommand::StartDrag);
    }
}
