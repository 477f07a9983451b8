//! 连接状态指示

use crate::state::{ConnectionStatus, PanelState};

const GREEN: egui::Color32 = egui::Color32::from_rgb(0x27, 0xAE, 0x60);
const RED: egui::Color32 = egui::Color32::from_rgb(0xE7, 0x4C, 0x3C);
const GREY: egui::Color32 = egui::Color32::from_rgb(0x7F, 0x8C, 0x8D);
const AMBER: egui::Color32 = egui::Color32::from_rgb(0xF3, 0x9C, 0x12);

/// 指示灯颜色和文字颜色
pub fn status_colors(status: &ConnectionStatus) -> (egui::Color32, egui::Color32) {
    match status {
        ConnectionStatus::Connected(_) => (GREEN, GREEN),
        ConnectionStatus::Connecting => (AMBER, GREY),
        ConnectionStatus::Disconnected => (RED, GREY),
    }
}

/// 渲染状态行：圆点 + 文字
pub fn show_status(ui: &mut egui::Ui, state: &PanelState) {
    let (dot, text) = status_colors(&state.connection);

    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
        ui.painter().circle_filled(rect.center(), 6.0, dot);

        ui.label(egui::RichText::new(state.status_text()).color(text));

        if state.is_busy() {
            ui.spinner();
        }
    });
}
