//! CAD 工具面板

use crate::state::PanelState;
use crate::status::show_status;

/// 渲染工具面板
pub fn show_tools(ctx: &egui::Context, state: &mut PanelState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        crate::drag_anywhere(ui);

        ui.horizontal(|ui| {
            ui.heading("AutoCAD / ZWCAD");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✖").on_hover_text("Close").clicked() {
                    state.request_close();
                }
            });
        });

        ui.separator();
        show_status(ui, state);
        ui.add_space(8.0);

        let buttons = state.buttons();

        // 连接控制
        ui.horizontal(|ui| {
            if ui.add_enabled(buttons.connect, egui::Button::new("🔌 Connect")).clicked() {
                state.click_connect();
            }
            if ui
                .add_enabled(buttons.disconnect, egui::Button::new("⏏ Disconnect"))
                .clicked()
            {
                state.click_disconnect();
            }
        });

        ui.add_space(4.0);

        // CAD 操作
        ui.horizontal_wrapped(|ui| {
            if ui
                .add_enabled(buttons.draw_line, egui::Button::new("╱ Draw Line"))
                .on_hover_text("Draw a line from (0,0) to (100,100)")
                .clicked()
            {
                state.click_draw_line();
            }
            if ui
                .add_enabled(buttons.get_info, egui::Button::new("ℹ Get Info"))
                .clicked()
            {
                state.click_get_info();
            }
            if ui
                .add_enabled(buttons.zoom_extents, egui::Button::new("📐 Zoom Extents"))
                .clicked()
            {
                state.click_zoom_extents();
            }
            if ui
                .add_enabled(buttons.send_command, egui::Button::new("⌨ Send Command"))
                .clicked()
            {
                state.click_send_command();
            }
        });
    });
}
