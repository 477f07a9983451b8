//! 欢迎页

use crate::state::PanelState;

/// 渲染欢迎页
pub fn show_welcome(ctx: &egui::Context, state: &mut PanelState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        crate::drag_anywhere(ui);

        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("CADLink");
            ui.label("Drive AutoCAD or ZWCAD from a small control panel.");
            ui.add_space(24.0);

            if ui.button("Open CAD Tools").clicked() {
                state.open_tools();
            }

            ui.add_space(8.0);
            if ui.small_button("Exit").clicked() {
                state.request_close();
            }
        });
    });
}
