//! 命令输入框

use crate::state::PanelState;

/// 渲染 "Send Command" 输入框（仅在打开时显示）
pub fn show_command_prompt(ctx: &egui::Context, state: &mut PanelState) {
    let Some(command) = state.command_prompt.as_mut() else {
        return;
    };

    let mut submit = false;
    let mut cancel = false;

    egui::Window::new("Send Command")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Enter AutoCAD/ZWCAD command:");

            let response = ui.add(
                egui::TextEdit::singleline(command)
                    .desired_width(260.0)
                    .hint_text("LINE"),
            );
            response.request_focus();

            // 回车提交，Esc 取消
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                cancel = true;
            }

            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    submit = true;
                }
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
            });
        });

    if submit {
        state.submit_command();
    } else if cancel {
        state.cancel_command();
    }
}
