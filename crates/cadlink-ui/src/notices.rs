//! 提示窗口
//!
//! 一次只显示最早的一条提示，确认后显示下一条。

use crate::state::{NoticeLevel, PanelState};

fn level_icon(level: NoticeLevel) -> (&'static str, egui::Color32) {
    match level {
        NoticeLevel::Info => ("ℹ", egui::Color32::from_rgb(0x34, 0x98, 0xDB)),
        NoticeLevel::Warning => ("⚠", egui::Color32::from_rgb(0xF3, 0x9C, 0x12)),
        NoticeLevel::Error => ("⛔", egui::Color32::from_rgb(0xE7, 0x4C, 0x3C)),
    }
}

/// 渲染当前提示
pub fn show_notices(ctx: &egui::Context, state: &mut PanelState) {
    let Some(notice) = state.notices.front() else {
        return;
    };

    let (icon, color) = level_icon(notice.level);
    let mut dismissed = false;

    egui::Window::new(notice.title.as_str())
        .id(egui::Id::new("notice"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(icon).size(20.0).color(color));
                ui.label(notice.body.as_str());
            });

            ui.add_space(6.0);
            ui.vertical_centered(|ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

            if ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                dismissed = true;
            }
        });

    if dismissed {
        state.dismiss_notice();
    }
}
