use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::engine::requirements::missing_items;
use super::app::MyApp;

pub fn draw_center_panel(ctx: &egui::Context, app: &mut MyApp) {
    let mut command: Option<EngineCommand> = None;

    // ---------- Options bar ----------
    egui::TopBottomPanel::bottom("story_options").show(ctx, |ui| {
        ui.add_space(4.0);

        let Some(view) = app.ui.view.as_ref().filter(|v| v.authenticated) else {
            ui.label("Log in to begin.");
            return;
        };
        let state = &view.state;
        let busy = app.ui.busy();

        if let Some(error) = &state.error {
            ui.colored_label(app.theme.error, error);
        }

        if state.game_ended {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("The story has ended.").strong());
                if ui.add_enabled(!busy, egui::Button::new("Play again")).clicked() {
                    command = Some(EngineCommand::Restart);
                }
            });
            return;
        }

        let Some(node) = &state.node else {
            if ui.add_enabled(!busy, egui::Button::new("Begin")).clicked() {
                command = Some(EngineCommand::Start);
            }
            return;
        };

        for (i, option) in node.options.iter().enumerate() {
            let missing = missing_items(option, &state.inventory);
            let button = ui.add_enabled(
                !busy && missing.is_empty(),
                egui::Button::new(option.text.as_str()).wrap(),
            );
            let button = if missing.is_empty() {
                button
            } else {
                button.on_disabled_hover_text(format!("Requires: {}", missing.join(", ")))
            };
            if button.clicked() {
                command = Some(EngineCommand::Choose(i));
            }
        }

        if busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Waiting for the story");
            });
        }
        ui.add_space(4.0);
    });

    // ---------- Story journal ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        if let Some(view) = &app.ui.view {
            ui.heading(&view.state.current_stage);
            ui.separator();
        }

        egui::ScrollArea::vertical()
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for msg in &app.ui.rendered_messages {
                    app.draw_message(ui, msg);
                }
            });
    });

    if let Some(cmd) = command {
        app.send_command(cmd);
    }
}
