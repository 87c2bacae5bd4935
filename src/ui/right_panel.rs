use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::inventory::InventoryItem;
use super::app::MyApp;

pub fn draw_right_panel(ctx: &egui::Context, app: &mut MyApp) {
    if !app.ui.authenticated() {
        return;
    }

    let mut command: Option<EngineCommand> = None;

    egui::SidePanel::right("right")
        .resizable(true)
        .default_width(280.0)
        .min_width(220.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Inventory");
                if ui.small_button("⟳").clicked() {
                    command = Some(EngineCommand::RefreshInventory);
                }
            });
            ui.separator();

            let Some(state) = app.ui.view.as_ref().map(|v| &v.state) else {
                return;
            };
            let busy = app.ui.busy();
            let locked = busy || state.game_ended;

            egui::ScrollArea::vertical().show(ui, |ui| {
                if state.inventory.is_empty() {
                    ui.label("Empty");
                }
                for item in &state.inventory {
                    let hint = state
                        .node
                        .as_ref()
                        .is_some_and(|node| node.trigger_for(&item.item_name).is_some());
                    if let Some(cmd) = draw_item(ui, item, hint, locked) {
                        command = Some(cmd);
                    }
                }
            });
        });

    if let Some(cmd) = command {
        app.send_command(cmd);
    }
}

fn draw_item(
    ui: &mut egui::Ui,
    item: &InventoryItem,
    can_trigger: bool,
    locked: bool,
) -> Option<EngineCommand> {
    let mut command = None;

    ui.group(|ui| {
        let mut name = egui::RichText::new(&item.item_name).strong();
        if item.used {
            name = name.strikethrough().weak();
        }
        ui.label(name);
        if !item.description.is_empty() {
            ui.label(egui::RichText::new(&item.description).small());
        }
        if can_trigger && item.is_available() {
            ui.label(egui::RichText::new("Something here reacts to this.").italics());
        }

        ui.horizontal(|ui| {
            let usable = !locked && item.is_available() && item.id.is_some();
            let use_button = ui
                .add_enabled(usable, egui::Button::new("Use"))
                .on_disabled_hover_text(if item.id.is_none() {
                    "Refresh the inventory first"
                } else {
                    "Not available"
                });
            if let (true, Some(id)) = (use_button.clicked(), item.id) {
                command = Some(EngineCommand::UseItem {
                    id,
                    name: item.item_name.clone(),
                });
            }

            if let Some(id) = item.id {
                if ui.add_enabled(!locked, egui::Button::new("Discard")).clicked() {
                    command = Some(EngineCommand::DiscardItem(id));
                }
            }
        });
    });

    command
}
