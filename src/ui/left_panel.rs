use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::model::character::{Character, STAT_MAX};
use super::app::{LoginForm, MyApp};

pub fn draw_left_panel(ctx: &egui::Context, app: &mut MyApp) {
    let mut command: Option<EngineCommand> = None;

    egui::SidePanel::left("left")
        .resizable(false)
        .default_width(200.0)
        .show(ctx, |ui| {
            if app.ui.authenticated() {
                let busy = app.ui.busy();
                let state = app.ui.view.as_ref().map(|v| &v.state);

                match state.and_then(|s| s.character.as_ref()) {
                    Some(character) => draw_character(ui, character),
                    None => {
                        ui.label("No character loaded.");
                    }
                }

                ui.separator();

                ui.add_enabled_ui(!busy, |ui| {
                    if ui.button("Save").clicked() {
                        command = Some(EngineCommand::Save);
                    }
                    if ui.button("Load").clicked() {
                        command = Some(EngineCommand::Load);
                    }
                    if ui.button("Restart").clicked() {
                        command = Some(EngineCommand::Restart);
                    }
                });

                ui.separator();
                if ui.button("Log out").clicked() {
                    command = Some(EngineCommand::Logout);
                }
            } else {
                if app.ui.login_required {
                    ui.colored_label(app.theme.error, "Please log in again.");
                }
                command = draw_login(ui, &mut app.ui.login);
            }

            ui.separator();
            ui.label("UI Scale");
            ui.add(egui::Slider::new(&mut app.ui.ui_scale, 0.75..=2.0));
        });

    if let Some(cmd) = command {
        app.send_command(cmd);
    }
}

fn draw_character(ui: &mut egui::Ui, character: &Character) {
    ui.heading(&character.name);

    stat_bar(ui, "Fear", character.fear);
    stat_bar(ui, "Sanity", character.sanity);

    ui.collapsing("Path so far", |ui| {
        if character.choice_history.is_empty() {
            ui.label("None");
        } else {
            for stage in &character.choice_history {
                ui.label(format!("• {stage}"));
            }
        }
    });
}

fn stat_bar(ui: &mut egui::Ui, label: &str, value: i32) {
    ui.label(label);
    ui.add(
        egui::ProgressBar::new(value as f32 / STAT_MAX as f32).text(format!("{value}/{STAT_MAX}")),
    );
}

fn draw_login(ui: &mut egui::Ui, form: &mut LoginForm) -> Option<EngineCommand> {
    let mut command = None;

    ui.heading(if form.signing_up { "Sign up" } else { "Log in" });

    if form.signing_up {
        ui.label("Username");
        ui.text_edit_singleline(&mut form.username);
    }
    ui.label("Email");
    ui.text_edit_singleline(&mut form.email);
    ui.label("Password");
    ui.add(egui::TextEdit::singleline(&mut form.password).password(true));

    let ready = !form.email.trim().is_empty() && !form.password.is_empty();
    if form.signing_up {
        let can_create = ready && !form.username.trim().is_empty();
        if ui
            .add_enabled(can_create, egui::Button::new("Create account"))
            .clicked()
        {
            command = Some(EngineCommand::Signup {
                username: form.username.trim().to_string(),
                email: form.email.trim().to_string(),
                password: form.password.clone(),
            });
            form.signing_up = false;
        }
        if ui.link("I already have an account").clicked() {
            form.signing_up = false;
        }
    } else {
        if ui.add_enabled(ready, egui::Button::new("Log in")).clicked() {
            command = Some(EngineCommand::Login {
                email: form.email.trim().to_string(),
                password: std::mem::take(&mut form.password),
            });
        }
        if ui.link("Create an account").clicked() {
            form.signing_up = true;
        }
    }

    command
}
