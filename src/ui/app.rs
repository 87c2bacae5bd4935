use eframe::egui;
use egui::Layout;
use std::sync::mpsc;
use std::time::Duration;

use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::error::Operation;
use crate::model::game_state::GameView;
use crate::model::message::{Message, Severity};

use super::center_panel::draw_center_panel;
use super::left_panel::draw_left_panel;
use super::right_panel::draw_right_panel;

/* =========================
   UI State
   ========================= */

#[derive(Default)]
pub(crate) struct LoginForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub signing_up: bool,
}

#[derive(Default)]
pub(crate) struct UiState {
    pub view: Option<GameView>,
    pub rendered_messages: Vec<Message>,
    pub working: Option<Operation>,
    pub login_required: bool,
    pub login: LoginForm,

    pub ui_scale: f32,
    pub should_auto_scroll: bool,
}

impl UiState {
    pub fn authenticated(&self) -> bool {
        self.view.as_ref().is_some_and(|v| v.authenticated)
    }

    /// Mirrors the store flags plus anything sent but not yet answered.
    pub fn busy(&self) -> bool {
        self.working.is_some()
            || self
                .view
                .as_ref()
                .is_some_and(|v| v.state.is_loading || v.state.is_restarting)
    }
}

/* =========================
   Theme
   ========================= */

#[derive(Clone)]
pub(crate) struct Theme {
    pub player: egui::Color32,
    pub narration: egui::Color32,
    pub info: egui::Color32,
    pub warning: egui::Color32,
    pub error: egui::Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            player: egui::Color32::from_rgb(40, 70, 120),
            narration: egui::Color32::from_rgb(80, 80, 80),
            info: egui::Color32::from_rgb(40, 90, 60),
            warning: egui::Color32::from_rgb(130, 100, 30),
            error: egui::Color32::from_rgb(140, 40, 40),
        }
    }
}

/* =========================
   App
   ========================= */

pub struct MyApp {
    pub(crate) ui: UiState,
    pub(crate) theme: Theme,

    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl MyApp {
    pub fn new(
        cmd_tx: mpsc::Sender<EngineCommand>,
        resp_rx: mpsc::Receiver<EngineResponse>,
        ui_scale: f32,
    ) -> Self {
        Self {
            ui: UiState {
                ui_scale,
                ..Default::default()
            },
            theme: Theme::default(),
            cmd_tx,
            resp_rx,
        }
    }

    pub(crate) fn send_command(&mut self, cmd: EngineCommand) {
        if let Some(op) = cmd.operation() {
            self.ui.working = Some(op);
        }
        if self.cmd_tx.send(cmd).is_err() {
            log::error!("engine thread is gone");
            self.ui.working = None;
        }
    }

    fn drain_responses(&mut self) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::Working(op) => self.ui.working = Some(op),
                EngineResponse::FullMessageHistory(msgs) => {
                    self.ui.rendered_messages = msgs;
                    self.ui.should_auto_scroll = true;
                }
                EngineResponse::StateUpdated(view) => {
                    if view.authenticated {
                        self.ui.login_required = false;
                    }
                    self.ui.view = Some(view);
                    self.ui.working = None;
                }
                EngineResponse::LoginRequired => {
                    self.ui.login_required = true;
                    self.ui.login.password.clear();
                }
            }
        }
    }

    pub(crate) fn draw_message(&self, ui: &mut egui::Ui, msg: &Message) {
        let (bg, right, text) = match msg {
            Message::Player(t) => (self.theme.player, true, format!("You: {t}")),
            Message::Narration { text, .. } => (self.theme.narration, false, text.clone()),
            Message::System { severity, text } => {
                let c = match severity {
                    Severity::Info => self.theme.info,
                    Severity::Warning => self.theme.warning,
                    Severity::Error => self.theme.error,
                };
                (c, false, text.clone())
            }
        };

        ui.add_space(6.0);

        if right {
            ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                bubble(ui, bg, &text);
            });
        } else {
            bubble(ui, bg, &text);
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui.ui_scale);

        self.drain_responses();

        draw_left_panel(ctx, self);
        draw_right_panel(ctx, self);
        draw_center_panel(ctx, self);

        self.ui.should_auto_scroll = false;

        // Engine answers arrive without input events.
        if self.ui.busy() {
            ctx.request_repaint_after(Duration::from_millis(50));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

/* =========================
   UI Helpers
   ========================= */

fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}
