use crate::session::{AnalysisSession, Clipboard, RequestState, SpeechState};
use crate::states::toast::ToastType;
use crate::{editor, files, logo};
use eframe::egui;
use std::time::Duration;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(0, 120, 215);
const ERROR_RED: egui::Color32 = egui::Color32::from_rgb(220, 100, 100);
const OK_GREEN: egui::Color32 = egui::Color32::from_rgb(120, 200, 140);

pub struct PySleuthApp {
    session: AnalysisSession,
    api_url: String,
    logo_texture: Option<egui::TextureHandle>,
}

pub fn create_app(session: AnalysisSession, api_url: String) -> PySleuthApp {
    PySleuthApp {
        session,
        api_url,
        logo_texture: None,
    }
}

impl Clipboard for egui::Context {
    fn write_text(&mut self, text: &str) {
        self.output_mut(|o| o.copied_text = text.to_owned());
    }
}

impl eframe::App for PySleuthApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);
        let busy = self.session.poll(now);

        if self.logo_texture.is_none() {
            self.logo_texture = logo::color_image_from_svg(logo::LOGO_SVG)
                .map(|img| ctx.load_texture("pysleuth_logo", img, egui::TextureOptions::LINEAR));
        }

        egui::TopBottomPanel::top("header_panel").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(28.0, 28.0), egui::Sense::hover());
                if let Some(handle) = &self.logo_texture {
                    ui.painter().image(
                        handle.id(),
                        rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }
                ui.heading(
                    egui::RichText::new("PySleuth - AI Python Debugger")
                        .strong()
                        .color(egui::Color32::WHITE),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(&self.api_url).weak().monospace())
                        .on_hover_text("Analysis service");
                });
            });
            ui.add_space(6.0);
        });

        let half_width = ctx.screen_rect().width() * 0.5;
        egui::SidePanel::left("source_panel")
            .resizable(true)
            .default_width(half_width)
            .show(ctx, |ui| {
                source_column(ui, &mut self.session, now);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            analysis_column(ui, &mut self.session, now);
        });

        show_toast(ctx, &self.session);

        if busy || self.session.toast().is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

fn source_column(ui: &mut egui::Ui, session: &mut AnalysisSession, now: f64) {
    ui.add_space(4.0);
    ui.heading("Your Code");
    ui.add_space(4.0);

    let in_flight = session.request_state() == RequestState::InFlight;

    ui.horizontal(|ui| {
        if ui.button("📂 Open").on_hover_text("Load a .py file").clicked() {
            if let Some(path) = files::pick_source_file() {
                match files::load_source(&path) {
                    Ok(code) => {
                        session.update_source(code);
                        session.notify_success(format!("Loaded {}", files::display_name(&path)), now);
                    }
                    Err(err) => {
                        tracing::warn!(error = %format!("{err:#}"), "open failed");
                        session.notify_error(format!("{err:#}"), now);
                    }
                }
            }
        }

        if ui.button("↺ Reset").on_hover_text("Restore the sample snippet").clicked() {
            session.reset_source();
        }

        let mut translate = session.translate();
        if ui
            .checkbox(&mut translate, "Explain in Hinglish")
            .changed()
        {
            session.set_translate(translate);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let label = if in_flight { "Analyzing..." } else { "Debug Code" };
            let btn = egui::Button::new(egui::RichText::new(label).size(14.0).strong())
                .min_size(egui::vec2(120.0, 30.0))
                .fill(if in_flight {
                    egui::Color32::from_gray(60)
                } else {
                    ACCENT
                });
            if ui.add_enabled(!in_flight, btn).clicked() {
                session.submit();
            }
        });
    });
    ui.add_space(6.0);

    let mut buffer = session.source().to_owned();
    if editor::code_editor(ui, "source_editor", &mut buffer).changed() {
        session.update_source(buffer);
    }
}

fn analysis_column(ui: &mut egui::Ui, session: &mut AnalysisSession, now: f64) {
    ui.add_space(4.0);
    ui.heading("AI Analysis");
    ui.add_space(4.0);

    if session.request_state() == RequestState::InFlight {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading analysis...");
        });
        return;
    }

    let Some(result) = session.result().cloned() else {
        ui.label(
            egui::RichText::new("Your analysis and corrected code will appear here.")
                .italics()
                .weak(),
        );
        return;
    };

    ui.horizontal(|ui| {
        if result.has_errors {
            ui.colored_label(ERROR_RED, "● Issues found");
        } else {
            ui.colored_label(OK_GREEN, "● No errors found");
        }
    });
    ui.separator();

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Explanation").strong().size(16.0));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            match session.speech_state() {
                SpeechState::Speaking => {
                    if ui.button("⏹ Stop").clicked() {
                        session.stop_speaking();
                    }
                }
                SpeechState::Idle => {
                    let can_speak = !result.explanation.is_empty();
                    if ui
                        .add_enabled(can_speak, egui::Button::new("🔊 Listen"))
                        .on_hover_text("Read the explanation aloud")
                        .clicked()
                    {
                        session.speak_explanation();
                    }
                }
            }
        });
    });

    egui::ScrollArea::vertical()
        .id_source("explanation_scroll")
        .max_height(ui.available_height() * 0.35)
        .show(ui, |ui| {
            ui.label(result.explanation.as_str());
        });

    ui.separator();

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Corrected Code").strong().size(16.0));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("📋 Copy").clicked() {
                let mut clipboard = ui.ctx().clone();
                session.copy_corrected_code(&mut clipboard, now);
            }
            if ui.button("💾 Save").clicked() {
                if let Some(path) = files::pick_save_path() {
                    match files::save_code(&path, &result.corrected_code) {
                        Ok(()) => session
                            .notify_success(format!("Saved {}", files::display_name(&path)), now),
                        Err(err) => {
                            tracing::warn!(error = %format!("{err:#}"), "save failed");
                            session.notify_error(format!("{err:#}"), now);
                        }
                    }
                }
            }
            if ui
                .button("⤴ Apply fix")
                .on_hover_text("Replace your code with the corrected version")
                .clicked()
            {
                session.apply_fix();
            }
        });
    });
    ui.add_space(4.0);

    editor::code_view(ui, "corrected_view", &result.corrected_code);
}

fn show_toast(ctx: &egui::Context, session: &AnalysisSession) {
    let Some(toast) = session.toast() else {
        return;
    };

    let bg_color = match toast.kind {
        ToastType::Error => egui::Color32::from_rgb(200, 50, 50),
        ToastType::Success => egui::Color32::from_rgb(50, 150, 50),
        ToastType::Info => egui::Color32::from_gray(80),
    };

    egui::Area::new("toast_notification")
        .order(egui::Order::Tooltip)
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -40.0))
        .show(ctx, |ui| {
            egui::Frame::none()
                .fill(bg_color)
                .rounding(8.0)
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_white_alpha(50)))
                .inner_margin(12.0)
                .shadow(egui::epaint::Shadow::small_dark())
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(&toast.message)
                            .color(egui::Color32::WHITE)
                            .size(15.0),
                    );
                });
        });
}
