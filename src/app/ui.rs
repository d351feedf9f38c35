use super::state::{format_size, progress_fraction, status_text};
use super::SpeedEditApp;
use crate::upload::{EnhanceMode, EnhanceOptions, EnhancedResult, Engine};
use crate::workflow::{DownloadState, JobStatus};
use eframe::egui::{self, Align, Color32, RichText};

const ACCENT: Color32 = Color32::from_rgb(37, 99, 235);
const SUCCESS: Color32 = Color32::from_rgb(22, 163, 74);
const ERROR: Color32 = Color32::from_rgb(220, 50, 50);

enum Action {
    PickPhoto,
    Enhance,
    Pay,
    Save,
    TryAgain,
    OpenCheckout,
    SetOptions(EnhanceOptions),
}

impl SpeedEditApp {
    pub fn render(&mut self, ctx: &egui::Context) {
        let mut action = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            let total_height = ui.available_height();
            let footer_height = 40.0;

            egui::ScrollArea::vertical()
                .max_height(total_height - footer_height)
                .show(ui, |ui| {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.heading("Speed Edit");
                        ui.add_space(5.0);
                        ui.label(
                            RichText::new("AI-powered property photo enhancement")
                                .color(ui.visuals().text_color().gamma_multiply(0.7)),
                        );
                    });

                    ui.add_space(20.0);
                    self.render_options(ui, &mut action);

                    ui.add_space(10.0);
                    self.render_file(ui, &mut action);

                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| self.render_actions(ui, &mut action));

                    if self.controller.status() != JobStatus::Idle {
                        ui.add_space(20.0);
                        self.render_progress(ui, &mut action);
                    }

                    ui.add_space(20.0);
                });

            ui.with_layout(egui::Layout::bottom_up(Align::Center), |ui| {
                ui.add_space(10.0);
                self.render_footer(ui);
            });
        });

        if let Some(action) = action {
            self.perform(action);
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::PickPhoto => self.pick_photo(),
            Action::Enhance => self.enhance(),
            Action::Pay => self.pay(),
            Action::Save => self.save_enhanced(),
            Action::TryAgain => self.try_again(),
            Action::OpenCheckout => self.open_checkout(),
            Action::SetOptions(options) => self.controller.set_options(options),
        }
    }

    fn render_options(&self, ui: &mut egui::Ui, action: &mut Option<Action>) {
        let editable = matches!(
            self.controller.status(),
            JobStatus::Idle | JobStatus::PreviewReady | JobStatus::Failed
        );
        let mut options = *self.controller.options();

        ui.group(|ui| {
            ui.add_enabled_ui(editable, |ui| {
                ui.horizontal(|ui| {
                    egui::ComboBox::from_label("Image type")
                        .selected_text(options.mode.label())
                        .show_ui(ui, |ui| {
                            for mode in EnhanceMode::ALL {
                                ui.selectable_value(&mut options.mode, mode, mode.label());
                            }
                        });
                    ui.add_space(12.0);
                    egui::ComboBox::from_label("Method")
                        .selected_text(options.engine.label())
                        .show_ui(ui, |ui| {
                            for engine in Engine::ALL {
                                ui.selectable_value(&mut options.engine, engine, engine.label());
                            }
                        });
                });
            });
        });

        if options != *self.controller.options() {
            *action = Some(Action::SetOptions(options));
        }
    }

    fn render_file(&self, ui: &mut egui::Ui, action: &mut Option<Action>) {
        let busy = self.controller.is_busy();

        ui.group(|ui| {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!busy, egui::Button::new("📁 Select Photo"))
                    .clicked()
                {
                    *action = Some(Action::PickPhoto);
                }

                if let Some(job) = self.controller.job() {
                    let source = job.source();
                    ui.label(format!("{} ({})", source.name, format_size(source.size())));
                    if job.preview().is_some() {
                        ui.colored_label(SUCCESS, "preview ready");
                    } else {
                        ui.spinner();
                    }
                }
            });
        });
    }

    fn render_actions(&self, ui: &mut egui::Ui, action: &mut Option<Action>) {
        let size = egui::vec2(220.0, 40.0);

        match self.controller.status() {
            JobStatus::Idle | JobStatus::PreviewReady => {
                let button = egui::Button::new("✨ Enhance Photo").min_size(size);
                if ui
                    .add_enabled(self.controller.can_start_enhancement(), button)
                    .clicked()
                {
                    *action = Some(Action::Enhance);
                }
            }
            JobStatus::Enhancing => {
                ui.add_enabled(false, egui::Button::new("⏳ Enhancing...").min_size(size));
            }
            JobStatus::Enhanced => {
                if self.controller.can_start_checkout() {
                    let button = egui::Button::new(RichText::new("💳 Proceed to Payment").color(Color32::WHITE))
                        .fill(SUCCESS)
                        .min_size(size);
                    if ui.add(button).clicked() {
                        *action = Some(Action::Pay);
                    }
                }
            }
            JobStatus::CreatingCheckout => {
                ui.add_enabled(false, egui::Button::new("⏳ Creating checkout...").min_size(size));
            }
            JobStatus::Redirecting => {
                if ui.button("🔗 Open Payment Page").clicked() {
                    *action = Some(Action::OpenCheckout);
                }
            }
            JobStatus::Failed => {
                if ui
                    .add(egui::Button::new("🔄 Try Again").min_size(size))
                    .clicked()
                {
                    *action = Some(Action::TryAgain);
                }
            }
        }

        if self.controller.policy().allow_download && self.controller.status() != JobStatus::Failed {
            ui.add_space(5.0);
            if ui
                .add_enabled(
                    self.controller.can_save_artifact(),
                    egui::Button::new("💾 Save Enhanced Image"),
                )
                .clicked()
            {
                *action = Some(Action::Save);
            }
        }
    }

    fn render_progress(&self, ui: &mut egui::Ui, action: &mut Option<Action>) {
        let status = self.controller.status();
        let policy = self.controller.policy();

        ui.group(|ui| {
            ui.label(status_text(status, &policy));

            let progress_bar = egui::ProgressBar::new(progress_fraction(status, &policy))
                .show_percentage()
                .animate(self.controller.is_busy())
                .fill(ACCENT);
            ui.add(progress_bar);

            let Some(job) = self.controller.job() else {
                return;
            };

            match job.enhanced_artifact() {
                Some(EnhancedResult::Url(url)) => {
                    ui.horizontal(|ui| {
                        ui.label("Enhanced image:");
                        ui.hyperlink_to(url.as_str(), url.as_str());
                    });
                }
                Some(EnhancedResult::Blob(blob)) => {
                    ui.label(format!(
                        "Enhanced image received ({}, {})",
                        blob.media_type,
                        format_size(blob.bytes.len() as u64)
                    ));
                }
                None => {}
            }

            match job.download() {
                DownloadState::NotRequested => {}
                DownloadState::Saving => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Saving...");
                    });
                }
                DownloadState::Saved(path) => {
                    ui.colored_label(SUCCESS, format!("Saved to {}", path.display()));
                }
                DownloadState::Failed(err) => {
                    ui.colored_label(ERROR, err.to_string());
                }
            }

            if let Some(url) = job.checkout_url() {
                ui.horizontal(|ui| {
                    ui.label("Payment page:");
                    if ui.link(url).clicked() {
                        *action = Some(Action::OpenCheckout);
                    }
                });
            }

            if let Some(err) = job.error() {
                ui.add_space(5.0);
                ui.colored_label(ERROR, err.to_string());
            }
        });
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        if let Some(notice) = &self.state.notice {
            ui.vertical_centered(|ui| {
                ui.colored_label(ERROR, notice);
            });
            ui.add_space(5.0);
        }

        ui.label(
            RichText::new(format!(
                "Enhance with {}",
                self.controller.options().engine.label()
            ))
            .small()
            .color(ui.visuals().text_color().gamma_multiply(0.5)),
        );
    }
}
