mod state;
mod ui;

use eframe::{egui, App};
use rfd::FileDialog;
use std::time::Duration;
use tracing::{info, warn};

use crate::upload::{EnhanceOptions, RawFile};
use crate::workflow::{JobStatus, WorkflowController};
pub use state::{format_size, progress_fraction, status_text, UiState};

pub struct SpeedEditApp {
    controller: WorkflowController<EnhanceOptions>,
    state: UiState,
}

impl SpeedEditApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        controller: WorkflowController<EnhanceOptions>,
    ) -> Self {
        info!("Initializing Speed Edit");
        Self {
            controller,
            state: UiState::default(),
        }
    }

    pub fn pick_photo(&mut self) {
        self.state.clear_notice();

        let extensions = self.controller.intake().extensions();
        let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();
        let picked = FileDialog::new()
            .add_filter("Images", &extensions)
            .pick_file();

        let raw = match picked.map(|path| RawFile::from_path(&path)).transpose() {
            Ok(raw) => raw,
            Err(err) => {
                self.state.notice = Some(err.to_string());
                return;
            }
        };

        if let Err(err) = self.controller.select_file(raw) {
            self.state.notice = Some(err.to_string());
        }
    }

    pub fn enhance(&mut self) {
        self.state.clear_notice();
        self.controller.start_enhancement();
    }

    pub fn pay(&mut self) {
        self.state.clear_notice();
        self.controller.start_checkout();
    }

    pub fn try_again(&mut self) {
        self.state.clear_notice();
        if self.controller.restart() {
            self.controller.start_enhancement();
        }
    }

    pub fn save_enhanced(&mut self) {
        if let Some(dir) = FileDialog::new().pick_folder() {
            self.controller.save_artifact(dir);
        }
    }

    pub fn open_checkout(&mut self) {
        let Some(job) = self.controller.job() else {
            return;
        };
        let Some(url) = job.checkout_url() else {
            return;
        };

        info!(url, "opening checkout page");
        if let Err(e) = open::that(url) {
            warn!(error = %e, "failed to open checkout page");
            self.state.notice = Some(format!("Could not open the payment page: {}", e));
        }
        self.state.opened_redirect = Some(job.generation());
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.controller.poll() > 0 {
            ctx.request_repaint();
        }

        // Hand over to the hosted payment page once per job.
        let redirect_pending = self.controller.job().is_some_and(|job| {
            job.status() == JobStatus::Redirecting
                && self.state.opened_redirect != Some(job.generation())
        });
        if redirect_pending {
            self.open_checkout();
        }

        // Background results only arrive through polling.
        if self.controller.is_busy() || self.controller.job().is_some_and(|j| j.preview().is_none()) {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl App for SpeedEditApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
