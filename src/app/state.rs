use crate::workflow::{JobStatus, WorkflowPolicy};

/// View-only state. Everything about the job itself lives in the controller.
#[derive(Debug, Default)]
pub struct UiState {
    /// Messages that are not part of the job, such as a rejected file.
    pub notice: Option<String>,
    /// Generation whose checkout page has already been opened.
    pub opened_redirect: Option<u64>,
}

impl UiState {
    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}

pub fn progress_fraction(status: JobStatus, policy: &WorkflowPolicy) -> f32 {
    match status {
        JobStatus::Idle | JobStatus::Failed => 0.0,
        JobStatus::PreviewReady => 0.2,
        JobStatus::Enhancing => 0.4,
        JobStatus::Enhanced if !policy.offers_checkout() => 1.0,
        JobStatus::Enhanced => 0.6,
        JobStatus::CreatingCheckout => 0.8,
        JobStatus::Redirecting => 1.0,
    }
}

pub fn status_text(status: JobStatus, policy: &WorkflowPolicy) -> &'static str {
    match status {
        JobStatus::Idle => "Choose a property photo to get started",
        JobStatus::PreviewReady => "Photo ready to enhance",
        JobStatus::Enhancing => "⏳ Enhancing your photo...",
        JobStatus::Enhanced if policy.offers_checkout() => "✅ Enhanced! Continue to payment to receive it",
        JobStatus::Enhanced => "✅ Enhanced!",
        JobStatus::CreatingCheckout => "⏳ Preparing secure checkout...",
        JobStatus::Redirecting => "🔗 Redirecting to payment",
        JobStatus::Failed => "❌ Something went wrong",
    }
}

pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = size as f64;
    let mut unit = 0;

    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", size, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::CheckoutMode;

    #[test]
    fn enhanced_is_complete_without_checkout() {
        let policy = WorkflowPolicy {
            checkout: CheckoutMode::Disabled,
            allow_download: true,
        };
        assert_eq!(progress_fraction(JobStatus::Enhanced, &policy), 1.0);
        assert_eq!(
            progress_fraction(JobStatus::Enhanced, &WorkflowPolicy::default()),
            0.6
        );
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }
}
