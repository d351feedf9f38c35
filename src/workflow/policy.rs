use serde::Deserialize;

/// When, if ever, payment follows a successful enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    /// The user asks for checkout once the enhanced image is shown.
    #[default]
    Manual,
    /// Checkout starts as soon as the enhanced image arrives.
    Automatic,
    /// No payment step; the enhanced image is the end of the flow.
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowPolicy {
    pub checkout: CheckoutMode,
    /// Whether the enhanced image may be saved locally before payment.
    pub allow_download: bool,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            checkout: CheckoutMode::Manual,
            allow_download: true,
        }
    }
}

impl WorkflowPolicy {
    pub fn offers_checkout(&self) -> bool {
        self.checkout != CheckoutMode::Disabled
    }
}
