pub mod models;
pub mod warnings;
pub mod notification;
pub mod orchestrator;

pub use models::{CheckoutRequest, ConfirmationResult};
pub use notification::MailPolicy;
pub use orchestrator::{CheckoutPolicy, ConfirmError, ConfirmationDeps, ConfirmationOrchestrator};
pub use warnings::{Warning, WarningKind, WarningSet};
