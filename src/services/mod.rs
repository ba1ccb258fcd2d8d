pub mod initiator;
pub mod validation;

pub use initiator::SessionInitiator;
pub use validation::{CallbackOutcome, ValidationService, WebhookOutcome};
