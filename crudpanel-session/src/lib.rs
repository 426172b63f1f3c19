pub mod action;
pub mod dispatch;
pub mod factory;
pub mod staging;
pub mod store;

pub use action::Action;
pub use dispatch::{execute, ActionOutcome};
pub use factory::{ProviderSession, SessionFactory};
pub use staging::StagedMedia;
pub use store::{CredentialStore, SessionState, ValidationOutcome};
