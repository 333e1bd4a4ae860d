// --- File: crates/storefront_email/src/lib.rs ---

pub mod error;
pub mod resend;
pub mod smtp;

pub use error::EmailError;
pub use resend::ResendEmailService;
pub use smtp::SmtpEmailService;
