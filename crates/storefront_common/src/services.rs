// --- File: crates/storefront_common/src/services.rs ---
//! Service abstractions for external services.
//!
//! The payment processor and the email provider sit behind these traits so the
//! route handlers can be driven by in-process fakes in tests. Implementations
//! live in `storefront-stripe` and `storefront-email`; the backend's service
//! factory wraps them with [`BoxedPaymentService`] / [`BoxedNotificationService`]
//! to get object-safe handles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// A wrapper error type that implements std::error::Error for Box<dyn std::error::Error + Send + Sync>
#[derive(Debug)]
pub struct BoxedError(pub Box<dyn StdError + Send + Sync>);

impl BoxedError {
    pub fn new<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        BoxedError(Box::new(err))
    }
}

impl fmt::Display for BoxedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl StdError for BoxedError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn StdError + Send + Sync>> for BoxedError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        BoxedError(err)
    }
}

/// A trait for payment processor operations.
pub trait PaymentService: Send + Sync {
    /// Error type returned by payment service operations.
    type Error: StdError + Send + Sync + 'static;

    /// Create a hosted checkout session. Either a full session is created or none.
    fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error>;
}

/// A trait for notification service operations.
pub trait NotificationService: Send + Sync {
    /// Error type returned by notification service operations.
    type Error: StdError + Send + Sync + 'static;

    /// Send one email to every address in `message.to`.
    fn send_email(&self, message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error>;
}

/// Shared, type-erased payment service handle.
pub type DynPaymentService = Arc<dyn PaymentService<Error = BoxedError>>;

/// Shared, type-erased notification service handle.
pub type DynNotificationService = Arc<dyn NotificationService<Error = BoxedError>>;

/// Source of the service handles the routers are built from.
pub trait ServiceFactory: Send + Sync {
    /// Get a payment service instance.
    fn payment_service(&self) -> Option<DynPaymentService>;

    /// Get a notification service instance.
    fn notification_service(&self) -> Option<DynNotificationService>;
}

/// Erases the error type of a [`PaymentService`].
pub struct BoxedPaymentService<S>(pub S);

impl<S: PaymentService> PaymentService for BoxedPaymentService<S> {
    type Error = BoxedError;

    fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error> {
        Box::pin(async move {
            self.0
                .create_checkout_session(request)
                .await
                .map_err(BoxedError::new)
        })
    }
}

/// Erases the error type of a [`NotificationService`].
pub struct BoxedNotificationService<S>(pub S);

impl<S: NotificationService> NotificationService for BoxedNotificationService<S> {
    type Error = BoxedError;

    fn send_email(&self, message: EmailMessage) -> BoxFuture<'_, NotificationResult, Self::Error> {
        Box::pin(async move { self.0.send_email(message).await.map_err(BoxedError::new) })
    }
}

/// Data structures for payment service operations.
/// One line of a checkout session, priced in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: u32,
}

/// Everything the processor needs to create a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub currency: String,
    pub payment_method_types: Vec<String>,
    pub line_items: Vec<LineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    /// String-keyed, string-valued, as the processor requires.
    pub metadata: BTreeMap<String, String>,
}

/// Represents a created checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionResult {
    /// The ID of the session (cs_...).
    pub id: String,
    /// The hosted page the client should be redirected to.
    pub url: String,
}

/// Data structures for notification service operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
    pub reply_to: Option<String>,
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// Provider-side message ID, when the provider returns one.
    pub id: String,
    /// The status of the notification.
    pub status: String,
}
