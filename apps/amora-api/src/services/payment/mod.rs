use async_trait::async_trait;
use thiserror::Error;

pub mod paystack;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request timed out")]
    Timeout,

    #[error("gateway request failed: {0}")]
    RequestFailed(String),

    #[error("gateway rejected the request: {0}")]
    Rejected(String),

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),

    #[error("missing webhook signature")]
    MissingSignature,

    #[error("invalid webhook signature")]
    InvalidSignature,
}

/// Hosted-checkout handle returned by charge initialization.
#[derive(Debug, Clone)]
pub struct InitializedCharge {
    pub payment_url: String,
    pub reference: String,
}

/// Authoritative charge state as reported by the gateway's verify endpoint.
#[derive(Debug, Clone)]
pub struct VerifiedCharge {
    pub success: bool,
    pub status: String,
    pub amount: Option<i64>,
    pub provider_txn_id: Option<String>,
}

/// Hosted-checkout payment gateway. All network calls carry a bounded
/// timeout; a timeout surfaces as a retryable error with no local state
/// touched.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a one-off charge and return the hosted payment URL plus the
    /// reference correlating it.
    async fn initialize_charge(
        &self,
        email: &str,
        amount: i64,
        reference: &str,
    ) -> Result<InitializedCharge, GatewayError>;

    /// Create a recurring charge against a gateway-side plan code.
    async fn initialize_subscription(
        &self,
        email: &str,
        plan_code: &str,
        reference: &str,
    ) -> Result<InitializedCharge, GatewayError>;

    /// Query the authoritative status of a charge.
    async fn verify_charge(&self, reference: &str) -> Result<VerifiedCharge, GatewayError>;

    /// Stop a recurring subscription at the gateway.
    async fn disable_subscription(
        &self,
        subscription_code: &str,
        email_token: &str,
    ) -> Result<(), GatewayError>;

    /// Verify an inbound webhook's authenticity against the raw request body.
    fn verify_signature(&self, payload: &[u8], signature: Option<&str>) -> Result<(), GatewayError>;

    fn name(&self) -> &str;
}
