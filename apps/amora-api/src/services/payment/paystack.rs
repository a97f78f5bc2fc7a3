use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha512;

use super::{GatewayError, InitializedCharge, PaymentGateway, VerifiedCharge};

const DEFAULT_BASE_URL: &str = "https://api.paystack.co";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct PaystackGateway {
    secret_key: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    status: bool,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct InitData {
    authorization_url: String,
    reference: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    id: Option<i64>,
    amount: Option<i64>,
}

impl PaystackGateway {
    pub fn new(secret_key: String) -> anyhow::Result<Self> {
        Self::with_base_url(secret_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(secret_key: String, base_url: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { secret_key, base_url, client })
    }

    fn map_transport(err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::RequestFailed(err.to_string())
        }
    }

    async fn post_init(&self, body: serde_json::Value) -> Result<InitializedCharge, GatewayError> {
        let resp = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport)?;

        let envelope: ApiEnvelope<InitData> =
            resp.json().await.map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if !envelope.status {
            return Err(GatewayError::Rejected(
                envelope.message.unwrap_or_else(|| "initialization declined".to_string()),
            ));
        }

        let data = envelope
            .data
            .ok_or_else(|| GatewayError::InvalidResponse("missing data in init response".into()))?;

        Ok(InitializedCharge {
            payment_url: data.authorization_url,
            reference: data.reference,
        })
    }

    fn signature_of(&self, payload: &[u8]) -> Vec<u8> {
        // HMAC accepts keys of any length.
        let mut mac = Hmac::<Sha512>::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC key length");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
    async fn initialize_charge(
        &self,
        email: &str,
        amount: i64,
        reference: &str,
    ) -> Result<InitializedCharge, GatewayError> {
        self.post_init(json!({
            "email": email,
            "amount": amount,
            "reference": reference,
        }))
        .await
    }

    async fn initialize_subscription(
        &self,
        email: &str,
        plan_code: &str,
        reference: &str,
    ) -> Result<InitializedCharge, GatewayError> {
        self.post_init(json!({
            "email": email,
            "plan": plan_code,
            "reference": reference,
        }))
        .await
    }

    async fn verify_charge(&self, reference: &str) -> Result<VerifiedCharge, GatewayError> {
        let resp = self
            .client
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(Self::map_transport)?;

        let envelope: ApiEnvelope<VerifyData> =
            resp.json().await.map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if !envelope.status {
            return Err(GatewayError::Rejected(
                envelope.message.unwrap_or_else(|| "verification declined".to_string()),
            ));
        }

        let data = envelope.data.ok_or_else(|| {
            GatewayError::InvalidResponse("missing data in verify response".into())
        })?;

        Ok(VerifiedCharge {
            success: data.status == "success",
            status: data.status,
            amount: data.amount,
            provider_txn_id: data.id.map(|id| id.to_string()),
        })
    }

    async fn disable_subscription(
        &self,
        subscription_code: &str,
        email_token: &str,
    ) -> Result<(), GatewayError> {
        let resp = self
            .client
            .post(format!("{}/subscription/disable", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&json!({
                "code": subscription_code,
                "token": email_token,
            }))
            .send()
            .await
            .map_err(Self::map_transport)?;

        let envelope: ApiEnvelope<serde_json::Value> =
            resp.json().await.map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if !envelope.status {
            return Err(GatewayError::Rejected(
                envelope.message.unwrap_or_else(|| "disable declined".to_string()),
            ));
        }
        Ok(())
    }

    /// The gateway signs the exact raw body with HMAC-SHA512 of the secret
    /// key, hex encoded, in the x-paystack-signature header. Comparison is
    /// constant-time via Mac::verify_slice.
    fn verify_signature(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<(), GatewayError> {
        let signature = signature.ok_or(GatewayError::MissingSignature)?;
        let expected = hex::decode(signature).map_err(|_| GatewayError::InvalidSignature)?;

        let mut mac = Hmac::<Sha512>::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC key length");
        mac.update(payload);
        mac.verify_slice(&expected).map_err(|_| GatewayError::InvalidSignature)
    }

    fn name(&self) -> &str {
        "paystack"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> PaystackGateway {
        PaystackGateway::with_base_url("sk_test_secret".into(), "http://localhost:0".into())
            .unwrap()
    }

    #[test]
    fn valid_signature_passes() {
        let gw = gateway();
        let body = br#"{"event":"charge.success","data":{"reference":"ref_1"}}"#;
        let sig = hex::encode(gw.signature_of(body));
        assert!(gw.verify_signature(body, Some(&sig)).is_ok());
    }

    #[test]
    fn tampered_body_fails() {
        let gw = gateway();
        let sig = hex::encode(gw.signature_of(b"original"));
        assert!(matches!(
            gw.verify_signature(b"tampered", Some(&sig)),
            Err(GatewayError::InvalidSignature)
        ));
    }

    #[test]
    fn missing_signature_fails() {
        let gw = gateway();
        assert!(matches!(
            gw.verify_signature(b"anything", None),
            Err(GatewayError::MissingSignature)
        ));
    }

    #[test]
    fn non_hex_signature_fails() {
        let gw = gateway();
        assert!(matches!(
            gw.verify_signature(b"anything", Some("not-hex!")),
            Err(GatewayError::InvalidSignature)
        ));
    }

    #[test]
    fn signature_depends_on_secret() {
        let a = gateway();
        let b = PaystackGateway::with_base_url("sk_other".into(), "http://localhost:0".into())
            .unwrap();
        let body = b"payload";
        let sig = hex::encode(a.signature_of(body));
        assert!(b.verify_signature(body, Some(&sig)).is_err());
    }
}
