//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` trait for the Stripe API: payment intent
//! creation/retrieval and webhook verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::ports::{
    CreatePaymentRequest, CreatedPayment, GatewayEventType, GatewayWebhookEvent, PaymentDetails,
    PaymentError, PaymentErrorCode, PaymentGateway, PaymentStatus,
};

use super::webhook_types::{
    hex_encode, SignatureHeader, StripePaymentIntent, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Whether to require livemode events in production.
    require_livemode: bool,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            require_livemode: false,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Require livemode events in production.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe payment gateway adapter.
pub struct StripePaymentGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentGateway {
    /// Create a new Stripe gateway with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Verify webhook signature using HMAC-SHA256.
    ///
    /// # Security
    ///
    /// - Constant-time comparison to prevent timing attacks
    /// - Timestamp validation to prevent replay attacks
    fn verify_signature(
        &self,
        payload: &[u8],
        header: &SignatureHeader,
    ) -> Result<(), PaymentError> {
        // 1. Validate timestamp (prevent replay attacks)
        let now = chrono::Utc::now().timestamp();
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_webhook("Event timestamp in future"));
        }

        // 2. Compute expected signature
        let signed_payload = format!(
            "{}.{}",
            header.timestamp,
            String::from_utf8_lossy(payload)
        );

        let mut mac = HmacSha256::new_from_slice(
            self.config.webhook_secret.expose_secret().as_bytes(),
        )
        .expect("HMAC can take key of any size");

        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();

        // 3. Constant-time comparison
        let expected_bytes: &[u8] = expected.as_slice();
        let provided_bytes: &[u8] = &header.v1_signature;

        if expected_bytes.ct_eq(provided_bytes).unwrap_u8() != 1 {
            tracing::warn!(
                expected_signature = hex_encode(expected_bytes),
                "Invalid webhook signature"
            );
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    fn map_status(status: &str) -> PaymentStatus {
        match status {
            "succeeded" => PaymentStatus::Succeeded,
            "processing" => PaymentStatus::Processing,
            "requires_payment_method" => PaymentStatus::RequiresPaymentMethod,
            "requires_confirmation" | "requires_action" => PaymentStatus::RequiresConfirmation,
            "canceled" => PaymentStatus::Canceled,
            _ => PaymentStatus::Unknown,
        }
    }

    fn intent_to_details(intent: StripePaymentIntent) -> PaymentDetails {
        PaymentDetails {
            status: Self::map_status(&intent.status),
            id: intent.id,
            amount_cents: intent.amount,
            currency: intent.currency,
            metadata: intent.metadata,
        }
    }
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn retrieve_payment(&self, reference: &str) -> Result<PaymentDetails, PaymentError> {
        let url = format!(
            "{}/v1/payment_intents/{}",
            self.config.api_base_url, reference
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PaymentError::not_found(reference));
        }
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PaymentError::authentication("Invalid Stripe API key"));
        }
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(error = %error_text, "Stripe retrieve_payment failed");
            return Err(PaymentError::provider(format!(
                "Stripe API error: {}",
                error_text
            )));
        }

        let intent: StripePaymentIntent = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok(Self::intent_to_details(intent))
    }

    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatedPayment, PaymentError> {
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);

        let params: Vec<(&str, String)> = vec![
            ("amount", request.amount_cents.to_string()),
            ("currency", request.currency.clone()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("metadata[package_id]", request.package_id.to_string()),
            ("metadata[user_id]", request.user_id.to_string()),
        ];

        let mut builder = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params);

        if let Some(idempotency_key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", idempotency_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PaymentError::authentication("Invalid Stripe API key"));
        }
        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(error = %error_text, "Stripe create_payment failed");
            return Err(PaymentError::provider(format!(
                "Stripe API error: {}",
                error_text
            )));
        }

        let intent: StripePaymentIntent = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        let client_secret = intent.client_secret.clone().ok_or_else(|| {
            PaymentError::provider("Payment intent response missing client_secret")
        })?;

        Ok(CreatedPayment {
            status: Self::map_status(&intent.status),
            id: intent.id,
            client_secret,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayWebhookEvent, PaymentError> {
        let header = SignatureHeader::parse(signature)
            .map_err(|e| PaymentError::invalid_webhook(e.to_string()))?;

        self.verify_signature(payload, &header)?;

        let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        if self.config.require_livemode && !stripe_event.livemode {
            tracing::warn!(
                event_id = %stripe_event.id,
                "Rejected test mode event in production"
            );
            return Err(PaymentError::invalid_webhook(
                "Test mode events not allowed in production",
            ));
        }

        let event_type = match stripe_event.event_type.as_str() {
            "payment_intent.succeeded" => GatewayEventType::PaymentSucceeded,
            "payment_intent.payment_failed" => GatewayEventType::PaymentFailed,
            other => GatewayEventType::Unknown(other.to_string()),
        };

        let payment_id = stripe_event
            .data
            .object
            .get("id")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| PaymentError::invalid_webhook("Event object missing id"))?;

        Ok(GatewayWebhookEvent {
            id: stripe_event.id,
            event_type,
            payment_id,
            created_at: stripe_event.created,
        })
    }
}
