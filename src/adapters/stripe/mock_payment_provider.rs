//! Mock payment gateway for tests and local development.
//!
//! Behaves like a tiny in-memory Stripe: created intents start in
//! `processing`, can be driven to `succeeded`/`canceled` from test code, and
//! webhook verification accepts a fixed test signature.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::ports::{
    CreatePaymentRequest, CreatedPayment, GatewayEventType, GatewayWebhookEvent, PaymentDetails,
    PaymentError, PaymentGateway, PaymentStatus,
};

/// Signature accepted by [`MockPaymentGateway::verify_webhook`].
pub const MOCK_WEBHOOK_SIGNATURE: &str = "mock-signature";

/// In-memory [`PaymentGateway`] double.
#[derive(Default)]
pub struct MockPaymentGateway {
    payments: Mutex<HashMap<String, PaymentDetails>>,
    fail_retrievals: Mutex<bool>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payment in an arbitrary state.
    pub fn register_payment(&self, details: PaymentDetails) {
        self.payments
            .lock()
            .unwrap()
            .insert(details.id.clone(), details);
    }

    /// Registers a succeeded payment carrying package/user metadata, the
    /// shape `confirm_purchase` consumes.
    pub fn register_succeeded(
        &self,
        reference: &str,
        amount_cents: i64,
        currency: &str,
        package_id: &str,
        user_id: &str,
    ) {
        let mut metadata = HashMap::new();
        metadata.insert("package_id".to_string(), package_id.to_string());
        metadata.insert("user_id".to_string(), user_id.to_string());
        self.register_payment(PaymentDetails {
            id: reference.to_string(),
            status: PaymentStatus::Succeeded,
            amount_cents,
            currency: currency.to_string(),
            metadata,
        });
    }

    /// Drives a payment to a new status.
    pub fn set_status(&self, reference: &str, status: PaymentStatus) {
        if let Some(details) = self.payments.lock().unwrap().get_mut(reference) {
            details.status = status;
        }
    }

    /// Makes retrievals fail with a network error.
    pub fn fail_retrievals(&self, fail: bool) {
        *self.fail_retrievals.lock().unwrap() = fail;
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn retrieve_payment(&self, reference: &str) -> Result<PaymentDetails, PaymentError> {
        if *self.fail_retrievals.lock().unwrap() {
            return Err(PaymentError::network("Simulated gateway outage"));
        }

        self.payments
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| PaymentError::not_found(reference))
    }

    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatedPayment, PaymentError> {
        let id = format!("pi_mock_{}", Uuid::new_v4().simple());
        let mut metadata = HashMap::new();
        metadata.insert("package_id".to_string(), request.package_id.to_string());
        metadata.insert("user_id".to_string(), request.user_id.to_string());

        let details = PaymentDetails {
            id: id.clone(),
            status: PaymentStatus::Processing,
            amount_cents: request.amount_cents,
            currency: request.currency.clone(),
            metadata,
        };
        self.payments.lock().unwrap().insert(id.clone(), details);

        Ok(CreatedPayment {
            client_secret: format!("{}_secret_mock", id),
            id,
            status: PaymentStatus::Processing,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<GatewayWebhookEvent, PaymentError> {
        if signature != MOCK_WEBHOOK_SIGNATURE {
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::invalid_webhook(format!("Invalid JSON: {}", e)))?;

        let event_type = match value.get("type").and_then(|v| v.as_str()) {
            Some("payment_intent.succeeded") => GatewayEventType::PaymentSucceeded,
            Some("payment_intent.payment_failed") => GatewayEventType::PaymentFailed,
            Some(other) => GatewayEventType::Unknown(other.to_string()),
            None => return Err(PaymentError::invalid_webhook("Missing event type")),
        };

        let payment_id = value
            .get("payment_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| PaymentError::invalid_webhook("Missing payment_id"))?
            .to_string();

        Ok(GatewayWebhookEvent {
            id: value
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("evt_mock")
                .to_string(),
            event_type,
            payment_id,
            created_at: value.get("created").and_then(|v| v.as_i64()).unwrap_or(0),
        })
    }
}
