//! Payment gateway integration: hosted checkout session creation and the
//! signed webhook callback. The gateway API takes form-encoded bodies;
//! amounts are integral paise (INR).

use anyhow::{anyhow, Context, Result};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Accept webhook timestamps at most this far from now.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct LineItem {
    pub name: String,
    pub image_url: Option<String>,
    /// Unit price in rupees; converted to paise on the wire.
    pub unit_price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// REST client for the hosted checkout API.
#[derive(Clone)]
pub struct PaymentGateway {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl PaymentGateway {
    pub fn new(http: reqwest::Client, secret_key: &str) -> Self {
        Self {
            http,
            api_base: "https://api.stripe.com".to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    pub async fn create_checkout_session(
        &self,
        items: &[LineItem],
        success_url: &str,
        cancel_url: &str,
        user_id: &str,
    ) -> Result<CheckoutSession> {
        let params = checkout_form_params(items, success_url, cancel_url, user_id);
        let resp = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .context("checkout session request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("checkout session failed: HTTP {} {}", status, body));
        }
        let session: CheckoutSession = resp.json().await.context("checkout session: bad body")?;
        debug!(session = %session.id, "checkout session created");
        Ok(session)
    }
}

/// Flatten line items into the gateway's indexed form-parameter scheme.
fn checkout_form_params(
    items: &[LineItem],
    success_url: &str,
    cancel_url: &str,
    user_id: &str,
) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        ("payment_method_types[0]".into(), "card".into()),
        ("success_url".into(), success_url.into()),
        ("cancel_url".into(), cancel_url.into()),
        ("metadata[userId]".into(), user_id.into()),
    ];
    for (i, item) in items.iter().enumerate() {
        let paise = (item.unit_price * 100.0).round() as i64;
        params.push((
            format!("line_items[{i}][price_data][currency]"),
            "inr".into(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        if let Some(url) = &item.image_url {
            params.push((
                format!("line_items[{i}][price_data][product_data][images][0]"),
                url.clone(),
            ));
        }
        params.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            paise.to_string(),
        ));
        params.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
    }
    params
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("malformed signature header")]
    MalformedHeader,
    #[error("signature mismatch")]
    BadSignature,
    #[error("timestamp outside tolerance")]
    Stale,
}

/// Webhook event envelope; only the type discriminator and the object payload
/// are read.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

/// Verify a `t=<unix>,v1=<hex>` signature header against the raw payload.
///
/// The signed message is `"{t}.{payload}"` under HMAC-SHA256 with the shared
/// endpoint secret; comparison happens inside the MAC (constant time), and
/// the timestamp must be within [`SIGNATURE_TOLERANCE_SECS`] of `now_unix`.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now_unix: i64,
) -> Result<(), WebhookError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();
    for part in header.split(',') {
        let Some((k, v)) = part.trim().split_once('=') else {
            continue;
        };
        match k {
            "t" => timestamp = v.parse().ok(),
            "v1" => {
                if let Some(sig) = decode_hex(v) {
                    signatures.push(sig);
                }
            }
            _ => {}
        }
    }
    let t = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }
    if (now_unix - t).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookError::Stale);
    }

    for sig in &signatures {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|_| WebhookError::MalformedHeader)?;
        mac.update(t.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(sig).is_ok() {
            return Ok(());
        }
    }
    Err(WebhookError::BadSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &[u8], secret: &str, t: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(t.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let digest = mac.finalize().into_bytes();
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        format!("t={},v1={}", t, hex)
    }

    #[test]
    fn accepts_a_valid_signature() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = sign(payload, "whsec_test", 1_700_000_000);
        assert_eq!(
            verify_signature(payload, &header, "whsec_test", 1_700_000_010),
            Ok(())
        );
    }

    #[test]
    fn rejects_a_tampered_payload() {
        let payload = br#"{"amount":100}"#;
        let header = sign(payload, "whsec_test", 1_700_000_000);
        assert_eq!(
            verify_signature(br#"{"amount":99900}"#, &header, "whsec_test", 1_700_000_010),
            Err(WebhookError::BadSignature)
        );
    }

    #[test]
    fn rejects_the_wrong_secret() {
        let payload = b"body";
        let header = sign(payload, "whsec_a", 1_700_000_000);
        assert_eq!(
            verify_signature(payload, &header, "whsec_b", 1_700_000_010),
            Err(WebhookError::BadSignature)
        );
    }

    #[test]
    fn rejects_stale_timestamps() {
        let payload = b"body";
        let header = sign(payload, "whsec_test", 1_700_000_000);
        assert_eq!(
            verify_signature(
                payload,
                &header,
                "whsec_test",
                1_700_000_000 + SIGNATURE_TOLERANCE_SECS + 1
            ),
            Err(WebhookError::Stale)
        );
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(
            verify_signature(b"body", "v1=zz", "whsec", 0),
            Err(WebhookError::MalformedHeader)
        );
        assert_eq!(
            verify_signature(b"body", "t=123", "whsec", 0),
            Err(WebhookError::MalformedHeader)
        );
        assert_eq!(
            verify_signature(b"body", "", "whsec", 0),
            Err(WebhookError::MalformedHeader)
        );
    }

    #[test]
    fn form_params_convert_rupees_to_paise() {
        let items = vec![LineItem {
            name: "Areca Palm".into(),
            image_url: Some("https://img.example/areca.png".into()),
            unit_price: 249.99,
            quantity: 2,
        }];
        let params = checkout_form_params(&items, "https://s/ok", "https://s/no", "u-1");
        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
                .unwrap_or_default()
        };
        assert_eq!(get("mode"), "payment");
        assert_eq!(get("line_items[0][price_data][currency]"), "inr");
        assert_eq!(get("line_items[0][price_data][unit_amount]"), "24999");
        assert_eq!(get("line_items[0][quantity]"), "2");
        assert_eq!(get("metadata[userId]"), "u-1");
    }
}
