//! # Order Gateway
//!
//! The seam between checkout and the order endpoint. Production uses
//! [`HttpOrderGateway`]; tests plug in their own implementation.

use async_trait::async_trait;
use bistro_core::{CheckoutPayload, OrderReceipt};
use serde::Deserialize;
use tracing::debug;

use crate::error::GatewayError;

/// Submits checkout payloads to the backend.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit_order(&self, payload: &CheckoutPayload) -> Result<OrderReceipt, GatewayError>;
}

/// `{ code, message }` error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Posts orders to `{base_url}/api/orders`.
#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpOrderGateway::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        HttpOrderGateway {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn orders_url(&self) -> String {
        format!("{}/api/orders", self.base_url)
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn submit_order(&self, payload: &CheckoutPayload) -> Result<OrderReceipt, GatewayError> {
        let url = self.orders_url();
        debug!(url = %url, lines = payload.items.len(), "Submitting order");

        let resp = self.client.post(&url).json(payload).send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json::<OrderReceipt>().await?);
        }

        let text = resp.text().await?;
        match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => Err(GatewayError::Rejected {
                code: body.code,
                message: body.message,
            }),
            Err(_) => Err(GatewayError::InvalidResponse(format!(
                "HTTP {status}: {text}"
            ))),
        }
    }
}
