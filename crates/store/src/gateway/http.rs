//! HTTP gateway
//!
//! Talks to the hosted storefront's JSON API. Every endpoint answers with
//! the same envelope, `{"success": bool, "data": ..., "message": ...,
//! "error": ...}`, so response handling is a single decode path: transport
//! problems become [`GatewayError::Network`], auth problems become
//! [`GatewayError::Unauthenticated`], and an unsuccessful envelope carries
//! the server's own rejection text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use liveshop::promos::PromoCode;

use crate::{
    cart::{CartLine, LineUuid},
    catalog::{ProductSnapshot, ProductUuid},
    orders::{Order, OrderAdminUpdate, OrderDraft, OrderUuid},
    wishlist::WishlistEntry,
};

use super::{FetchedPromo, GatewayError, StorefrontGateway};

/// How long any single API request may take before it counts as a network
/// failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the storefront API.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Base URL of the API, with or without a trailing slash.
    pub base_url: String,

    /// Bearer token for the signed-in buyer; `None` for guest sessions.
    pub token: Option<String>,
}

/// The production [`StorefrontGateway`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    config: HttpGatewayConfig,
    http: Client,
}

impl HttpGateway {
    /// Builds a gateway with the standard request timeout.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Network`]: The TLS backend could not be
    ///   initialized.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| GatewayError::Network(error.to_string()))?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn exchange(
        &self,
        request: RequestBuilder,
    ) -> Result<(StatusCode, String), GatewayError> {
        let request = match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(from_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(from_transport)?;

        Ok((status, body))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let (status, body) = self.exchange(request).await?;

        decode(status, &body)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<(), GatewayError> {
        let (status, body) = self.exchange(request).await?;

        decode_unit(status, &body)
    }
}

#[async_trait]
impl StorefrontGateway for HttpGateway {
    async fn cart_snapshot(&self) -> Result<Vec<CartLine>, GatewayError> {
        self.fetch(self.http.get(self.url("cart"))).await
    }

    async fn add_cart_line(
        &self,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartLine, GatewayError> {
        let body = AddCartBody { product_id: product, quantity };

        self.fetch(self.http.post(self.url("cart")).json(&body)).await
    }

    async fn update_cart_line(
        &self,
        line: LineUuid,
        quantity: u32,
    ) -> Result<CartLine, GatewayError> {
        let body = QuantityBody { quantity };

        self.fetch(self.http.put(self.url(&format!("cart/{line}"))).json(&body))
            .await
    }

    async fn remove_cart_line(&self, line: LineUuid) -> Result<(), GatewayError> {
        self.execute(self.http.delete(self.url(&format!("cart/{line}"))))
            .await
    }

    async fn clear_cart(&self) -> Result<(), GatewayError> {
        self.execute(self.http.delete(self.url("cart"))).await
    }

    async fn wishlist(&self) -> Result<Vec<WishlistEntry>, GatewayError> {
        self.fetch(self.http.get(self.url("wishlist"))).await
    }

    async fn add_wishlist(&self, product: ProductUuid) -> Result<WishlistEntry, GatewayError> {
        let body = AddWishlistBody { product_id: product };

        self.fetch(self.http.post(self.url("wishlist")).json(&body))
            .await
    }

    async fn remove_wishlist(&self, product: ProductUuid) -> Result<(), GatewayError> {
        self.execute(self.http.delete(self.url(&format!("wishlist/{product}"))))
            .await
    }

    async fn product(&self, product: ProductUuid) -> Result<ProductSnapshot, GatewayError> {
        self.fetch(self.http.get(self.url(&format!("products/{product}"))))
            .await
    }

    async fn promo(&self, code: String) -> Result<FetchedPromo, GatewayError> {
        let payload: PromoPayload = self
            .fetch(self.http.get(self.url(&format!("promos/{code}"))))
            .await?;

        Ok(FetchedPromo {
            promo: payload.promo,
            buyer_uses: payload.buyer_uses,
        })
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, GatewayError> {
        self.fetch(self.http.post(self.url("orders")).json(&draft))
            .await
    }

    async fn update_order(
        &self,
        order: OrderUuid,
        update: OrderAdminUpdate,
    ) -> Result<Order, GatewayError> {
        self.fetch(
            self.http
                .patch(self.url(&format!("orders/{order}")))
                .json(&update),
        )
        .await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddCartBody {
    product_id: ProductUuid,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct QuantityBody {
    quantity: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddWishlistBody {
    product_id: ProductUuid,
}

/// A promo definition with the caller's redemption count inlined.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromoPayload {
    #[serde(flatten)]
    promo: PromoCode,
    buyer_uses: u32,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn rejection_text(self) -> String {
        self.error
            .or(self.message)
            .unwrap_or_else(|| "request rejected".to_string())
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, GatewayError> {
    let envelope = parse_envelope(status, body)?;

    if envelope.success {
        envelope
            .data
            .ok_or_else(|| GatewayError::UnexpectedResponse("missing data field".to_string()))
    } else {
        Err(GatewayError::Rejected(envelope.rejection_text()))
    }
}

// Delete endpoints answer a bare success envelope with no data.
fn decode_unit(status: StatusCode, body: &str) -> Result<(), GatewayError> {
    let envelope: Envelope<serde_json::Value> = parse_envelope(status, body)?;

    if envelope.success {
        Ok(())
    } else {
        Err(GatewayError::Rejected(envelope.rejection_text()))
    }
}

fn parse_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<Envelope<T>, GatewayError> {
    match status {
        StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthenticated),
        StatusCode::NOT_FOUND => Err(GatewayError::NotFound),
        _ => serde_json::from_str(body)
            .map_err(|error| GatewayError::UnexpectedResponse(error.to_string())),
    }
}

fn from_transport(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Network("the storefront API timed out".to_string())
    } else if error.is_connect() {
        GatewayError::Network("could not reach the storefront API".to_string())
    } else {
        GatewayError::Network(error.to_string())
    }
}
