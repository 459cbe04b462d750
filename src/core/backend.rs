// REST client for the price-tracking backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::error::BackendError;
use super::model::{NewProduct, PriceHistoryEntry, Product, ProductId};

/// Operations the client needs from the backend
#[async_trait]
pub trait ProductBackend: Send + Sync + 'static {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// Current snapshot, without triggering a price fetch
    async fn get_product(&self, id: ProductId) -> Result<Product, BackendError>;

    /// Scrape the product page now and return the updated snapshot
    async fn check_price(&self, id: ProductId) -> Result<Product, BackendError>;

    async fn create_product(&self, product: &NewProduct) -> Result<Product, BackendError>;

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError>;

    async fn price_history(&self, id: ProductId) -> Result<Vec<PriceHistoryEntry>, BackendError>;
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Turn a non-2xx response into an error carrying the body text
    async fn ensure_success(response: Response) -> Result<Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ProductBackend for HttpBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let response = self.client.get(self.endpoint("products")).send().await?;
        Self::read_json(response).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, BackendError> {
        let response = self
            .client
            .get(self.endpoint(&format!("products/{id}")))
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn check_price(&self, id: ProductId) -> Result<Product, BackendError> {
        let response = self
            .client
            .post(self.endpoint(&format!("products/{id}/check")))
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, BackendError> {
        let response = self
            .client
            .post(self.endpoint("products"))
            .json(product)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("products/{id}")))
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let text = response.text().await.unwrap_or_default();
        log::debug!("Delete response for product {}: {}", id, text);
        Ok(())
    }

    async fn price_history(&self, id: ProductId) -> Result<Vec<PriceHistoryEntry>, BackendError> {
        let response = self
            .client
            .get(self.endpoint(&format!("products/{id}/history")))
            .send()
            .await?;
        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_paths() {
        let backend = HttpBackend::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8080");
        assert_eq!(
            backend.endpoint("products/4/check"),
            "http://localhost:8080/api/products/4/check"
        );
        assert_eq!(
            backend.endpoint("/products"),
            "http://localhost:8080/api/products"
        );
    }

    fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_get_product_decodes_camel_case() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/products/7");
                then.status(200).json_body(json!({
                    "id": 7,
                    "name": "Desk Lamp",
                    "url": "https://shop.example/p/7",
                    "imageUrl": "https://shop.example/img/7.png",
                    "currentPrice": 1499.0,
                    "targetPrice": 1200.0,
                    "isActive": true,
                    "lastChecked": "2024-05-01T10:00:00"
                }));
            })
            .await;

        let product = backend_for(&server).get_product(7).await.unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.name, "Desk Lamp");
        assert_eq!(product.image_url.as_deref(), Some("https://shop.example/img/7.png"));
        assert_eq!(product.current_price, Some(1499.0));
        assert_eq!(product.target_price, 1200.0);
        assert_eq!(product.is_active, Some(true));
        assert!(product.last_checked.is_some());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_check_price_posts_and_surfaces_error_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/products/4/check");
                then.status(500).body("scrape failed");
            })
            .await;

        match backend_for(&server).check_price(4).await {
            Err(BackendError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "scrape failed");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        // Only a POST to /check matches, so a GET would leave this at zero hits
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/products");
                then.status(200)
                    .header("content-type", "application/json")
                    .body("[{\"id\": \"not a number\"");
            })
            .await;

        match backend_for(&server).list_products().await {
            Err(BackendError::Decode(_)) => {}
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_and_delete_product() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/products")
                    .json_body_partial(r#"{"name": "Kettle", "targetPrice": 900.0, "isActive": true}"#);
                then.status(200).json_body(json!({
                    "id": 9,
                    "name": "Kettle",
                    "url": "https://shop.example/p/9",
                    "currentPrice": null,
                    "targetPrice": 900.0
                }));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/api/products/9");
                then.status(200);
            })
            .await;

        let backend = backend_for(&server);
        let new = NewProduct::new("Kettle", "https://shop.example/p/9", 900.0);
        let created = backend.create_product(&new).await.unwrap();
        assert_eq!(created.id, 9);
        assert_eq!(created.current_price, None);
        backend.delete_product(9).await.unwrap();

        create.assert_async().await;
        delete.assert_async().await;
    }
}
