//! HTTP client for the one-shot query and mutation operations.

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, info};

use tableside_shared::constants::API_KEY_HEADER;
use tableside_shared::{Restaurant, TransportError};

use crate::config::ApiConfig;
use crate::graphql::{
    CreateData, GraphQlRequest, GraphQlResponse, ListData, CREATE_RESTAURANT, LIST_RESTAURANTS,
};

/// Client for the hosted GraphQL API.
///
/// Cheap to clone; all clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Build a client from the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        if let Some(ref key) = config.api_key {
            let value = HeaderValue::from_str(key).map_err(|e| {
                TransportError::Config(format!("API key is not a valid header value: {e}"))
            })?;
            headers.insert(API_KEY_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Fetch the full restaurant list.
    pub async fn list_restaurants(&self) -> Result<Vec<Restaurant>, TransportError> {
        let request = GraphQlRequest::new(LIST_RESTAURANTS);
        let response: GraphQlResponse<ListData> = self.post(&request).await?;
        let items = response.into_data()?.list_restaurants.items;
        debug!(count = items.len(), "Fetched restaurant list");
        Ok(items)
    }

    /// Create one restaurant record.
    ///
    /// The caller has already applied the record locally; the record echoed
    /// back by the backend is discarded.
    pub async fn create_restaurant(&self, restaurant: &Restaurant) -> Result<(), TransportError> {
        let variables = serde_json::json!({ "input": restaurant });
        let request = GraphQlRequest::with_variables(CREATE_RESTAURANT, variables);
        let response: GraphQlResponse<CreateData> = self.post(&request).await?;
        response.into_data()?;
        info!(name = %restaurant.name, "Restaurant created");
        Ok(())
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Issue one GraphQL POST and decode the envelope.
    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        request: &GraphQlRequest<'_>,
    ) -> Result<GraphQlResponse<T>, TransportError> {
        let response = self
            .http
            .post(&self.config.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http(format!("status {status}")));
        }

        response
            .json::<GraphQlResponse<T>>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap as AxumHeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tableside_shared::ClientId;

    async fn graphql_handler(headers: AxumHeaderMap, Json(body): Json<Value>) -> Json<Value> {
        if let Some(key) = headers.get("x-api-key") {
            if key != "sekrit" {
                return Json(json!({ "errors": [{ "message": "bad api key" }] }));
            }
        }

        let query = body["query"].as_str().unwrap_or_default();
        if query.contains("query ListRestaurants") {
            Json(json!({
                "data": { "listRestaurants": { "items": [
                    { "name": "Tacos", "description": "d", "city": "LA", "clientId": "X" }
                ]}}
            }))
        } else if query.contains("mutation CreateRestaurant") {
            Json(json!({ "data": { "createRestaurant": body["variables"]["input"] } }))
        } else {
            Json(json!({ "errors": [{ "message": "unknown operation" }] }))
        }
    }

    async fn spawn_server() -> String {
        let app = Router::new().route("/graphql", post(graphql_handler));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/graphql")
    }

    fn client_for(endpoint: String) -> ApiClient {
        ApiClient::new(ApiConfig {
            endpoint,
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_restaurants() {
        let client = client_for(spawn_server().await);
        let items = client.list_restaurants().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Tacos");
        assert_eq!(items[0].client_id, ClientId("X".to_string()));
    }

    #[tokio::test]
    async fn test_create_restaurant() {
        let client = client_for(spawn_server().await);
        let record = Restaurant {
            name: "Pizza".into(),
            description: "wood fired".into(),
            city: "Naples".into(),
            client_id: ClientId::generate(),
        };
        client.create_restaurant(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_api_key_header_is_sent() {
        let endpoint = spawn_server().await;
        let client = ApiClient::new(ApiConfig {
            endpoint,
            api_key: Some("sekrit".to_string()),
            ..ApiConfig::default()
        })
        .unwrap();
        client.list_restaurants().await.unwrap();
    }

    #[tokio::test]
    async fn test_graphql_errors_surface_as_api_error() {
        let endpoint = spawn_server().await;
        let client = ApiClient::new(ApiConfig {
            endpoint,
            api_key: Some("wrong".to_string()),
            ..ApiConfig::default()
        })
        .unwrap();
        match client.list_restaurants().await {
            Err(TransportError::Api(msg)) => assert_eq!(msg, "bad api key"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let client = client_for("http://127.0.0.1:1/graphql".to_string());
        assert!(matches!(
            client.list_restaurants().await,
            Err(TransportError::Http(_))
        ));
    }
}
