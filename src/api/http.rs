use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{KanbanApi, MoveRequest, MoveResponse};
use crate::board::models::{
    ColumnStatus, GroupId, GroupPatch, ItemRef, Kanban, KanbanId, NewGroup, Product, ProductGroup,
    ProductId, ProductPatch,
};
use crate::errors::ApiError;

const USER_AGENT: &str = concat!("stockboard/", env!("CARGO_PKG_VERSION"));
const VALIDATION_REQUIRED_CODE: &str = "VALIDATION_REQUIRED";

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<ValidationDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationDetails {
    product_id: ProductId,
    column_status: ColumnStatus,
}

/// `KanbanApi` over the backend's JSON REST endpoints.
#[derive(Clone)]
pub struct HttpKanbanApi {
    client: reqwest::Client,
    base_url: String,
    base: Url,
    token: Option<String>,
    timeout: Duration,
}

impl HttpKanbanApi {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::Transport(format!("Invalid base URL: {}", base_url)))?;
        Ok(Self {
            client,
            base_url,
            base,
            token,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus `segments`, each percent-encoded as one path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.url(segments);
        debug!(%method, %url, "api request");
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json")
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string());
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(error_from_response(resp).await)
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send(builder).await.map(|_| ())
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

async fn error_from_response(resp: Response) -> ApiError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&text).ok();
    classify_error(status, body, &text)
}

fn classify_error(status: StatusCode, body: Option<ErrorBody>, raw: &str) -> ApiError {
    let Some(body) = body else {
        let message = if raw.trim().is_empty() {
            status.canonical_reason().unwrap_or("unknown error").to_string()
        } else {
            raw.trim().to_string()
        };
        return ApiError::Status {
            status: status.as_u16(),
            message,
        };
    };

    let flagged = body.code.as_deref() == Some(VALIDATION_REQUIRED_CODE)
        || status == StatusCode::UNPROCESSABLE_ENTITY;
    if flagged && let Some(details) = body.details {
        return ApiError::ValidationRequired {
            product_id: details.product_id,
            column_status: details.column_status,
        };
    }

    ApiError::Status {
        status: status.as_u16(),
        message: body
            .message
            .or(body.error)
            .unwrap_or_else(|| status.to_string()),
    }
}

#[async_trait]
impl KanbanApi for HttpKanbanApi {
    async fn load_kanban(&self, kanban_id: &KanbanId) -> Result<Kanban, ApiError> {
        self.send_json(self.request(Method::GET, &["api", "kanbans", kanban_id.as_str()]))
            .await
    }

    async fn move_item(&self, request: &MoveRequest) -> Result<MoveResponse, ApiError> {
        let path = ["api", "products", request.product_id.as_str(), "move"];
        self.send_json(self.request(Method::PATCH, &path).json(request))
            .await
    }

    async fn reorder_column(
        &self,
        kanban_id: &KanbanId,
        column: ColumnStatus,
        items: &[ItemRef],
    ) -> Result<(), ApiError> {
        let path = ["api", "kanbans", kanban_id.as_str(), "columns", column.as_str(), "order"];
        let body = serde_json::json!({ "items": items });
        self.send_empty(self.request(Method::PUT, &path).json(&body))
            .await
    }

    async fn transfer_item(
        &self,
        product_id: &ProductId,
        target_kanban_id: &KanbanId,
    ) -> Result<(), ApiError> {
        let path = ["api", "products", product_id.as_str(), "transfer"];
        let body = serde_json::json!({ "targetKanbanId": target_kanban_id });
        self.send_empty(self.request(Method::POST, &path).json(&body))
            .await
    }

    async fn bulk_move(
        &self,
        product_ids: &[ProductId],
        column: ColumnStatus,
        location_id: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut body = serde_json::json!({
            "productIds": product_ids,
            "columnStatus": column,
        });
        if let Some(location) = location_id {
            body["locationId"] = serde_json::Value::from(location);
        }
        self.send_empty(
            self.request(Method::POST, &["api", "products", "bulk-move"])
                .json(&body),
        )
        .await
    }

    async fn update_item(
        &self,
        product_id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let path = ["api", "products", product_id.as_str()];
        self.send_json(self.request(Method::PATCH, &path).json(patch))
            .await
    }

    async fn delete_item(&self, product_id: &ProductId) -> Result<(), ApiError> {
        let path = ["api", "products", product_id.as_str()];
        self.send_empty(self.request(Method::DELETE, &path)).await
    }

    async fn create_group(
        &self,
        kanban_id: &KanbanId,
        group: &NewGroup,
    ) -> Result<ProductGroup, ApiError> {
        let path = ["api", "kanbans", kanban_id.as_str(), "groups"];
        self.send_json(self.request(Method::POST, &path).json(group))
            .await
    }

    async fn update_group(&self, group_id: &GroupId, patch: &GroupPatch) -> Result<(), ApiError> {
        let path = ["api", "groups", group_id.as_str()];
        self.send_empty(self.request(Method::PATCH, &path).json(patch))
            .await
    }

    async fn delete_group(&self, group_id: &GroupId) -> Result<(), ApiError> {
        let path = ["api", "groups", group_id.as_str()];
        self.send_empty(self.request(Method::DELETE, &path)).await
    }
}
