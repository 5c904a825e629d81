use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Success body wrapped under a single resource key, e.g. `{"company": {...}}`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub key: &'static str,
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn ok(key: &'static str, data: T) -> Self {
        Self {
            key,
            data,
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created
    pub fn created(key: &'static str, data: T) -> Self {
        Self {
            key,
            data,
            status_code: StatusCode::CREATED,
        }
    }
}

impl ApiResponse<String> {
    /// `{"message": "..."}`
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok("message", message.into())
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": true,
                        "message": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = Map::new();
        envelope.insert(self.key.to_string(), data_value);

        (self.status_code, Json(Value::Object(envelope))).into_response()
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn wraps_data_under_key() {
        let response = ApiResponse::created("token", "abc").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_of(response).await, json!({ "token": "abc" }));
    }

    #[tokio::test]
    async fn message_response() {
        let response = ApiResponse::message("Company deleted").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, json!({ "message": "Company deleted" }));
    }
}
