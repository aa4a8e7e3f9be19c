//! JSON response envelope.
//!
//! Every successful response is `{"success": true, ...}` with the payload
//! under `data`, list responses additionally carrying `count`, and the
//! catalog listing carrying `pagination`. Error responses are produced by
//! `ApiError` with the same shape and `success: false`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Pagination block for the catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    /// Total records matching the filter.
    pub total: i64,
    /// 1-based page number.
    pub page: i64,
    /// Total pages at this page size.
    pub pages: i64,
}

/// A successful response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> Envelope<T> {
    /// 200 with a data payload.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            pagination: None,
            data: Some(data),
            status: StatusCode::OK,
        }
    }

    /// 201 with a data payload.
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    /// 200 with a pagination block.
    pub fn paginated(data: T, count: usize, pagination: Pagination) -> Self {
        Self {
            count: Some(count),
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    /// 200 with a list payload and its count.
    pub fn list(data: Vec<T>) -> Self {
        Self {
            count: Some(data.len()),
            ..Self::ok(data)
        }
    }
}

impl Envelope<()> {
    /// 200 with a message and no data.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            pagination: None,
            data: None,
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json, to_value};

    #[test]
    fn test_data_envelope_shape() {
        let env = Envelope::ok(json!({"id": 1}));
        let value: Value = to_value(&env).expect("serialize");
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["data"]["id"], json!(1));
        assert!(value.get("message").is_none());
        assert!(value.get("count").is_none());
    }

    #[test]
    fn test_list_envelope_has_count() {
        let env = Envelope::list(vec![1, 2, 3]);
        let value: Value = to_value(&env).expect("serialize");
        assert_eq!(value["count"], json!(3));
        assert_eq!(value["data"], json!([1, 2, 3]));
    }

    #[test]
    fn test_message_envelope_has_no_data() {
        let env = Envelope::message("logged out");
        let value: Value = to_value(&env).expect("serialize");
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["message"], json!("logged out"));
        assert!(value.get("data").is_none());
    }
}
