//! Response envelope for API handlers.
//!
//! Every successful response body is `{ "data": ... }`. Handlers return
//! [`DataResponse`] directly (it implements [`IntoResponse`]) so the
//! envelope cannot be forgotten or hand-rolled per endpoint.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for DataResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wraps_payload_under_data() {
        let body = serde_json::to_value(DataResponse::new(vec![1, 2, 3])).unwrap();
        assert_eq!(body, serde_json::json!({ "data": [1, 2, 3] }));
    }
}
