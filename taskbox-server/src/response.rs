use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Every envelope response carries a permissive CORS origin.
type EnvelopeHeaders = [(HeaderName, &'static str); 1];
const ENVELOPE_HEADERS: EnvelopeHeaders = [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")];

/// Response envelope for the todo routes: HTTP status plus
/// `{"message": …, "data": …}`.
///
/// `data` is omitted from the body when it is JSON null. Authorization
/// failures never use this envelope; they answer with the bare
/// `{"error": "Unauthorized"}` shape instead.
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    message: String,
    data: serde_json::Value,
}

#[derive(Serialize)]
struct Envelope {
    message: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    data: serde_json::Value,
}

impl ApiResponse {
    /// A 200 envelope.
    pub fn ok(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self::status(StatusCode::OK, message, data)
    }

    /// An envelope with an explicit status code.
    pub fn status(
        status: StatusCode,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let body = Envelope {
            message: self.message,
            data: self.data,
        };
        (self.status, ENVELOPE_HEADERS, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::Envelope;

    #[test]
    fn null_data_is_omitted_from_the_body() {
        let body = Envelope {
            message: "Todo deleted successfully".into(),
            data: serde_json::Value::Null,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"message":"Todo deleted successfully"}"#
        );
    }

    #[test]
    fn empty_object_data_is_kept() {
        let body = Envelope {
            message: "Todo not found".into(),
            data: serde_json::json!({}),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"message":"Todo not found","data":{}}"#
        );
    }
}
