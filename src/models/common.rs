use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message),
            error: None,
        }
    }

    pub fn error(error: String) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error),
        }
    }
}

impl ApiResponse<()> {
    /// Bare `{ "success": true }`.
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            message: None,
            error: None,
        }
    }
}

/// The authenticated caller, as vouched for by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes_skip_empty_fields() {
        let ok = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert_eq!(ok, serde_json::json!({ "success": true }));

        let err = serde_json::to_value(ApiResponse::<()>::error("Not found".to_string())).unwrap();
        assert_eq!(err, serde_json::json!({ "success": false, "error": "Not found" }));

        let data = serde_json::to_value(ApiResponse::success_with_message(3, "created".to_string())).unwrap();
        assert_eq!(data["data"], 3);
        assert_eq!(data["message"], "created");
    }
}
