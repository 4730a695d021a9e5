use serde::{Deserialize, Serialize};

// -- Envelope --

/// Wrapper carried by every API response body.
///
/// `success: false` always comes with a `message`; `data` is present on
/// successful reads and mutations that return a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

impl Envelope<()> {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

// -- Posts --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub caption: String,
    pub image: String,
}

/// Body of `PUT /api/posts/{id}/like`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Query string of `DELETE /api/posts/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `username` may hold either the username or the email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_envelope_omits_data() {
        let value = serde_json::to_value(Envelope::failure("Post not found")).unwrap();
        assert_eq!(value, json!({ "success": false, "message": "Post not found" }));
    }

    #[test]
    fn envelope_without_message_decodes() {
        let env: Envelope<Vec<u32>> =
            serde_json::from_value(json!({ "success": true, "data": [1, 2] })).unwrap();
        assert!(env.success);
        assert_eq!(env.data, Some(vec![1, 2]));
        assert_eq!(env.message, None);
    }

    #[test]
    fn like_request_uses_camel_case() {
        let body = LikeRequest {
            user_id: Some("u1".into()),
        };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({ "userId": "u1" }));
    }
}
