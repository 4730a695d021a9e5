use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use postboard_types::api::{CreatePostRequest, Envelope, LikeRequest, LoginRequest, RegisterRequest};
use postboard_types::models::{Post, User};

use crate::error::{ClientError, DecodeError};

/// The slice of the posts API the account page depends on.
#[allow(async_fn_in_trait)]
pub trait PostApi {
    /// GET /api/posts
    async fn list_posts(&self) -> Result<Vec<Post>, ClientError>;

    /// PUT /api/posts/{id}/like
    async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<Post, ClientError>;

    /// DELETE /api/posts/{id}?userId=
    async fn delete_post(&self, post_id: &str, user_id: &str) -> Result<(), ClientError>;
}

/// HTTP client for a Postboard server.
#[derive(Clone)]
pub struct PostsClient {
    client: Client,
    base_url: String,
}

impl PostsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post, ClientError> {
        let resp = self.client.get(self.url(&format!("/api/posts/{}", post_id))).send().await?;
        decode_data(&read_body(resp).await?)
    }

    pub async fn create_post(&self, req: &CreatePostRequest) -> Result<Post, ClientError> {
        let resp = self.client.post(self.url("/api/posts")).json(req).send().await?;
        decode_data(&read_body(resp).await?)
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<User, ClientError> {
        let resp = self.client.post(self.url("/api/users/register")).json(req).send().await?;
        decode_data(&read_body(resp).await?)
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<User, ClientError> {
        let resp = self.client.post(self.url("/api/users/login")).json(req).send().await?;
        decode_data(&read_body(resp).await?)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, ClientError> {
        let resp = self.client.get(self.url(&format!("/api/users/{}", user_id))).send().await?;
        decode_data(&read_body(resp).await?)
    }
}

impl PostApi for PostsClient {
    async fn list_posts(&self) -> Result<Vec<Post>, ClientError> {
        let resp = self.client.get(self.url("/api/posts")).send().await?;
        decode_data(&read_body(resp).await?)
    }

    async fn toggle_like(&self, post_id: &str, user_id: &str) -> Result<Post, ClientError> {
        let body = LikeRequest {
            user_id: Some(user_id.to_string()),
        };
        let resp = self
            .client
            .put(self.url(&format!("/api/posts/{}/like", post_id)))
            .json(&body)
            .send()
            .await?;
        decode_data(&read_body(resp).await?)
    }

    async fn delete_post(&self, post_id: &str, user_id: &str) -> Result<(), ClientError> {
        let resp = self
            .client
            .delete(self.url(&format!("/api/posts/{}", post_id)))
            .query(&[("userId", user_id)])
            .send()
            .await?;
        decode_ack(&read_body(resp).await?)
    }
}

/// Error statuses still carry an envelope, so the body is read regardless.
async fn read_body(resp: reqwest::Response) -> Result<Vec<u8>, ClientError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    debug!("{} response, {} bytes", status, bytes.len());
    Ok(bytes.to_vec())
}

/// Decode an envelope and unwrap its `data`.
pub fn decode_data<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClientError> {
    let envelope: Envelope<T> = serde_json::from_slice(body).map_err(DecodeError::from)?;
    if !envelope.success {
        return Err(ClientError::Rejected {
            message: envelope.message,
        });
    }
    envelope.data.ok_or(ClientError::Decode(DecodeError::MissingData))
}

/// Decode an envelope whose `data`, if any, is irrelevant.
pub fn decode_ack(body: &[u8]) -> Result<(), ClientError> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_slice(body).map_err(DecodeError::from)?;
    if envelope.success {
        Ok(())
    } else {
        Err(ClientError::Rejected {
            message: envelope.message,
        })
    }
}
