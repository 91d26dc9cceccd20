//! HTTP gateway talking to a daybook server.

use std::marker::PhantomData;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{Gateway, RemoteCall, USER_HEADER, require_user};
use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Turn a non-success response into a `Status` error.
pub(crate) async fn check_status(resp: Response) -> CoreResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error)
        .unwrap_or(text);

    Err(CoreError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Check status and content type, then decode the JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(resp: Response) -> CoreResult<T> {
    let resp = check_status(resp).await?;

    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if !content_type.contains("application/json") {
        let body = resp.text().await.unwrap_or_default();
        tracing::error!(%content_type, %body, "server returned non-JSON response");
        return Err(CoreError::UnexpectedContentType(content_type));
    }

    Ok(resp.json().await?)
}

/// `Gateway` implementation for the daybook REST API.
pub struct HttpGateway<E> {
    http: reqwest::Client,
    base_url: String,
    _kind: PhantomData<fn() -> E>,
}

impl<E: Entity> HttpGateway<E> {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        HttpGateway {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
            _kind: PhantomData,
        }
    }

    fn request(&self, method: Method, path: &str, user_id: &str) -> CoreResult<RequestBuilder> {
        require_user(user_id)?;
        let url = format!("{}/{}{}", self.base_url, E::KIND.collection(), path);
        Ok(self.http.request(method, url).header(USER_HEADER, user_id))
    }
}

impl<E: Entity> Gateway<E> for HttpGateway<E> {
    /// GET /{collection}
    fn list(&self, user_id: &str) -> CoreResult<RemoteCall<Vec<E>>> {
        let request = self.request(Method::GET, "", user_id)?;
        Ok(Box::pin(async move { read_json(request.send().await?).await }))
    }

    /// POST /{collection}
    fn create(&self, user_id: &str, entity: &E) -> CoreResult<RemoteCall<E>> {
        let request = self.request(Method::POST, "", user_id)?.json(entity);
        Ok(Box::pin(async move { read_json(request.send().await?).await }))
    }

    /// POST /{collection}/bulk
    fn create_multiple(&self, user_id: &str, entities: &[E]) -> CoreResult<RemoteCall<Vec<E>>> {
        let mut body = serde_json::Map::new();
        body.insert(
            E::KIND.collection().to_string(),
            serde_json::to_value(entities)?,
        );
        let request = self.request(Method::POST, "/bulk", user_id)?.json(&body);
        Ok(Box::pin(async move { read_json(request.send().await?).await }))
    }

    /// PUT /{collection}/{id}
    fn update(&self, user_id: &str, id: EntityId, entity: &E) -> CoreResult<RemoteCall<E>> {
        let request = self
            .request(Method::PUT, &format!("/{id}"), user_id)?
            .json(entity);
        Ok(Box::pin(async move { read_json(request.send().await?).await }))
    }

    /// DELETE /{collection}/{id}
    fn delete(&self, user_id: &str, id: EntityId) -> CoreResult<RemoteCall<()>> {
        let request = self.request(Method::DELETE, &format!("/{id}"), user_id)?;
        Ok(Box::pin(async move {
            check_status(request.send().await?).await?;
            Ok(())
        }))
    }

    /// DELETE /{collection}/bulk/multiple
    fn delete_multiple(&self, user_id: &str, ids: &[EntityId]) -> CoreResult<RemoteCall<()>> {
        let request = self
            .request(Method::DELETE, "/bulk/multiple", user_id)?
            .json(&json!({ "ids": ids }));
        Ok(Box::pin(async move {
            check_status(request.send().await?).await?;
            Ok(())
        }))
    }
}
