//! Hosted document store reached over HTTP.
//!
//! Documents are addressed as `{base}/collections/{collection}/documents/{id}` and
//! indexes as `{base}/indexes/{index}/match`. Every request carries the access
//! credential as a bearer token.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::config::StoreConfig;
use crate::db::models::{Document, DocumentRef, Page, PaginationOptions};
use crate::db::repository::*;

/// Repository backed by a remote document store.
#[derive(Clone)]
pub struct RemoteRepository {
    client: Client,
    base_url: Url,
    secret: String,
}

#[derive(Serialize)]
struct DataBody<'a> {
    data: &'a Map<String, Value>,
}

#[derive(Serialize)]
struct MatchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    term: Option<&'a Value>,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<&'a str>,
}

impl RemoteRepository {
    /// Create a repository from a store configuration.
    ///
    /// # Errors
    /// Returns a configuration error if no store URL is configured, the URL cannot
    /// be parsed, or the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> RepositoryResult<Self> {
        let raw_url = config.url.as_deref().ok_or_else(|| {
            RepositoryError::configuration("Remote repository requires a store URL")
        })?;
        let base_url = Url::parse(raw_url).map_err(|e| {
            RepositoryError::configuration(format!("Invalid store URL '{}': {}", raw_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RepositoryError::configuration(format!(
                "Store URL '{}' cannot be used as a base URL",
                raw_url
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("posts-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                RepositoryError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            secret: config.secret.clone(),
        })
    }

    /// Base URL every request is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so path segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn document_url(&self, reference: &DocumentRef) -> Url {
        self.endpoint(&[
            "collections",
            &reference.collection,
            "documents",
            &reference.id,
        ])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("Store request: {} {}", method, url);
        self.client
            .request(method, url)
            .bearer_auth(&self.secret)
    }

    /// Send a request and map non-success statuses onto repository errors.
    async fn send(&self, request: RequestBuilder, context: ErrorContext) -> RepositoryResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| RepositoryError::from(e).with_operation(operation_of(&context)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let context = if body.is_empty() {
            context
        } else {
            context.with_details(body)
        };
        let message = format!("Store responded with {}", status);

        Err(match status {
            StatusCode::NOT_FOUND => RepositoryError::not_found_with_context(message, context),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RepositoryError::authorization_with_context(message, context)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                RepositoryError::validation_with_context(message, context)
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                RepositoryError::timeout_with_context(message, context)
            }
            s if s.is_server_error() => {
                RepositoryError::query_with_context(message, context.retryable())
            }
            _ => RepositoryError::query_with_context(message, context),
        })
    }

    async fn document(&self, request: RequestBuilder, context: ErrorContext) -> RepositoryResult<Document> {
        let operation = operation_of(&context);
        let response = self.send(request, context).await?;
        response
            .json::<Document>()
            .await
            .map_err(|e| RepositoryError::from(e).with_operation(operation))
    }

    fn document_context(operation: &str, reference: &DocumentRef) -> ErrorContext {
        ErrorContext::new(operation)
            .with_entity(&reference.collection)
            .with_entity_id(&reference.id)
    }
}

fn operation_of(context: &ErrorContext) -> String {
    context.operation.clone().unwrap_or_default()
}

#[async_trait]
impl DocumentRepository for RemoteRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let request = self.request(Method::GET, self.endpoint(&["health"]));
        let response = request
            .send()
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("health_check"))?;
        Ok(response.status().is_success())
    }

    async fn create(&self, collection: &str, data: Map<String, Value>) -> RepositoryResult<Document> {
        let url = self.endpoint(&["collections", collection, "documents"]);
        let request = self.request(Method::POST, url).json(&DataBody { data: &data });
        self.document(request, ErrorContext::new("create").with_entity(collection))
            .await
    }

    async fn get(&self, reference: &DocumentRef) -> RepositoryResult<Document> {
        let request = self.request(Method::GET, self.document_url(reference));
        self.document(request, Self::document_context("get", reference))
            .await
    }

    async fn update(
        &self,
        reference: &DocumentRef,
        data: Map<String, Value>,
    ) -> RepositoryResult<Document> {
        let request = self
            .request(Method::PATCH, self.document_url(reference))
            .json(&DataBody { data: &data });
        self.document(request, Self::document_context("update", reference))
            .await
    }

    async fn replace(
        &self,
        reference: &DocumentRef,
        data: Map<String, Value>,
    ) -> RepositoryResult<Document> {
        let request = self
            .request(Method::PUT, self.document_url(reference))
            .json(&DataBody { data: &data });
        self.document(request, Self::document_context("replace", reference))
            .await
    }

    async fn delete(&self, reference: &DocumentRef) -> RepositoryResult<Document> {
        let request = self.request(Method::DELETE, self.document_url(reference));
        self.document(request, Self::document_context("delete", reference))
            .await
    }
}

#[async_trait]
impl IndexRepository for RemoteRepository {
    async fn match_index(
        &self,
        index: &str,
        term: Option<&Value>,
        page: &PaginationOptions,
    ) -> RepositoryResult<Page<DocumentRef>> {
        let body = MatchBody {
            term,
            size: page.page_size(),
            after: page.after.as_deref(),
            before: page.before.as_deref(),
        };
        let request = self
            .request(Method::POST, self.endpoint(&["indexes", index, "match"]))
            .json(&body);

        let response = self
            .send(request, ErrorContext::new("match_index").with_entity(index))
            .await?;
        response
            .json::<Page<DocumentRef>>()
            .await
            .map_err(|e| RepositoryError::from(e).with_operation("match_index"))
    }
}
