//! Remote `@context` document loading

use super::{ContextError, ContextResult};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Loads the JSON document behind a remote context IRI
#[async_trait]
pub trait ContextLoader: Send + Sync {
    /// Fetch the document for `iri`
    async fn load(&self, iri: &str) -> ContextResult<Value>;
}

/// Loader that refuses every remote context
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRemoteContexts;

#[async_trait]
impl ContextLoader for NoRemoteContexts {
    async fn load(&self, iri: &str) -> ContextResult<Value> {
        Err(ContextError::RemoteContextsDisabled(iri.to_string()))
    }
}

/// Loader serving preloaded documents from memory
#[derive(Debug, Clone, Default)]
pub struct StaticContextLoader {
    documents: HashMap<String, Value>,
}

impl StaticContextLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document under an IRI
    pub fn with_document(mut self, iri: impl Into<String>, document: Value) -> Self {
        self.documents.insert(iri.into(), document);
        self
    }
}

#[async_trait]
impl ContextLoader for StaticContextLoader {
    async fn load(&self, iri: &str) -> ContextResult<Value> {
        self.documents
            .get(iri)
            .cloned()
            .ok_or_else(|| ContextError::LoadingFailed {
                iri: iri.to_string(),
                message: "document not registered".to_string(),
            })
    }
}

/// Loader fetching context documents over HTTP(S), caching each IRI
pub struct HttpContextLoader {
    client: reqwest::Client,
    cache: RwLock<HashMap<String, Value>>,
}

impl HttpContextLoader {
    /// Create a loader with a default client
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a loader with a preconfigured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the cache so `iri` is served without fetching
    pub fn with_document(mut self, iri: impl Into<String>, document: Value) -> Self {
        self.cache.get_mut().insert(iri.into(), document);
        self
    }

    async fn fetch(&self, iri: &str) -> Result<Value, reqwest::Error> {
        self.client
            .get(iri)
            .header(ACCEPT, "application/ld+json, application/json")
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}

impl Default for HttpContextLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextLoader for HttpContextLoader {
    async fn load(&self, iri: &str) -> ContextResult<Value> {
        if let Some(document) = self.cache.read().await.get(iri) {
            debug!("Using cached context document for {}", iri);
            return Ok(document.clone());
        }

        info!("Fetching remote context {}", iri);
        let document = self
            .fetch(iri)
            .await
            .map_err(|e| ContextError::LoadingFailed {
                iri: iri.to_string(),
                message: e.to_string(),
            })?;

        self.cache
            .write()
            .await
            .insert(iri.to_string(), document.clone());
        Ok(document)
    }
}
