use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tokio::runtime::Handle;
use tracing::debug;

use crate::config::PodConfig;
use crate::rdf::syntax::{self, Syntax};

use super::{Metadata, PodError, RdfSource, ResourceClient};

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
const TEXT_TURTLE: &str = "text/turtle";
const ANY: &str = "*";

/// Talks to a Solid server over HTTP.
///
/// The calls block. They must run on a blocking thread of the Tokio runtime
/// whose handle the client was built with, e.g. under `spawn_blocking`.
#[derive(Clone)]
pub(crate) struct SolidClient {
    client: Client,
    runtime: Handle,
    access_token: Option<SecretString>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl SolidClient {
    pub(crate) fn new(config: &PodConfig, runtime: Handle) -> Result<SolidClient, PodError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_deref().unwrap_or(APP_USER_AGENT))
            .gzip(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PodError::transport(None, e.to_string()))?;
        Ok(SolidClient {
            client,
            runtime,
            access_token: config.access_token.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    fn send(
        &self,
        operation: Operation,
        identifier: &str,
        request: RequestBuilder,
    ) -> Result<(Metadata, Vec<u8>), PodError> {
        let request = self.authorize(request);
        self.runtime.block_on(async {
            let response = request
                .send()
                .await
                .map_err(|e| PodError::transport(e.status().map(|s| s.as_u16()), e.to_string()))?;
            let status = response.status();
            debug!(target: "pod", ?operation, %identifier, %status, "pod responded");
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(failure(operation, identifier, status, text));
            }
            let metadata = metadata(&response);
            let body = response
                .bytes()
                .await
                .map_err(|e| PodError::transport(Some(status.as_u16()), e.to_string()))?;
            Ok::<_, PodError>((metadata, body.to_vec()))
        })
    }

    fn put_graph<R: RdfSource>(
        &self,
        operation: Operation,
        mut resource: R,
    ) -> Result<R, PodError> {
        let body = syntax::serialize(resource.graph(), Syntax::Turtle).map_err(|e| {
            PodError::InvalidDocument {
                identifier: resource.identifier().to_string(),
                reason: e.to_string(),
            }
        })?;
        let precondition = match operation {
            Operation::Create => header::IF_NONE_MATCH,
            _ => header::IF_MATCH,
        };
        let request = self
            .client
            .put(resource.identifier())
            .header(header::CONTENT_TYPE, TEXT_TURTLE)
            .header(precondition, ANY)
            .body(body);
        let (metadata, _) = self.send(operation, resource.identifier(), request)?;
        let merged = resource.metadata().clone().merge(metadata);
        resource.set_metadata(merged);
        Ok(resource)
    }
}

impl ResourceClient for SolidClient {
    fn create<R: RdfSource>(&self, resource: R) -> Result<R, PodError> {
        self.put_graph(Operation::Create, resource)
    }

    fn read<R: RdfSource>(&self, identifier: &str) -> Result<R, PodError> {
        let request = self
            .client
            .get(identifier)
            .header(header::ACCEPT, TEXT_TURTLE);
        let (metadata, body) = self.send(Operation::Read, identifier, request)?;
        let graph =
            syntax::parse_turtle(&body, identifier).map_err(|e| PodError::InvalidDocument {
                identifier: identifier.to_string(),
                reason: e.to_string(),
            })?;
        R::from_parts(identifier.to_string(), graph, metadata)
    }

    fn update<R: RdfSource>(&self, resource: R) -> Result<R, PodError> {
        self.put_graph(Operation::Update, resource)
    }

    fn delete(&self, identifier: &str) -> Result<(), PodError> {
        let request = self.client.delete(identifier);
        self.send(Operation::Delete, identifier, request)?;
        Ok(())
    }

    fn create_binary(
        &self,
        identifier: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<String, PodError> {
        let request = self
            .client
            .put(identifier)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::IF_NONE_MATCH, ANY)
            .body(body);
        self.send(Operation::Create, identifier, request)?;
        Ok(identifier.to_string())
    }
}

fn metadata(response: &Response) -> Metadata {
    let header_str = |headers: &HeaderMap, name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Metadata {
        etag: header_str(response.headers(), header::ETAG),
        content_type: header_str(response.headers(), header::CONTENT_TYPE),
    }
}

fn failure(operation: Operation, identifier: &str, status: StatusCode, text: String) -> PodError {
    let identifier = identifier.to_string();
    match (status.as_u16(), operation) {
        (401 | 403, _) => PodError::AccessDenied {
            identifier,
            status: status.as_u16(),
        },
        (404 | 410, _) => PodError::NotFound { identifier },
        (409 | 412, Operation::Create) => PodError::AlreadyExists { identifier },
        // If-Match: * only fails when there is nothing to replace
        (412, Operation::Update) => PodError::NotFound { identifier },
        _ => PodError::transport(Some(status.as_u16()), format!("{status} {text}")),
    }
}
