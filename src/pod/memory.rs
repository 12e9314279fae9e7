use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use anyhow::Result;

use crate::rdf::syntax::{self, Syntax};
use crate::rdf::{Graph, Triple};

use super::{Metadata, PodError, RdfSource, ResourceClient};

enum Document {
    Turtle(Vec<u8>),
    Binary { content_type: String, body: Vec<u8> },
}

#[derive(Default)]
struct State {
    documents: BTreeMap<String, Document>,
    denied: BTreeSet<String>,
    failing_updates: Option<u16>,
    version: u64,
    reads: usize,
}

/// A pod that lives in memory. Graphs are kept as Turtle text so that every
/// read goes through the real parser.
#[derive(Default)]
pub(crate) struct MemoryPod {
    state: Mutex<State>,
}

fn document_key(identifier: &str) -> String {
    identifier
        .split_once('#')
        .map_or(identifier, |(doc, _)| doc)
        .to_string()
}

impl MemoryPod {
    pub(crate) fn deny(&self, identifier: &str) {
        self.state().denied.insert(document_key(identifier));
    }
    pub(crate) fn fail_updates(&self, status: u16) {
        self.state().failing_updates = Some(status);
    }
    pub(crate) fn reads(&self) -> usize {
        self.state().reads
    }
    pub(crate) fn binary(&self, identifier: &str) -> Option<Vec<u8>> {
        match self.state().documents.get(&document_key(identifier)) {
            Some(Document::Binary { body, .. }) => Some(body.clone()),
            _ => None,
        }
    }
    pub(crate) fn put_graph(&self, identifier: &str, graph: &Graph) -> Result<()> {
        let turtle = syntax::serialize(graph, Syntax::Turtle)?;
        self.state()
            .documents
            .insert(document_key(identifier), Document::Turtle(turtle));
        Ok(())
    }
    /// Adds a triple behind the client's back, like another app would.
    pub(crate) fn put_triple(&self, identifier: &str, triple: Triple) {
        let key = document_key(identifier);
        let mut state = self.state();
        if let Some(Document::Turtle(turtle)) = state.documents.get_mut(&key) {
            let mut graph = syntax::parse_turtle(turtle, identifier).expect("stored turtle parses");
            graph.insert(triple);
            *turtle = syntax::serialize(&graph, Syntax::Turtle).expect("graph serializes");
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("memory pod lock poisoned")
    }

    fn check_access(state: &State, key: &str) -> Result<(), PodError> {
        if state.denied.contains(key) {
            return Err(PodError::AccessDenied {
                identifier: key.to_string(),
                status: 403,
            });
        }
        Ok(())
    }

    fn store<R: RdfSource>(state: &mut State, key: String, mut resource: R) -> Result<R, PodError> {
        let turtle = syntax::serialize(resource.graph(), Syntax::Turtle)
            .map_err(|e| PodError::transport(None, e.to_string()))?;
        state.documents.insert(key, Document::Turtle(turtle));
        state.version += 1;
        let metadata = Metadata {
            etag: Some(format!("\"{}\"", state.version)),
            content_type: Some(Syntax::Turtle.media_type().to_string()),
        };
        let merged = resource.metadata().clone().merge(metadata);
        resource.set_metadata(merged);
        Ok(resource)
    }
}

impl ResourceClient for MemoryPod {
    fn create<R: RdfSource>(&self, resource: R) -> Result<R, PodError> {
        let key = document_key(resource.identifier());
        let mut state = self.state();
        Self::check_access(&state, &key)?;
        if state.documents.contains_key(&key) {
            return Err(PodError::AlreadyExists {
                identifier: resource.identifier().to_string(),
            });
        }
        Self::store(&mut state, key, resource)
    }

    fn read<R: RdfSource>(&self, identifier: &str) -> Result<R, PodError> {
        let key = document_key(identifier);
        let mut state = self.state();
        Self::check_access(&state, &key)?;
        state.reads += 1;
        match state.documents.get(&key) {
            Some(Document::Turtle(turtle)) => {
                let graph = syntax::parse_turtle(turtle, identifier).map_err(|e| {
                    PodError::InvalidDocument {
                        identifier: identifier.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                let metadata = Metadata {
                    etag: Some(format!("\"{}\"", state.version)),
                    content_type: Some(Syntax::Turtle.media_type().to_string()),
                };
                R::from_parts(identifier.to_string(), graph, metadata)
            }
            Some(Document::Binary { content_type, .. }) => Err(PodError::InvalidDocument {
                identifier: identifier.to_string(),
                reason: format!("{content_type} is not RDF"),
            }),
            None => Err(PodError::NotFound {
                identifier: identifier.to_string(),
            }),
        }
    }

    fn update<R: RdfSource>(&self, resource: R) -> Result<R, PodError> {
        let key = document_key(resource.identifier());
        let mut state = self.state();
        Self::check_access(&state, &key)?;
        if let Some(status) = state.failing_updates {
            return Err(PodError::transport(Some(status), "service unavailable"));
        }
        if !state.documents.contains_key(&key) {
            return Err(PodError::NotFound {
                identifier: resource.identifier().to_string(),
            });
        }
        Self::store(&mut state, key, resource)
    }

    fn delete(&self, identifier: &str) -> Result<(), PodError> {
        let key = document_key(identifier);
        let mut state = self.state();
        Self::check_access(&state, &key)?;
        match state.documents.remove(&key) {
            Some(_) => Ok(()),
            None => Err(PodError::NotFound {
                identifier: identifier.to_string(),
            }),
        }
    }

    fn create_binary(
        &self,
        identifier: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<String, PodError> {
        let key = document_key(identifier);
        let mut state = self.state();
        Self::check_access(&state, &key)?;
        if state.documents.contains_key(&key) {
            return Err(PodError::AlreadyExists {
                identifier: identifier.to_string(),
            });
        }
        state.documents.insert(
            key.clone(),
            Document::Binary {
                content_type: content_type.to_string(),
                body,
            },
        );
        Ok(key)
    }
}
