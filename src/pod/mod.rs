//! Client side of a Solid Pod: resources addressed by IRI.

mod error;
#[cfg(test)]
mod memory;
mod solid;

pub(crate) mod iri;

pub(crate) use self::error::PodError;
#[cfg(test)]
pub(crate) use self::memory::MemoryPod;
pub(crate) use self::solid::SolidClient;

use crate::rdf::Graph;

/// What the server told us about a resource, besides its content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Metadata {
    pub(crate) etag: Option<String>,
    pub(crate) content_type: Option<String>,
}

impl Metadata {
    /// Values from `other` win where present.
    pub(crate) fn merge(self, other: Metadata) -> Metadata {
        Metadata {
            etag: other.etag.or(self.etag),
            content_type: other.content_type.or(self.content_type),
        }
    }
}

/// A resource whose content is an RDF graph.
pub(crate) trait RdfSource: Sized {
    fn identifier(&self) -> &str;
    fn graph(&self) -> &Graph;
    fn metadata(&self) -> &Metadata;
    fn set_metadata(&mut self, metadata: Metadata);
    fn from_parts(identifier: String, graph: Graph, metadata: Metadata) -> Result<Self, PodError>;
}

/// CRUD against a remote resource store.
///
/// Calls block until the store answered; failures are translated into
/// [`PodError`] and never retried.
pub(crate) trait ResourceClient {
    /// Stores a new resource; fails with [`PodError::AlreadyExists`] if one
    /// is already there.
    fn create<R: RdfSource>(&self, resource: R) -> Result<R, PodError>;
    fn read<R: RdfSource>(&self, identifier: &str) -> Result<R, PodError>;
    /// Replaces the content of an existing resource.
    fn update<R: RdfSource>(&self, resource: R) -> Result<R, PodError>;
    fn delete(&self, identifier: &str) -> Result<(), PodError>;
    /// Stores an opaque file; returns the identifier it was stored at.
    fn create_binary(
        &self,
        identifier: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<String, PodError>;
}
