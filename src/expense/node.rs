use std::collections::BTreeSet;
use std::ops::{Deref, DerefMut};

use crate::pod::PodError;
use crate::rdf::codec::{MalformedTerm, TermCodec};
use crate::rdf::{Graph, Term};

use super::schema::{AttributeDef, Cardinality, Functional, MultiValued};

/// A typed view of the triples of one subject.
///
/// `G` is `&Graph` for reading and `&mut Graph` for writing; the view never
/// owns the graph it points into.
pub(crate) struct Node<'s, G> {
    subject: &'s Term,
    graph: G,
}

impl<'s, G> Node<'s, G>
where
    G: Deref<Target = Graph>,
{
    pub(crate) fn new(subject: &'s Term, graph: G) -> Self {
        Node { subject, graph }
    }

    pub(crate) fn get<C: TermCodec>(
        &self,
        attribute: &Functional<C>,
    ) -> Result<Option<C::Native>, PodError> {
        debug_assert_eq!(attribute.def.cardinality, Cardinality::Functional);
        self.graph
            .get_functional(self.subject, attribute.def.predicate)
            .map(|term| C::decode(term).map_err(|e| malformed(&attribute.def, e)))
            .transpose()
    }

    pub(crate) fn objects<C: TermCodec>(
        &self,
        attribute: &MultiValued<C>,
    ) -> Result<BTreeSet<C::Native>, PodError> {
        debug_assert_eq!(attribute.def.cardinality, Cardinality::MultiValued);
        self.graph
            .get_all(self.subject, attribute.def.predicate)
            .map(|term| C::decode(term).map_err(|e| malformed(&attribute.def, e)))
            .collect()
    }
}

impl<G> Node<'_, G>
where
    G: DerefMut<Target = Graph>,
{
    /// Overwrites the attribute; `None` deletes it.
    pub(crate) fn set<C: TermCodec>(&mut self, attribute: &Functional<C>, value: Option<&C::Native>) {
        self.graph
            .set_functional(self.subject, attribute.def.predicate, value.map(C::encode));
    }

    pub(crate) fn add<C: TermCodec>(&mut self, attribute: &MultiValued<C>, value: &C::Native) {
        self.graph
            .add(self.subject, attribute.def.predicate, C::encode(value));
    }

    pub(crate) fn remove<C: TermCodec>(
        &mut self,
        attribute: &MultiValued<C>,
        value: &C::Native,
    ) -> bool {
        self.graph
            .remove(self.subject, attribute.def.predicate, &C::encode(value))
    }
}

fn malformed(def: &AttributeDef, source: MalformedTerm) -> PodError {
    PodError::MalformedTerm {
        attribute: def.name,
        predicate: def.predicate,
        source,
    }
}
