use std::collections::BTreeMap;

use super::{Term, Triple};

type Objects = Vec<Term>;
type Predicates = BTreeMap<String, Objects>;

/// An in-memory set of triples indexed by subject, then predicate.
///
/// Objects for one (subject, predicate) pair keep their insertion order, which
/// makes [`Graph::get_functional`] deterministic when a writer outside of this
/// crate left more than one value behind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Graph {
    subjects: BTreeMap<Term, Predicates>,
    len: usize,
}

impl Graph {
    pub(crate) fn new() -> Self {
        Graph::default()
    }
    pub(crate) fn len(&self) -> usize {
        self.len
    }
    /// Returns `false` if the triple was already present.
    pub(crate) fn insert(&mut self, triple: Triple) -> bool {
        let Triple {
            subject,
            predicate,
            object,
        } = triple;
        self.add(&subject, &predicate, object)
    }
    pub(crate) fn contains(&self, triple: &Triple) -> bool {
        self.get_all(&triple.subject, &triple.predicate)
            .any(|o| o == &triple.object)
    }
    pub(crate) fn get_functional(&self, subject: &Term, predicate: &str) -> Option<&Term> {
        self.objects(subject, predicate)
            .and_then(|objects| objects.first())
    }
    /// Drops every `(subject, predicate, *)` triple, then stores `object` if
    /// there is one.
    pub(crate) fn set_functional(&mut self, subject: &Term, predicate: &str, object: Option<Term>) {
        if let Some(objects) = self.objects_mut(subject, predicate) {
            let removed = objects.len();
            objects.clear();
            self.len -= removed;
        }
        match object {
            Some(object) => {
                self.add(subject, predicate, object);
            }
            None => self.prune(subject, predicate),
        }
    }
    pub(crate) fn add(&mut self, subject: &Term, predicate: &str, object: Term) -> bool {
        let objects = self
            .subjects
            .entry(subject.clone())
            .or_default()
            .entry(predicate.to_string())
            .or_default();
        if objects.contains(&object) {
            /* Triple already exists in Graph, don't add */
            return false;
        }
        objects.push(object);
        self.len += 1;
        true
    }
    pub(crate) fn get_all<'g>(
        &'g self,
        subject: &Term,
        predicate: &str,
    ) -> impl Iterator<Item = &'g Term> + use<'g> {
        self.objects(subject, predicate)
            .into_iter()
            .flat_map(|objects| objects.iter())
    }
    pub(crate) fn remove(&mut self, subject: &Term, predicate: &str, object: &Term) -> bool {
        let Some(objects) = self.objects_mut(subject, predicate) else {
            return false;
        };
        let Some(pos) = objects.iter().position(|o| o == object) else {
            return false;
        };
        objects.remove(pos);
        self.len -= 1;
        self.prune(subject, predicate);
        true
    }
    /// Every triple, ordered by subject and predicate.
    pub(crate) fn triples(&self) -> impl Iterator<Item = (&Term, &str, &Term)> + '_ {
        self.subjects.iter().flat_map(|(subject, predicates)| {
            predicates.iter().flat_map(move |(predicate, objects)| {
                objects
                    .iter()
                    .map(move |object| (subject, predicate.as_str(), object))
            })
        })
    }

    fn objects(&self, subject: &Term, predicate: &str) -> Option<&Objects> {
        self.subjects.get(subject)?.get(predicate)
    }
    fn objects_mut(&mut self, subject: &Term, predicate: &str) -> Option<&mut Objects> {
        self.subjects.get_mut(subject)?.get_mut(predicate)
    }
    /// Forget empty predicate and subject entries so that equal triple sets
    /// compare equal.
    fn prune(&mut self, subject: &Term, predicate: &str) {
        if let Some(predicates) = self.subjects.get_mut(subject) {
            if predicates.get(predicate).is_some_and(Vec::is_empty) {
                predicates.remove(predicate);
            }
            if predicates.is_empty() {
                self.subjects.remove(subject);
            }
        }
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut graph = Graph::new();
        for triple in iter {
            graph.insert(triple);
        }
        graph
    }
}
