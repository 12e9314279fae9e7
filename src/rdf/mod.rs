//! Just enough RDF to keep one resource's graph in memory.

pub(crate) mod codec;
pub(crate) mod graph;
pub(crate) mod syntax;
pub(crate) mod vocab;

pub(crate) use self::graph::Graph;

/// A node in an RDF graph.
///
/// Subjects are restricted to [`Term::Named`] and [`Term::Blank`]; predicates
/// are plain IRI strings and never stored as terms.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Term {
    Named { iri: String },
    Blank { id: String },
    Plain { value: String },
    LangTagged { value: String, lang: String },
    Typed { value: String, datatype: String },
}

impl Term {
    pub(crate) fn named(iri: impl Into<String>) -> Term {
        Term::Named { iri: iri.into() }
    }
    pub(crate) fn plain(value: impl Into<String>) -> Term {
        Term::Plain {
            value: value.into(),
        }
    }
    pub(crate) fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Term {
        Term::Typed {
            value: value.into(),
            datatype: datatype.into(),
        }
    }
    /// Lexical form of a literal, `None` for nodes.
    pub(crate) fn lexical_form(&self) -> Option<&str> {
        match self {
            Term::Plain { value }
            | Term::LangTagged { value, .. }
            | Term::Typed { value, .. } => Some(value),
            Term::Named { .. } | Term::Blank { .. } => None,
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Named { iri } => write!(f, "<{iri}>"),
            Term::Blank { id } => write!(f, "_:{id}"),
            Term::Plain { value } => write!(f, "{value:?}"),
            Term::LangTagged { value, lang } => write!(f, "{value:?}@{lang}"),
            Term::Typed { value, datatype } => write!(f, "{value:?}^^<{datatype}>"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Triple {
    pub(crate) subject: Term,
    pub(crate) predicate: String,
    pub(crate) object: Term,
}

impl Triple {
    pub(crate) fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Triple {
        Triple {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}
