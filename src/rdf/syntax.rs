//! Textual RDF syntaxes, backed by rio.

use std::io::BufReader;

use oxiri::Iri;
use rio_api::formatter::TriplesFormatter;
use rio_api::model::{self as rio, Literal, NamedNode};
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesFormatter, TurtleError, TurtleFormatter, TurtleParser};
use thiserror::Error;

use super::{Graph, Term, Triple};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Syntax {
    Turtle,
    NTriples,
}

impl Syntax {
    pub(crate) fn media_type(self) -> &'static str {
        match self {
            Syntax::Turtle => "text/turtle",
            Syntax::NTriples => "application/n-triples",
        }
    }

    /// Picks the syntax for an `Accept` header, Turtle unless N-Triples is asked for.
    pub(crate) fn negotiate(accept: Option<&str>) -> Syntax {
        match accept {
            Some(accept)
                if accept
                    .split(',')
                    .any(|range| range.trim().starts_with(Syntax::NTriples.media_type())) =>
            {
                Syntax::NTriples
            }
            _ => Syntax::Turtle,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum SyntaxError {
    #[error("invalid base IRI {0}")]
    Base(String),
    #[error(transparent)]
    Turtle(#[from] TurtleError),
    #[error("unsupported RDF construct: {0}")]
    Unsupported(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Renders every triple of the graph.
pub(crate) fn serialize(graph: &Graph, syntax: Syntax) -> Result<Vec<u8>, SyntaxError> {
    match syntax {
        Syntax::Turtle => {
            let mut formatter = TurtleFormatter::new(Vec::new());
            write_triples(graph, &mut formatter)?;
            Ok(formatter.finish()?)
        }
        Syntax::NTriples => {
            let mut formatter = NTriplesFormatter::new(Vec::new());
            write_triples(graph, &mut formatter)?;
            Ok(formatter.finish()?)
        }
    }
}

/// Parses a Turtle document, resolving relative IRIs against `base_iri`.
pub(crate) fn parse_turtle(bytes: &[u8], base_iri: &str) -> Result<Graph, SyntaxError> {
    let base = Iri::parse(base_iri.to_string()).map_err(|_| SyntaxError::Base(base_iri.into()))?;
    let mut parser = TurtleParser::new(BufReader::new(bytes), Some(base));
    let mut graph = Graph::new();
    parser.parse_all(&mut |t| -> Result<(), SyntaxError> {
        graph.insert(from_rio(&t)?);
        Ok(())
    })?;
    Ok(graph)
}

fn write_triples<F>(graph: &Graph, formatter: &mut F) -> Result<(), SyntaxError>
where
    F: TriplesFormatter<Error = std::io::Error>,
{
    for (subject, predicate, object) in graph.triples() {
        let subject = match subject {
            Term::Named { iri } => rio::Subject::NamedNode(NamedNode { iri }),
            Term::Blank { id } => rio::Subject::BlankNode(rio::BlankNode { id }),
            _ => return Err(SyntaxError::Unsupported("literal subject")),
        };
        let object = match object {
            Term::Named { iri } => rio::Term::NamedNode(NamedNode { iri }),
            Term::Blank { id } => rio::Term::BlankNode(rio::BlankNode { id }),
            Term::Plain { value } => rio::Term::Literal(Literal::Simple { value }),
            Term::LangTagged { value, lang } => {
                rio::Term::Literal(Literal::LanguageTaggedString {
                    value,
                    language: lang,
                })
            }
            Term::Typed { value, datatype } => rio::Term::Literal(Literal::Typed {
                value,
                datatype: NamedNode { iri: datatype },
            }),
        };
        formatter.format(&rio::Triple {
            subject,
            predicate: NamedNode { iri: predicate },
            object,
        })?;
    }
    Ok(())
}

fn from_rio(triple: &rio::Triple<'_>) -> Result<Triple, SyntaxError> {
    let subject = match triple.subject {
        rio::Subject::NamedNode(n) => Term::named(n.iri),
        rio::Subject::BlankNode(b) => Term::Blank { id: b.id.into() },
        _ => return Err(SyntaxError::Unsupported("quoted triple subject")),
    };
    let object = match triple.object {
        rio::Term::NamedNode(n) => Term::named(n.iri),
        rio::Term::BlankNode(b) => Term::Blank { id: b.id.into() },
        rio::Term::Literal(Literal::Simple { value }) => Term::plain(value),
        rio::Term::Literal(Literal::LanguageTaggedString { value, language }) => {
            Term::LangTagged {
                value: value.into(),
                lang: language.into(),
            }
        }
        rio::Term::Literal(Literal::Typed { value, datatype }) => Term::typed(value, datatype.iri),
        _ => return Err(SyntaxError::Unsupported("quoted triple object")),
    };
    Ok(Triple::new(subject, triple.predicate.iri, object))
}
