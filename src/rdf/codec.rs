//! Conversions between graph terms and native values.

use std::str::FromStr;

use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;

use super::Term;
use super::vocab::{XSD_DATE_TIME, XSD_DECIMAL, XSD_STRING};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot decode {term} as {expected}: {reason}")]
pub(crate) struct MalformedTerm {
    pub(crate) expected: &'static str,
    pub(crate) term: Term,
    pub(crate) reason: String,
}

impl MalformedTerm {
    fn new(expected: &'static str, term: &Term, reason: impl Into<String>) -> MalformedTerm {
        MalformedTerm {
            expected,
            term: term.clone(),
            reason: reason.into(),
        }
    }
}

/// A pair of pure conversions for one native type.
pub(crate) trait TermCodec {
    type Native: Ord;

    fn decode(term: &Term) -> Result<Self::Native, MalformedTerm>;
    fn encode(value: &Self::Native) -> Term;
}

pub(crate) struct IriCodec;
pub(crate) struct StringCodec;
pub(crate) struct TimestampCodec;
pub(crate) struct DecimalCodec;

impl TermCodec for IriCodec {
    type Native = String;

    fn decode(term: &Term) -> Result<String, MalformedTerm> {
        match term {
            Term::Named { iri } => Ok(iri.clone()),
            _ => Err(MalformedTerm::new("IRI", term, "term is not a named node")),
        }
    }
    fn encode(value: &String) -> Term {
        Term::named(value.as_str())
    }
}

impl TermCodec for StringCodec {
    type Native = String;

    fn decode(term: &Term) -> Result<String, MalformedTerm> {
        match term {
            Term::Plain { value } | Term::LangTagged { value, .. } => Ok(value.clone()),
            Term::Typed { value, datatype } if datatype == XSD_STRING => Ok(value.clone()),
            Term::Typed { datatype, .. } => Err(MalformedTerm::new(
                "string",
                term,
                format!("unexpected datatype {datatype}"),
            )),
            _ => Err(MalformedTerm::new("string", term, "term is not a literal")),
        }
    }
    fn encode(value: &String) -> Term {
        Term::plain(value.as_str())
    }
}

impl TermCodec for TimestampCodec {
    type Native = Timestamp;

    fn decode(term: &Term) -> Result<Timestamp, MalformedTerm> {
        let Term::Typed { value, .. } = term else {
            return Err(MalformedTerm::new(
                "timestamp",
                term,
                "term is not a typed literal",
            ));
        };
        Timestamp::from_str(value).map_err(|e| MalformedTerm::new("timestamp", term, e.to_string()))
    }
    fn encode(value: &Timestamp) -> Term {
        Term::typed(value.to_string(), XSD_DATE_TIME)
    }
}

impl TermCodec for DecimalCodec {
    type Native = Decimal;

    fn decode(term: &Term) -> Result<Decimal, MalformedTerm> {
        let Some(lexical) = term.lexical_form() else {
            return Err(MalformedTerm::new("decimal", term, "term is not a literal"));
        };
        // from_str_exact refuses to round, so no digit is ever dropped
        Decimal::from_str_exact(lexical.trim())
            .map_err(|e| MalformedTerm::new("decimal", term, e.to_string()))
    }
    fn encode(value: &Decimal) -> Term {
        Term::typed(value.to_string(), XSD_DECIMAL)
    }
}
