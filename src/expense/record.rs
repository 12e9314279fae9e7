use std::collections::BTreeSet;

use jiff::tz::TimeZone;
use jiff::{Timestamp, civil};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::pod::{Metadata, PodError, RdfSource, iri};
use crate::rdf::codec::{IriCodec, TermCodec};
use crate::rdf::syntax::{self, Syntax};
use crate::rdf::vocab::{PIM_STORAGE, SCHEMA_INVOICE};
use crate::rdf::{Graph, Term};

use super::node::Node;
use super::schema::*;

/// An expense stored as an RDF resource.
///
/// The graph is the source of truth. Accessors only ever touch the triples of
/// the schema predicates on the expense's own subject; everything else in the
/// graph is carried along as is.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Expense {
    identifier: String,
    subject: Term,
    graph: Graph,
    metadata: Metadata,
}

impl Expense {
    /// A new, local expense with nothing in its graph yet.
    pub(crate) fn new(identifier: &str) -> Result<Expense, PodError> {
        let identifier = iri::normalize(identifier)?;
        Ok(Expense::bind(identifier, Graph::new(), Metadata::default()))
    }

    /// The structural constructor used for incoming JSON.
    pub(crate) fn from_payload(payload: ExpensePayload) -> Result<Expense, PodError> {
        let mut expense = Expense::new(&payload.identifier)?;
        expense.set_rdf_type(Some(SCHEMA_INVOICE.to_string()));
        expense.apply_payload(payload)?;
        Ok(expense)
    }

    /// Overwrites every modeled attribute except the type with the payload's
    /// values; absent fields are deleted. Nothing changes if a receipt is not
    /// a valid IRI.
    pub(crate) fn apply_payload(&mut self, payload: ExpensePayload) -> Result<(), PodError> {
        let receipts = payload
            .receipts
            .unwrap_or_default()
            .iter()
            .map(|receipt| iri::normalize(receipt))
            .collect::<Result<BTreeSet<_>, _>>()?;
        self.set_merchant_provider(payload.merchant_provider);
        self.set_expense_date(payload.expense_date);
        self.set_description(payload.description);
        self.set_amount(payload.amount);
        self.set_currency(payload.currency);
        self.set_category(payload.category);
        for stale in self.receipts()?.difference(&receipts) {
            self.remove_receipt(stale);
        }
        let mut node = self.node_mut();
        for receipt in &receipts {
            node.add(&RECEIPTS, receipt);
        }
        Ok(())
    }

    fn bind(identifier: String, graph: Graph, metadata: Metadata) -> Expense {
        Expense {
            subject: Term::named(identifier.as_str()),
            identifier,
            graph,
            metadata,
        }
    }

    fn node(&self) -> Node<'_, &Graph> {
        Node::new(&self.subject, &self.graph)
    }

    fn node_mut(&mut self) -> Node<'_, &mut Graph> {
        Node::new(&self.subject, &mut self.graph)
    }

    pub(crate) fn rdf_type(&self) -> Result<Option<String>, PodError> {
        self.node().get(&TYPE)
    }
    pub(crate) fn set_rdf_type(&mut self, rdf_type: Option<String>) {
        self.node_mut().set(&TYPE, rdf_type.as_ref());
    }
    pub(crate) fn merchant_provider(&self) -> Result<Option<String>, PodError> {
        self.node().get(&MERCHANT_PROVIDER)
    }
    pub(crate) fn set_merchant_provider(&mut self, provider: Option<String>) {
        self.node_mut().set(&MERCHANT_PROVIDER, provider.as_ref());
    }
    pub(crate) fn expense_date(&self) -> Result<Option<Timestamp>, PodError> {
        self.node().get(&EXPENSE_DATE)
    }
    pub(crate) fn set_expense_date(&mut self, date: Option<Timestamp>) {
        self.node_mut().set(&EXPENSE_DATE, date.as_ref());
    }
    pub(crate) fn description(&self) -> Result<Option<String>, PodError> {
        self.node().get(&DESCRIPTION)
    }
    pub(crate) fn set_description(&mut self, description: Option<String>) {
        self.node_mut().set(&DESCRIPTION, description.as_ref());
    }
    pub(crate) fn amount(&self) -> Result<Option<Decimal>, PodError> {
        self.node().get(&AMOUNT)
    }
    pub(crate) fn set_amount(&mut self, amount: Option<Decimal>) {
        self.node_mut().set(&AMOUNT, amount.as_ref());
    }
    pub(crate) fn currency(&self) -> Result<Option<String>, PodError> {
        self.node().get(&CURRENCY)
    }
    pub(crate) fn set_currency(&mut self, currency: Option<String>) {
        self.node_mut().set(&CURRENCY, currency.as_ref());
    }
    pub(crate) fn category(&self) -> Result<Option<String>, PodError> {
        self.node().get(&CATEGORY)
    }
    pub(crate) fn set_category(&mut self, category: Option<String>) {
        self.node_mut().set(&CATEGORY, category.as_ref());
    }
    pub(crate) fn receipts(&self) -> Result<BTreeSet<String>, PodError> {
        self.node().objects(&RECEIPTS)
    }
    /// Links a receipt; it must be an absolute IRI.
    pub(crate) fn add_receipt(&mut self, receipt: &str) -> Result<(), PodError> {
        let receipt = iri::normalize(receipt)?;
        self.node_mut().add(&RECEIPTS, &receipt);
        Ok(())
    }
    pub(crate) fn remove_receipt(&mut self, receipt: &str) -> bool {
        self.node_mut().remove(&RECEIPTS, &receipt.to_string())
    }

    /// Number of triples in the graph the expense schema does not describe.
    pub(crate) fn unmodeled_len(&self) -> usize {
        self.graph
            .triples()
            .filter(|(subject, predicate, _)| *subject != &self.subject || !is_modeled(predicate))
            .count()
    }

    /// Renders the whole bound graph, not just the modeled attributes.
    pub(crate) fn serialize(&self, syntax: Syntax) -> Result<Vec<u8>, syntax::SyntaxError> {
        syntax::serialize(&self.graph, syntax)
    }

    pub(crate) fn to_payload(&self) -> Result<ExpensePayload, PodError> {
        let receipts = self.receipts()?;
        Ok(ExpensePayload {
            identifier: self.identifier.clone(),
            rdf_type: self.rdf_type()?,
            merchant_provider: self.merchant_provider()?,
            expense_date: self.expense_date()?,
            description: self.description()?,
            amount: self.amount()?,
            currency: self.currency()?,
            category: self.category()?,
            receipts: Some(receipts.into_iter().collect()),
        })
    }
}

impl RdfSource for Expense {
    fn identifier(&self) -> &str {
        &self.identifier
    }
    fn graph(&self) -> &Graph {
        &self.graph
    }
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
    fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }
    fn from_parts(identifier: String, graph: Graph, metadata: Metadata) -> Result<Self, PodError> {
        let identifier = iri::normalize(&identifier)?;
        Ok(Expense::bind(identifier, graph, metadata))
    }
}

/// The JSON shape of an expense.
///
/// Nothing about the graph or the server metadata is ever part of it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExpensePayload {
    pub(crate) identifier: String,
    /// Output only; incoming expenses are always invoices.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub(crate) rdf_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) merchant_provider: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) expense_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) receipts: Option<Vec<String>>,
}

/// Accepts an RFC 3339 instant, a civil date or date-time taken as UTC, or
/// milliseconds since the Unix epoch.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => return Ok(None),
        serde_json::Value::Number(millis) => match millis.as_i64() {
            Some(millis) => Timestamp::from_millisecond(millis).map_err(|e| e.to_string()),
            None => Err(format!("{millis} is not a whole number of milliseconds")),
        },
        serde_json::Value::String(text) => parse_timestamp(&text),
        other => Err(format!("expected a date, got {other}")),
    };
    parsed.map(Some).map_err(D::Error::custom)
}

fn parse_timestamp(text: &str) -> Result<Timestamp, String> {
    if let Ok(timestamp) = text.parse::<Timestamp>() {
        return Ok(timestamp);
    }
    let civil = match text.parse::<civil::DateTime>() {
        Ok(datetime) => datetime,
        Err(_) => text
            .parse::<civil::Date>()
            .map_err(|e| format!("{text:?} is not a date: {e}"))?
            .to_datetime(civil::Time::midnight()),
    };
    civil
        .to_zoned(TimeZone::UTC)
        .map(|zoned| zoned.timestamp())
        .map_err(|e| e.to_string())
}

/// A WebID profile document, read to discover a user's pods.
pub(crate) struct WebIdProfile {
    webid: String,
    graph: Graph,
    metadata: Metadata,
}

impl WebIdProfile {
    pub(crate) fn storages(&self) -> Result<BTreeSet<String>, PodError> {
        let subject = Term::named(self.webid.as_str());
        self.graph
            .get_all(&subject, PIM_STORAGE)
            .map(|term| {
                IriCodec::decode(term).map_err(|source| PodError::MalformedTerm {
                    attribute: "storage",
                    predicate: PIM_STORAGE,
                    source,
                })
            })
            .collect()
    }
}

impl RdfSource for WebIdProfile {
    fn identifier(&self) -> &str {
        &self.webid
    }
    fn graph(&self) -> &Graph {
        &self.graph
    }
    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
    fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }
    fn from_parts(webid: String, graph: Graph, metadata: Metadata) -> Result<Self, PodError> {
        Ok(WebIdProfile {
            webid: iri::normalize(&webid)?,
            graph,
            metadata,
        })
    }
}
