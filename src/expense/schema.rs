//! The fixed predicate schema of an expense.

use std::marker::PhantomData;

use crate::rdf::codec::{DecimalCodec, IriCodec, StringCodec, TimestampCodec};
use crate::rdf::vocab::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Cardinality {
    /// At most one value per subject.
    Functional,
    MultiValued,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AttributeDef {
    pub(crate) name: &'static str,
    pub(crate) predicate: &'static str,
    pub(crate) cardinality: Cardinality,
}

/// A 0..1 attribute stored through codec `C`.
pub(crate) struct Functional<C> {
    pub(crate) def: AttributeDef,
    codec: PhantomData<C>,
}

/// A 0..N attribute stored through codec `C`.
pub(crate) struct MultiValued<C> {
    pub(crate) def: AttributeDef,
    codec: PhantomData<C>,
}

impl<C> Functional<C> {
    const fn new(name: &'static str, predicate: &'static str) -> Self {
        Functional {
            def: AttributeDef {
                name,
                predicate,
                cardinality: Cardinality::Functional,
            },
            codec: PhantomData,
        }
    }
}

impl<C> MultiValued<C> {
    const fn new(name: &'static str, predicate: &'static str) -> Self {
        MultiValued {
            def: AttributeDef {
                name,
                predicate,
                cardinality: Cardinality::MultiValued,
            },
            codec: PhantomData,
        }
    }
}

pub(crate) const TYPE: Functional<IriCodec> = Functional::new("rdfType", RDF_TYPE);
pub(crate) const MERCHANT_PROVIDER: Functional<StringCodec> =
    Functional::new("merchantProvider", SCHEMA_PROVIDER);
pub(crate) const EXPENSE_DATE: Functional<TimestampCodec> =
    Functional::new("expenseDate", SCHEMA_PURCHASE_DATE);
pub(crate) const DESCRIPTION: Functional<StringCodec> =
    Functional::new("description", SCHEMA_DESCRIPTION);
pub(crate) const AMOUNT: Functional<DecimalCodec> = Functional::new("amount", SCHEMA_TOTAL_PRICE);
pub(crate) const CURRENCY: Functional<StringCodec> =
    Functional::new("currency", SCHEMA_PRICE_CURRENCY);
pub(crate) const CATEGORY: Functional<StringCodec> = Functional::new("category", SCHEMA_CATEGORY);
pub(crate) const RECEIPTS: MultiValued<IriCodec> = MultiValued::new("receipts", SCHEMA_IMAGE);

pub(crate) const EXPENSE_SCHEMA: [AttributeDef; 8] = [
    TYPE.def,
    MERCHANT_PROVIDER.def,
    EXPENSE_DATE.def,
    DESCRIPTION.def,
    AMOUNT.def,
    CURRENCY.def,
    CATEGORY.def,
    RECEIPTS.def,
];

/// Is `predicate` one the expense schema knows about?
pub(crate) fn is_modeled(predicate: &str) -> bool {
    EXPENSE_SCHEMA.iter().any(|def| def.predicate == predicate)
}
