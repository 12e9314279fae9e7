pub(crate) const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub(crate) const SCHEMA_PURCHASE_DATE: &str = "https://schema.org/purchaseDate";
pub(crate) const SCHEMA_PROVIDER: &str = "https://schema.org/provider";
pub(crate) const SCHEMA_DESCRIPTION: &str = "https://schema.org/description";
pub(crate) const SCHEMA_TOTAL_PRICE: &str = "https://schema.org/totalPrice";
pub(crate) const SCHEMA_PRICE_CURRENCY: &str = "https://schema.org/priceCurrency";
pub(crate) const SCHEMA_CATEGORY: &str = "https://schema.org/category";
pub(crate) const SCHEMA_IMAGE: &str = "https://schema.org/image";

pub(crate) const SCHEMA_INVOICE: &str = "https://schema.org/Invoice";

pub(crate) const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub(crate) const XSD_DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
pub(crate) const XSD_DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

pub(crate) const PIM_STORAGE: &str = "http://www.w3.org/ns/pim/space#storage";
