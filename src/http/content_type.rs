use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};

use crate::rdf::syntax::Syntax;

/// A response body already rendered in an RDF syntax.
pub(super) struct RdfBody(pub(super) Syntax, pub(super) Vec<u8>);

impl IntoResponse for RdfBody {
    fn into_response(self) -> Response {
        let RdfBody(syntax, bytes) = self;
        let mut response = bytes.into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(syntax.media_type()),
        );
        response
    }
}
