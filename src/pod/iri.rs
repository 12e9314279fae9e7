use oxiri::Iri;

use super::PodError;

/// Validates an absolute resource IRI and removes its dot segments.
pub(crate) fn normalize(identifier: &str) -> Result<String, PodError> {
    let invalid = |reason: String| PodError::InvalidIdentifier {
        identifier: identifier.to_string(),
        reason,
    };
    let iri = Iri::parse(identifier.trim()).map_err(|e| invalid(e.to_string()))?;
    let mut normalized = format!("{}:", iri.scheme());
    if let Some(authority) = iri.authority() {
        normalized.push_str("//");
        normalized.push_str(authority);
    }
    normalized.push_str(&remove_dot_segments(iri.path()));
    if let Some(query) = iri.query() {
        normalized.push('?');
        normalized.push_str(query);
    }
    if let Some(fragment) = iri.fragment() {
        normalized.push('#');
        normalized.push_str(fragment);
    }
    let normalized = Iri::parse(normalized).map_err(|e| invalid(e.to_string()))?;
    Ok(normalized.into_inner())
}

/// RFC 3986 section 5.2.4.
fn remove_dot_segments(path: &str) -> String {
    let mut input = path;
    let mut output = String::with_capacity(path.len());
    while !input.is_empty() {
        if let Some(rest) = input.strip_prefix("../") {
            input = rest;
        } else if let Some(rest) = input.strip_prefix("./") {
            input = rest;
        } else if input.starts_with("/./") {
            input = &input[2..];
        } else if input == "/." {
            input = "/";
        } else if input.starts_with("/../") {
            input = &input[3..];
            pop_segment(&mut output);
        } else if input == "/.." {
            input = "/";
            pop_segment(&mut output);
        } else if input == "." || input == ".." {
            input = "";
        } else {
            let start = usize::from(input.starts_with('/'));
            let end = input[start..].find('/').map_or(input.len(), |i| i + start);
            output.push_str(&input[..end]);
            input = &input[end..];
        }
    }
    output
}

fn pop_segment(output: &mut String) {
    output.truncate(output.rfind('/').unwrap_or(0));
}

/// The IRI of `name` inside the container that holds `resource`.
pub(crate) fn sibling(resource: &str, name: &str) -> Result<String, PodError> {
    let base = Iri::parse(resource).map_err(|e| PodError::InvalidIdentifier {
        identifier: resource.to_string(),
        reason: e.to_string(),
    })?;
    let sibling = base
        .resolve(name)
        .map_err(|e| PodError::InvalidIdentifier {
            identifier: name.to_string(),
            reason: e.to_string(),
        })?;
    Ok(sibling.into_inner())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::{normalize, sibling};
    use crate::pod::PodError;

    #[test]
    fn removes_dot_segments() -> Result<()> {
        assert_eq!(
            normalize("https://pod.example/a/./b/../expenses/1")?,
            "https://pod.example/a/expenses/1"
        );
        assert_eq!(
            normalize(" https://pod.example/expenses/1 ")?,
            "https://pod.example/expenses/1"
        );
        Ok(())
    }

    #[test]
    fn dot_segments_cannot_climb_above_root() -> Result<()> {
        assert_eq!(
            normalize("https://pod.example/tmp/../expenses/1")?,
            "https://pod.example/expenses/1"
        );
        assert_eq!(
            normalize("https://pod.example/../../expenses/./1?x=1#me")?,
            "https://pod.example/expenses/1?x=1#me"
        );
        assert_eq!(
            normalize("https://pod.example/expenses/..")?,
            "https://pod.example/"
        );
        Ok(())
    }

    #[test]
    fn keeps_query_and_fragment() -> Result<()> {
        assert_eq!(
            normalize("https://id.example/alice/profile/card#me")?,
            "https://id.example/alice/profile/card#me"
        );
        assert_eq!(normalize("urn:uuid:1234")?, "urn:uuid:1234");
        Ok(())
    }

    #[test]
    fn rejects_relative_identifiers() {
        let err = normalize("expenses/1").unwrap_err();
        assert!(matches!(err, PodError::InvalidIdentifier { .. }));
        assert!(normalize("").is_err());
    }

    #[test]
    fn sibling_lands_in_same_container() -> Result<()> {
        assert_eq!(
            sibling("https://pod.example/expenses/1", "receipt-1")?,
            "https://pod.example/expenses/receipt-1"
        );
        Ok(())
    }
}
