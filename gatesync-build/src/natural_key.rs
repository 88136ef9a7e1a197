//! Per-kind natural-key extraction: `name`, `prefix`, `username`, `key`,
//! `group`, `(uri, query)`, depending on the kind's identity shape.

use gatesync_core::{EntityKind, NaturalKey};
use serde_json::Value;

pub fn extract(kind: EntityKind, attrs: &Value) -> NaturalKey {
    let get_str = |f: &str| attrs.get(f).and_then(Value::as_str).map(str::to_string);

    match kind {
        EntityKind::Route => {
            if let Some(name) = get_str("name") {
                NaturalKey::Name(name)
            } else if let Some(uri) = get_str("uri") {
                NaturalKey::UriQuery(uri, get_str("query"))
            } else {
                NaturalKey::None
            }
        }
        EntityKind::Service
        | EntityKind::Upstream
        | EntityKind::ConsumerGroup
        | EntityKind::ServicePackage
        | EntityKind::ServiceVersion
        | EntityKind::Sni => get_str("name").map(NaturalKey::Name).unwrap_or(NaturalKey::None),
        EntityKind::Consumer | EntityKind::BasicAuth | EntityKind::HmacAuth => {
            get_str("username").map(NaturalKey::Username).unwrap_or(NaturalKey::None)
        }
        EntityKind::KeyAuth | EntityKind::JwtAuth => {
            get_str("key").map(NaturalKey::Key).unwrap_or(NaturalKey::None)
        }
        EntityKind::AclGroup => get_str("group").map(NaturalKey::Group).unwrap_or(NaturalKey::None),
        EntityKind::Certificate => match (get_str("cert"), get_str("key")) {
            (Some(cert), Some(key)) => NaturalKey::CertKey(cert, key),
            _ => NaturalKey::None,
        },
        _ => NaturalKey::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_prefers_name_over_uri() {
        let v = serde_json::json!({"name": "r", "uri": "/foo"});
        assert_eq!(extract(EntityKind::Route, &v), NaturalKey::Name("r".into()));
    }

    #[test]
    fn route_falls_back_to_uri_query() {
        let v = serde_json::json!({"uri": "/foo", "query": "a=b"});
        assert_eq!(
            extract(EntityKind::Route, &v),
            NaturalKey::UriQuery("/foo".into(), Some("a=b".into()))
        );
    }

    #[test]
    fn certificate_uses_cert_key_pair() {
        let v = serde_json::json!({"cert": "CERT", "key": "KEY"});
        assert_eq!(
            extract(EntityKind::Certificate, &v),
            NaturalKey::CertKey("CERT".into(), "KEY".into())
        );
    }

    #[test]
    fn plugin_has_no_natural_key() {
        let v = serde_json::json!({"name": "key-auth"});
        assert_eq!(extract(EntityKind::Plugin, &v), NaturalKey::None);
    }
}
