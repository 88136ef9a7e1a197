//! Cascading-delete child table: walks "delete one resource, then its
//! dependent children by kind" for the handful of parent kinds that need it.

use gatesync_core::EntityKind;

/// Kinds whose entities are deleted from the mirror when `parent` is
/// deleted.
pub fn cascade_children(parent: EntityKind) -> &'static [EntityKind] {
    use EntityKind::*;
    match parent {
        Service => &[Route, Plugin, FilterChain],
        Route => &[Plugin],
        Consumer => &[
            Plugin,
            KeyAuth,
            BasicAuth,
            HmacAuth,
            JwtAuth,
            Oauth2Credential,
            AclGroup,
            MtlsAuth,
        ],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_cascades_to_routes_plugins_and_filter_chains() {
        let children = cascade_children(EntityKind::Service);
        assert!(children.contains(&EntityKind::Route));
        assert!(children.contains(&EntityKind::Plugin));
        assert!(children.contains(&EntityKind::FilterChain));
    }

    #[test]
    fn consumer_cascades_to_all_credential_kinds() {
        let children = cascade_children(EntityKind::Consumer);
        assert!(children.contains(&EntityKind::KeyAuth));
        assert!(children.contains(&EntityKind::JwtAuth));
        assert!(children.contains(&EntityKind::MtlsAuth));
    }

    #[test]
    fn non_cascading_kind_has_no_children() {
        assert!(cascade_children(EntityKind::Target).is_empty());
    }
}
