//! Resource-scope containment policies.
//!
//! Whether one resource lies inside another depends on the resource's
//! scheme, so containment is a pluggable [`ScopePolicy`]. [`UrlScope`] is
//! the default and handles hierarchical URLs; [`SchemeScopes`] routes
//! individual schemes to dedicated policies.

use std::collections::HashMap;
use std::fmt;
use url::Url;

/// Decides whether a child resource falls within a parent resource.
pub trait ScopePolicy {
    /// `true` if `child` is `parent` or lies within it.
    fn contains(&self, parent: &str, child: &str) -> bool;
}

impl<P: ScopePolicy + ?Sized> ScopePolicy for &P {
    fn contains(&self, parent: &str, child: &str) -> bool {
        (**self).contains(parent, child)
    }
}

impl<P: ScopePolicy + ?Sized> ScopePolicy for Box<P> {
    fn contains(&self, parent: &str, child: &str) -> bool {
        (**self).contains(parent, child)
    }
}

/// Only identical resources match.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactScope;

impl ScopePolicy for ExactScope {
    fn contains(&self, parent: &str, child: &str) -> bool {
        parent == child
    }
}

/// Path-prefix containment for hierarchical URLs.
///
/// The scheme, host and port must agree, and the parent's path must be a
/// prefix of the child's on a segment boundary, so `storage://host/data`
/// contains `storage://host/data/1` but not `storage://host/database`. A
/// query or fragment on the parent must be matched exactly. Opaque URIs
/// (`did:`, `mailto:` and the like) and strings that do not parse as URLs
/// only match themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlScope;

impl ScopePolicy for UrlScope {
    fn contains(&self, parent: &str, child: &str) -> bool {
        if parent == child {
            return true;
        }
        let (Ok(parent), Ok(child)) = (Url::parse(parent), Url::parse(child)) else {
            return false;
        };
        if parent.cannot_be_a_base() || child.cannot_be_a_base() {
            return parent == child;
        }
        if parent.scheme() != child.scheme()
            || parent.host() != child.host()
            || parent.port_or_known_default() != child.port_or_known_default()
            || parent.username() != child.username()
        {
            return false;
        }
        if parent.query().is_some() && parent.query() != child.query() {
            return false;
        }
        if parent.fragment().is_some() && parent.fragment() != child.fragment() {
            return false;
        }
        path_contains(parent.path(), child.path())
    }
}

fn path_contains(parent: &str, child: &str) -> bool {
    let parent = parent.trim_end_matches('/');
    match child.strip_prefix(parent) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Routes containment checks to a policy chosen by the parent's scheme.
///
/// Resources of different schemes never contain each other. Schemes with no
/// registered policy fall back to [`UrlScope`].
#[derive(Default)]
pub struct SchemeScopes {
    policies: HashMap<String, Box<dyn ScopePolicy + Send + Sync>>,
}

impl SchemeScopes {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `policy` for resources with `scheme`.
    #[must_use]
    pub fn register(
        mut self,
        scheme: impl Into<String>,
        policy: impl ScopePolicy + Send + Sync + 'static,
    ) -> Self {
        self.policies
            .insert(scheme.into().to_ascii_lowercase(), Box::new(policy));
        self
    }
}

impl fmt::Debug for SchemeScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeScopes")
            .field("schemes", &self.policies.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ScopePolicy for SchemeScopes {
    fn contains(&self, parent: &str, child: &str) -> bool {
        let parent_scheme = scheme_of(parent);
        if parent_scheme != scheme_of(child) {
            return false;
        }
        match parent_scheme.and_then(|scheme| self.policies.get(&scheme)) {
            Some(policy) => policy.contains(parent, child),
            None => UrlScope.contains(parent, child),
        }
    }
}

fn scheme_of(resource: &str) -> Option<String> {
    resource
        .split_once(':')
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_paths_nest_on_segment_boundaries() {
        let scope = UrlScope;
        assert!(scope.contains("storage://example.com/data", "storage://example.com/data"));
        assert!(scope.contains("storage://example.com/data", "storage://example.com/data/1"));
        assert!(scope.contains("storage://example.com/data/", "storage://example.com/data/1"));
        assert!(scope.contains("storage://example.com", "storage://example.com/anything"));
        assert!(!scope.contains("storage://example.com/data", "storage://example.com/database"));
        assert!(!scope.contains("storage://example.com/data/1", "storage://example.com/data"));
    }

    #[test]
    fn url_scheme_host_and_port_must_agree() {
        let scope = UrlScope;
        assert!(!scope.contains("storage://example.com/data", "https://example.com/data/1"));
        assert!(!scope.contains("storage://example.com/data", "storage://evil.com/data/1"));
        assert!(!scope.contains("https://example.com/", "https://example.com:8443/x"));
        assert!(scope.contains("https://example.com/", "https://example.com:443/x"));
        assert!(!scope.contains("https://example.com/", "https://mallory@example.com/x"));
    }

    #[test]
    fn parent_query_must_match() {
        let scope = UrlScope;
        assert!(scope.contains("https://example.com/a", "https://example.com/a/b?x=1"));
        assert!(scope.contains("https://example.com/a?x=1", "https://example.com/a/b?x=1"));
        assert!(!scope.contains("https://example.com/a?x=1", "https://example.com/a/b?x=2"));
        assert!(!scope.contains("https://example.com/a?x=1", "https://example.com/a/b"));
    }

    #[test]
    fn opaque_uris_only_match_themselves() {
        let scope = UrlScope;
        let did = "did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK";
        assert!(scope.contains(did, did));
        assert!(!scope.contains("did:key:z6Mk", did));
        assert!(!scope.contains("mailto:a@example.com", "mailto:a@example.com.evil"));
        assert!(!scope.contains("not a url", "not a url/child"));
    }

    #[test]
    fn scheme_registry_routes_by_scheme() {
        struct PrefixScope;

        impl ScopePolicy for PrefixScope {
            fn contains(&self, parent: &str, child: &str) -> bool {
                child.starts_with(parent)
            }
        }

        let scopes = SchemeScopes::new()
            .register("did", PrefixScope)
            .register("storage", ExactScope);

        assert!(scopes.contains("did:pkh:eip155:1", "did:pkh:eip155:1:0xabc"));
        assert!(!scopes.contains("storage://example.com/data", "storage://example.com/data/1"));
        assert!(scopes.contains("https://example.com/a", "https://example.com/a/b"));
        assert!(!scopes.contains("did:pkh:", "https://did/pkh"));
    }
}
