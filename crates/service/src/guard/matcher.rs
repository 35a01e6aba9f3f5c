/// Path patterns deciding whether the route guard runs at all.
///
/// Supported forms: an exact path (`/settings`), or a base followed by `/*`
/// (`/admin/*`), which matches the base itself and every path below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Exact(String),
    Subtree(String),
}

impl Pattern {
    fn parse(raw: &str) -> Self {
        match raw.strip_suffix("/*") {
            Some(base) => Pattern::Subtree(base.to_string()),
            None => Pattern::Exact(raw.trim_end_matches('/').to_string()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(p) => path == p || path.strip_suffix('/') == Some(p.as_str()),
            Pattern::Subtree(base) => match path.strip_prefix(base.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

impl PathMatcher {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { patterns: patterns.into_iter().map(|p| Pattern::parse(p.as_ref())).collect() }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_matches_base_and_descendants_only() {
        let m = PathMatcher::new(["/profile/*", "/admin/*"]);
        for hit in ["/admin", "/admin/", "/admin/services/1", "/profile", "/profile/bookings"] {
            assert!(m.matches(hit), "{hit} should match");
        }
        for miss in ["/", "/administrator", "/api/services", "/auth/login", "/profiles"] {
            assert!(!m.matches(miss), "{miss} should not match");
        }
    }

    #[test]
    fn exact_pattern() {
        let m = PathMatcher::new(["/settings"]);
        assert!(m.matches("/settings"));
        assert!(m.matches("/settings/"));
        assert!(!m.matches("/settings/x"));
    }
}
