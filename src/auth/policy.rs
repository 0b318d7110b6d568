//! Path classification for the admin gate.

/// Paths that never require a credential, even under a protected prefix.
pub const BUILTIN_ALWAYS_ALLOWED: &[&str] = &[
    "/startup",
    "/api/init",
    "/api/sub",
    "/s/",
    "/login",
    "/api/auth/",
    "/static/",
    "/favicon.ico",
    "/logo.svg",
];

/// Administrative prefixes that always require a credential.
pub const BUILTIN_PROTECTED: &[&str] = &["/links", "/settings", "/admin", "/config"];

/// How a request path is treated by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    AlwaysAllowed,
    Protected,
    PubliclyAllowed,
}

/// Strip query string and fragment, leaving the path component.
pub fn path_component(target: &str) -> &str {
    match target.find(['?', '#']) {
        Some(idx) => &target[..idx],
        None => target,
    }
}

/// Segment-boundary-aware prefix match.
///
/// `entry` matches `path` when they are equal, when `entry` ends with `/` and
/// `path` starts with it, or when `path` continues past `entry` with a `/`.
/// `/reports` therefore matches `/reports/q1` but not `/reports-public`.
pub fn matches_prefix(entry: &str, path: &str) -> bool {
    if entry.is_empty() {
        return false;
    }
    match path.strip_prefix(entry) {
        Some("") => true,
        Some(rest) => entry.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

/// Parse a comma-separated prefix list: entries trimmed, empty entries dropped.
pub fn parse_prefix_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Immutable classification policy.
#[derive(Debug, Clone)]
pub struct PathPolicy {
    always_allowed: Vec<String>,
    /// Carve-outs matched only on the exact path, never as a prefix.
    always_allowed_exact: Vec<String>,
    protected: Vec<String>,
}

impl Default for PathPolicy {
    fn default() -> Self {
        Self {
            always_allowed: BUILTIN_ALWAYS_ALLOWED.iter().map(|p| p.to_string()).collect(),
            always_allowed_exact: Vec::new(),
            protected: BUILTIN_PROTECTED.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl PathPolicy {
    /// Built-in lists plus a comma-separated list of extra protected prefixes.
    pub fn with_custom_protected(raw: &str) -> Self {
        let mut policy = Self::default();
        for prefix in parse_prefix_list(raw) {
            policy.add_protected(prefix);
        }
        policy
    }

    /// Add a protected prefix, ignoring duplicates.
    pub fn add_protected(&mut self, prefix: String) {
        if !self.protected.contains(&prefix) {
            self.protected.push(prefix);
        }
    }

    /// Add an always-allowed path that matches only itself.
    pub fn add_always_allowed_exact(&mut self, path: String) {
        if !path.is_empty() && !self.always_allowed_exact.contains(&path) {
            self.always_allowed_exact.push(path);
        }
    }

    /// Whether any protected prefix covers `path`.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|p| matches_prefix(p, path))
    }

    pub fn always_allowed(&self) -> &[String] {
        &self.always_allowed
    }

    pub fn protected(&self) -> &[String] {
        &self.protected
    }

    /// Classify a request target. Always-allowed wins over protected.
    pub fn classify(&self, target: &str) -> PathClass {
        let path = path_component(target);

        if self.always_allowed_exact.iter().any(|e| e == path)
            || self.always_allowed.iter().any(|e| matches_prefix(e, path))
        {
            return PathClass::AlwaysAllowed;
        }
        if self.is_protected(path) {
            return PathClass::Protected;
        }
        PathClass::PubliclyAllowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_boundaries() {
        assert!(matches_prefix("/reports", "/reports"));
        assert!(matches_prefix("/reports", "/reports/q1"));
        assert!(!matches_prefix("/reports", "/reports-public"));
        assert!(!matches_prefix("/config", "/configuration"));
        assert!(matches_prefix("/api/auth/", "/api/auth/login"));
        assert!(matches_prefix("/api/auth/", "/api/auth/"));
        assert!(!matches_prefix("/api/auth/", "/api/auth"));
        assert!(!matches_prefix("", "/anything"));
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert!(!matches_prefix("/admin", "/Admin"));
        assert_eq!(PathPolicy::default().classify("/ADMIN"), PathClass::PubliclyAllowed);
    }

    #[test]
    fn test_parse_prefix_list() {
        assert_eq!(
            parse_prefix_list(" /reports , ,/ops,,"),
            vec!["/reports".to_string(), "/ops".to_string()]
        );
        assert!(parse_prefix_list("").is_empty());
        assert!(parse_prefix_list(" , ").is_empty());
    }

    #[test]
    fn test_builtin_classification() {
        let policy = PathPolicy::default();
        assert_eq!(policy.classify("/admin"), PathClass::Protected);
        assert_eq!(policy.classify("/admin/users"), PathClass::Protected);
        assert_eq!(policy.classify("/settings"), PathClass::Protected);
        assert_eq!(policy.classify("/links/42"), PathClass::Protected);
        assert_eq!(policy.classify("/config"), PathClass::Protected);
        assert_eq!(policy.classify("/configuration"), PathClass::PubliclyAllowed);
        assert_eq!(policy.classify("/login"), PathClass::AlwaysAllowed);
        assert_eq!(policy.classify("/s/abc"), PathClass::AlwaysAllowed);
        assert_eq!(policy.classify("/favicon.ico"), PathClass::AlwaysAllowed);
        assert_eq!(policy.classify("/"), PathClass::PubliclyAllowed);
        assert_eq!(policy.classify("/about"), PathClass::PubliclyAllowed);
    }

    #[test]
    fn test_always_allowed_wins_over_protected() {
        let mut policy = PathPolicy::with_custom_protected("/api");
        assert_eq!(policy.classify("/api/auth/login"), PathClass::AlwaysAllowed);
        assert_eq!(policy.classify("/api/sub"), PathClass::AlwaysAllowed);
        assert_eq!(policy.classify("/api/links"), PathClass::Protected);

        policy.add_always_allowed_exact("/admin/public".to_string());
        assert_eq!(policy.classify("/admin/public"), PathClass::AlwaysAllowed);
        assert_eq!(policy.classify("/admin/private"), PathClass::Protected);
    }

    #[test]
    fn test_exact_carve_out_does_not_cover_subpaths() {
        let mut policy = PathPolicy::default();
        policy.add_always_allowed_exact("/admin".to_string());
        policy.add_always_allowed_exact("/".to_string());

        assert_eq!(policy.classify("/admin"), PathClass::AlwaysAllowed);
        assert_eq!(policy.classify("/admin?x=1"), PathClass::AlwaysAllowed);
        assert_eq!(policy.classify("/admin/session"), PathClass::Protected);
        assert_eq!(policy.classify("/"), PathClass::AlwaysAllowed);
        assert_eq!(policy.classify("/settings"), PathClass::Protected);
    }

    #[test]
    fn test_custom_protected_prefixes() {
        let policy = PathPolicy::with_custom_protected("/reports,/ops");
        assert_eq!(policy.classify("/reports/q1"), PathClass::Protected);
        assert_eq!(policy.classify("/ops/status"), PathClass::Protected);
        assert_eq!(policy.classify("/reports-public"), PathClass::PubliclyAllowed);
        assert_eq!(policy.classify("/admin"), PathClass::Protected);
    }

    #[test]
    fn test_custom_protected_deduplicated() {
        let policy = PathPolicy::with_custom_protected("/admin, /ops, /ops");
        assert_eq!(policy.protected().len(), BUILTIN_PROTECTED.len() + 1);
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        let policy = PathPolicy::default();
        assert_eq!(path_component("/admin?x=1#top"), "/admin");
        assert_eq!(path_component("/admin#top"), "/admin");
        assert_eq!(policy.classify("/admin?next=/login"), PathClass::Protected);
        assert_eq!(policy.classify("/about?to=/admin"), PathClass::PubliclyAllowed);
    }
}
