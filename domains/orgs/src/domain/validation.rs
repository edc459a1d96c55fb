//! Validation helpers and constants for organization fields

use regex::Regex;

lazy_static::lazy_static! {
    /// Organization slug validation regex
    /// Allows lowercase alphanumeric characters with hyphens
    /// No leading/trailing hyphens, minimum 1 character
    pub static ref ORG_SLUG_REGEX: Regex =
        Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap();
}

/// Validate an organization slug according to the rules
pub fn validate_org_slug(slug: &str) -> bool {
    // Check basic format with regex
    if !ORG_SLUG_REGEX.is_match(slug) {
        return false;
    }

    // Check for double hyphens
    if slug.contains("--") {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_org_slug_validation() {
        // Valid slugs
        assert!(validate_org_slug("a"));
        assert!(validate_org_slug("muckrake"));
        assert!(validate_org_slug("muck-rake"));
        assert!(validate_org_slug("newsroom-2024"));
        assert!(validate_org_slug("org1"));
        assert!(validate_org_slug("a1b2c3"));

        // Invalid slugs
        assert!(!validate_org_slug(""));
        assert!(!validate_org_slug("-org"));
        assert!(!validate_org_slug("org-"));
        assert!(!validate_org_slug("-org-"));
        assert!(!validate_org_slug("Org"));
        assert!(!validate_org_slug("org_name"));
        assert!(!validate_org_slug("org.name"));
        assert!(!validate_org_slug("org name"));
        assert!(!validate_org_slug("org--name"));
    }
}
