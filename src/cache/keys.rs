// Cache key construction.
// Keys join a logical prefix with every discriminating parameter, escaping the separator.

const SEPARATOR: char = ':';

/// Key for a repository's composed data.
pub fn repo_key(full_name: &str) -> String {
    cache_key("repo", &[full_name])
}

/// Key for a user's activity feed.
pub fn activity_key(username: &str) -> String {
    cache_key("activity", &[username])
}

/// Key for a user's contribution calendar.
pub fn contributions_key(username: &str) -> String {
    cache_key("contributions", &[username])
}

/// Key for a user's profile statistics.
pub fn stats_key(username: &str) -> String {
    cache_key("stats", &[username])
}

/// Join `prefix` and `parts` with the separator.
///
/// Parts are escaped so that distinct parameter lists never produce the same key.
pub fn cache_key(prefix: &str, parts: &[&str]) -> String {
    let mut key = escape_part(prefix);
    for part in parts {
        key.push(SEPARATOR);
        key.push_str(&escape_part(part));
    }
    key
}

/// Percent-escape the separator and the escape character itself.
fn escape_part(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => out.push_str("%25"),
            SEPARATOR => out.push_str("%3A"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_part() {
        assert_eq!(escape_part("simple"), "simple");
        assert_eq!(escape_part("a:b"), "a%3Ab");
        assert_eq!(escape_part("100%"), "100%25");
    }

    #[test]
    fn test_keys_are_deterministic() {
        assert_eq!(repo_key("octo/demo"), repo_key("octo/demo"));
        assert_eq!(repo_key("octo/demo"), "repo:octo/demo");
        assert_eq!(stats_key("octo"), "stats:octo");
    }

    #[test]
    fn test_prefixes_and_params_do_not_collide() {
        assert_ne!(activity_key("octo"), contributions_key("octo"));
        assert_ne!(activity_key("octo"), activity_key("octa"));
        assert_ne!(cache_key("p", &["a:b", "c"]), cache_key("p", &["a", "b:c"]));
        assert_ne!(cache_key("p", &["a%3Ab"]), cache_key("p", &["a:b"]));
    }
}
