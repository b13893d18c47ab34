//! Semantic version ranges and git-log version discovery.
//!
//! A range follows the common `MAJOR[.MINOR[.PATCH]]` convention: `"1"` means
//! `>=1.0.0, <2.0.0`, `"1.2"` means `>=1.2.0, <2.0.0`, and `"*"` matches
//! anything. Resolved versions may also be partial (`"1.2"`); they are
//! zero-padded before comparison.

use semver::{Version, VersionReq};

/// Does `version` satisfy `range`? A `*` on either side always matches;
/// malformed input simply fails the match.
pub fn semver_match(range: &str, version: &str) -> bool {
    let range = range.trim();
    let version = version.trim();
    if range.is_empty() || range == "*" || version == "*" {
        return true;
    }
    let Ok(req) = VersionReq::parse(range) else {
        return false;
    };
    let Ok(ver) = Version::parse(&pad_version(version)) else {
        return false;
    };
    req.matches(&ver)
}

/// Pad a partial version with zeros, e.g. `"1"` -> `"1.0.0"`.
fn pad_version(version: &str) -> String {
    match version.bytes().filter(|&b| b == b'.').count() {
        0 => format!("{version}.0.0"),
        1 => format!("{version}.0"),
        _ => version.to_string(),
    }
}

const VER_INTRODUCERS: [&str; 3] = ["version", "ver", "v"];

/// Scan one line of text for a semver token introduced by `v`, `ver` or
/// `version` (case-insensitive), e.g. `cba1855 fixes #271 v1.2.1 tidy`.
pub fn find_version_in_line(line: &str) -> Option<String> {
    let bytes = line.as_bytes();
    for i in 0..bytes.len() {
        if !bytes[i].eq_ignore_ascii_case(&b'v') {
            continue;
        }
        let rest = &line[i..];
        for intro in VER_INTRODUCERS {
            if rest.len() >= intro.len() && rest[..intro.len()].eq_ignore_ascii_case(intro) {
                if let Some(ver) = leading_semver(rest[intro.len()..].trim_start()) {
                    return Some(ver);
                }
            }
        }
    }
    None
}

/// Extract a leading `digits[.digits[.digits]]` token, if any.
fn leading_semver(text: &str) -> Option<String> {
    let end = text
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(text.len());
    let token = text[..end].trim_end_matches('.');
    if token.is_empty() || !token.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(token.to_string())
}

/// Scan `git log --oneline` output for the first commit whose message carries
/// a version satisfying `range`. The leading token of the line must be a hex
/// SHA. Returns `(sha, version)`.
pub fn find_sha_for_range(log: &str, range: &str) -> Option<(String, String)> {
    for line in log.lines() {
        let Some(ver) = find_version_in_line(line) else {
            continue;
        };
        if !semver_match(range, &ver) {
            continue;
        }
        if !line.starts_with(|c: char| c.is_ascii_hexdigit()) {
            continue;
        }
        let sha = line.split_whitespace().next()?;
        return Some((sha.to_string(), ver));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_matches_anything() {
        assert!(semver_match("*", "1.2.3"));
        assert!(semver_match("*", "*"));
        assert!(semver_match("1.2", "*"));
    }

    #[test]
    fn test_major_range() {
        assert!(semver_match("1", "1.0.0"));
        assert!(semver_match("1", "1.9.4"));
        assert!(!semver_match("1", "2.0.0"));
        assert!(!semver_match("2", "1.9.9"));
    }

    #[test]
    fn test_minor_range() {
        assert!(semver_match("1.2", "1.2.0"));
        assert!(semver_match("1.2", "1.3.7"));
        assert!(!semver_match("1.2", "1.1.9"));
        assert!(!semver_match("1.2", "2.0.0"));
    }

    #[test]
    fn test_partial_versions_are_padded() {
        assert!(semver_match("1", "1"));
        assert!(semver_match("1.2", "1.2"));
        assert!(!semver_match("1.2", "1"));
    }

    #[test]
    fn test_garbage_does_not_match() {
        assert!(!semver_match("1.x", "1.0.0"));
        assert!(!semver_match("1", "banana"));
    }

    #[test]
    fn test_find_version_in_line() {
        assert_eq!(
            find_version_in_line("cba1855 fixes #271 v1.2.1 Added stuff"),
            Some("1.2.1".to_string())
        );
        assert_eq!(
            find_version_in_line("9f2c1aa bump Version 2.0"),
            Some("2.0".to_string())
        );
        assert_eq!(
            find_version_in_line("13ab770 ver 3 release"),
            Some("3".to_string())
        );
        assert_eq!(find_version_in_line("77aa001 improve flavor of output"), None);
        assert_eq!(find_version_in_line("20cc3d1 no release here"), None);
    }

    #[test]
    fn test_find_sha_for_range() {
        let log = "\
aaa111 work in progress\n\
bbb222 prep v2.1.0 release\n\
ccc333 v1.4.2 older release\n";
        assert_eq!(
            find_sha_for_range(log, "2"),
            Some(("bbb222".to_string(), "2.1.0".to_string()))
        );
        assert_eq!(
            find_sha_for_range(log, "1.4"),
            Some(("ccc333".to_string(), "1.4.2".to_string()))
        );
        assert_eq!(find_sha_for_range(log, "3"), None);
    }

    #[test]
    fn test_sha_must_lead_with_hex() {
        let log = "zz999 tagged v1.0.0\n";
        assert_eq!(find_sha_for_range(log, "1"), None);
    }
}
