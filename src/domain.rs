//! Hostname canonicalization and level arithmetic for shared URLs.
//!
//! Every URL pulled out of a post goes through `canonical_domain` before any
//! counting or lookup. The compound-suffix handling (`is_exception`) is a
//! substring heuristic, not a public-suffix-list lookup: the pipeline only
//! needs rough source-site attribution, not exact eTLD+1.

/// Compound second-level suffixes that shift level arithmetic by one,
/// e.g. `google.co.uk` behaves like a 2nd-level domain.
const SUFFIX_EXCEPTIONS: [&str; 7] = [".com.", ".net.", ".org.", ".edu.", ".mil.", ".gov.", ".co."];

fn is_printable_ascii(c: char) -> bool {
    c.is_ascii_graphic() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Canonical hostname of a URL: printable ASCII only, lowercased, scheme /
/// port / path / query stripped, redundant `www`-style prefixes removed.
///
/// Total and idempotent; degenerate input yields an empty string.
pub fn canonical_domain(url: &str) -> String {
    let mut host: String = url.chars().filter(|c| is_printable_ascii(*c)).collect();
    host.make_ascii_lowercase();

    if let Some(idx) = host.find("://") {
        host.drain(..idx + 3);
    }
    if let Some(idx) = host.find(':') {
        host.truncate(idx);
    }
    if let Some(idx) = host.find('/') {
        host.truncate(idx);
    }
    if let Some(idx) = host.find('?') {
        host.truncate(idx);
    }

    loop {
        if let Some(rest) = host.strip_prefix("www.") {
            host = rest.to_string();
        } else if let Some(rest) = host.strip_prefix("www2.").or_else(|| host.strip_prefix("www3.")) {
            host = rest.to_string();
        } else {
            break;
        }
    }
    host
}

fn labels(host: &str) -> Vec<&str> {
    host.trim().split('.').filter(|p| !p.is_empty()).collect()
}

/// True iff the host is a dotted-quad IPv4 address (exactly four numeric
/// labels, each in 0..=255, after dropping empty labels).
pub fn is_ip_address(host: &str) -> bool {
    let parts = labels(host);
    parts.len() == 4
        && parts.iter().all(|p| {
            p.bytes().all(|b| b.is_ascii_digit()) && p.parse::<u32>().map(|n| n <= 255).unwrap_or(false)
        })
}

/// Number of non-empty dot-separated labels; 0 for blank input.
pub fn domain_level(host: &str) -> usize {
    labels(host).len()
}

/// Heuristic compound-suffix test: does the host contain a marker like
/// `.co.` or `.com.` anywhere? Catches `google.co.uk` and `hire.mil.gov`,
/// also `indiana.edu.us`; misses the long tail a real suffix list would have.
pub fn is_exception(host: &str) -> bool {
    SUFFIX_EXCEPTIONS.iter().any(|e| host.contains(e))
}

/// The last `n` non-empty labels joined with dots; the whole (normalized)
/// host when it has `n` labels or fewer.
pub fn nth_level_domain(host: &str, n: usize) -> String {
    let parts = labels(host);
    if parts.len() <= n {
        parts.join(".")
    } else {
        parts[parts.len() - n..].join(".")
    }
}

/// Reduce (or keep) a host at the requested level. IP addresses pass through
/// unchanged apart from label normalization; exception hosts get one extra
/// label so their compound suffix counts as a single level.
pub fn change_domain_level(host: &str, level: usize) -> String {
    if is_ip_address(host) {
        labels(host).join(".")
    } else if is_exception(host) {
        nth_level_domain(host, level + 1)
    } else {
        nth_level_domain(host, level)
    }
}

/// Strict ancestor domains of `host`, from one level below the full host
/// down to level 2 (level 3 for exception hosts), inclusive. Never includes
/// the host itself, the bare TLD, or a bare compound suffix.
pub fn parents(host: &str) -> Vec<String> {
    let dl = domain_level(host);
    let floor = if is_exception(host) { 3 } else { 2 };
    if dl <= floor {
        return Vec::new();
    }
    (floor..dl).rev().map(|level| nth_level_domain(host, level)).collect()
}
