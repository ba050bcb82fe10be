//! Validated external IPv4 address
//!
//! Validation is deliberately syntactic: four dot-separated groups of one to
//! three ASCII digits. Octet ranges are not checked, so `999.999.999.999` is
//! accepted.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$")
        .expect("IPv4 pattern must compile")
});

/// Returns true if `candidate` looks like a dotted-quad IPv4 address
pub fn is_ipv4_like(candidate: &str) -> bool {
    IPV4_PATTERN.is_match(candidate)
}

/// An external IPv4 address that passed syntactic validation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicIp(String);

impl PublicIp {
    /// Validate and wrap an address string
    ///
    /// Returns `None` when the string is not a dotted quad. Surrounding
    /// whitespace is not stripped here; callers reading from files trim first.
    pub fn parse(candidate: &str) -> Option<Self> {
        is_ipv4_like(candidate).then(|| Self(candidate.to_string()))
    }

    /// The address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PublicIp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dotted_quads() {
        for ip in ["1.2.3.4", "192.168.1.1", "0.0.0.0", "255.255.255.255", "10.0.0.254"] {
            assert!(is_ipv4_like(ip), "{ip} should be accepted");
        }
    }

    #[test]
    fn accepts_out_of_range_octets() {
        // Lenient on purpose: syntax only, no range check
        assert!(is_ipv4_like("999.999.999.999"));
        assert!(PublicIp::parse("256.1.1.1").is_some());
    }

    #[test]
    fn rejects_wrong_segment_count() {
        for ip in ["1.2.3", "1.2.3.4.5", "1", "", "1..2.3"] {
            assert!(!is_ipv4_like(ip), "{ip:?} should be rejected");
        }
    }

    #[test]
    fn rejects_non_numeric_segments() {
        for ip in ["a.b.c.d", "1.2.3.x", "1.2.3.-4", "1.2.3.4 ", " 1.2.3.4", "1234.1.1.1"] {
            assert!(!is_ipv4_like(ip), "{ip:?} should be rejected");
        }
    }

    #[test]
    fn rejects_ipv6_and_non_ascii_digits() {
        assert!(!is_ipv4_like("2001:db8::1"));
        assert!(!is_ipv4_like("١.٢.٣.٤"));
    }

    #[test]
    fn display_round_trips_input() {
        let ip = PublicIp::parse("203.0.113.7").expect("valid");
        assert_eq!(ip.to_string(), "203.0.113.7");
        assert_eq!(ip.as_str(), "203.0.113.7");
    }
}
