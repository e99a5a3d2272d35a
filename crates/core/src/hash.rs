//! Hash identification and digest generation

use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::sync::OnceLock;

/// A known hash output shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashPattern {
    pub name: &'static str,
    /// Exact character length of the textual digest
    pub length: usize,
    #[serde(skip)]
    pub pattern: &'static str,
}

const fn pattern(name: &'static str, length: usize, pattern: &'static str) -> HashPattern {
    HashPattern {
        name,
        length,
        pattern,
    }
}

pub const HASH_PATTERNS: &[HashPattern] = &[
    pattern("CRC32", 8, r"^[a-fA-F0-9]{8}$"),
    pattern("MySQL323", 16, r"^[a-fA-F0-9]{16}$"),
    pattern("MD5", 32, r"^[a-fA-F0-9]{32}$"),
    pattern("NTLM", 32, r"^[a-fA-F0-9]{32}$"),
    pattern("SHA-1", 40, r"^[a-fA-F0-9]{40}$"),
    pattern("RIPEMD-160", 40, r"^[a-fA-F0-9]{40}$"),
    pattern("MySQL5", 41, r"^\*[a-fA-F0-9]{40}$"),
    pattern("SHA-224", 56, r"^[a-fA-F0-9]{56}$"),
    pattern("SHA-256", 64, r"^[a-fA-F0-9]{64}$"),
    pattern("SHA3-256", 64, r"^[a-fA-F0-9]{64}$"),
    pattern("BLAKE2s-256", 64, r"^[a-fA-F0-9]{64}$"),
    pattern("SHA-384", 96, r"^[a-fA-F0-9]{96}$"),
    pattern("SHA-512", 128, r"^[a-fA-F0-9]{128}$"),
    pattern("SHA3-512", 128, r"^[a-fA-F0-9]{128}$"),
    pattern("Whirlpool", 128, r"^[a-fA-F0-9]{128}$"),
    pattern("bcrypt", 60, r"^\$2[abxy]?\$\d{2}\$[./A-Za-z0-9]{53}$"),
];

fn compiled() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        HASH_PATTERNS
            .iter()
            .map(|p| Regex::new(p.pattern).expect("hash patterns are valid regexes"))
            .collect()
    })
}

/// Every pattern whose length equals the input's and whose regex matches.
pub fn identify(input: &str) -> Vec<&'static HashPattern> {
    let trimmed = input.trim();
    let length = trimmed.chars().count();

    HASH_PATTERNS
        .iter()
        .zip(compiled())
        .filter(|(p, re)| p.length == length && re.is_match(trimmed))
        .map(|(p, _)| p)
        .collect()
}

/// A named hex digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestOutput {
    pub algorithm: &'static str,
    pub hex: String,
}

fn hex_digest<D: Digest>(data: &[u8]) -> String {
    D::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// MD5 and SHA-2 digests of `data`, in a fixed order.
pub fn digests(data: &[u8]) -> Vec<DigestOutput> {
    vec![
        DigestOutput {
            algorithm: "MD5",
            hex: format!("{:x}", md5::compute(data)),
        },
        DigestOutput {
            algorithm: "SHA-224",
            hex: hex_digest::<Sha224>(data),
        },
        DigestOutput {
            algorithm: "SHA-256",
            hex: hex_digest::<Sha256>(data),
        },
        DigestOutput {
            algorithm: "SHA-384",
            hex: hex_digest::<Sha384>(data),
        },
        DigestOutput {
            algorithm: "SHA-512",
            hex: hex_digest::<Sha512>(data),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(matches: &[&HashPattern]) -> Vec<&'static str> {
        matches.iter().map(|p| p.name).collect()
    }

    #[test]
    fn test_identify_md5() {
        let matches = identify("5d41402abc4b2a76b9719d911017c592");
        assert_eq!(names(&matches), vec!["MD5", "NTLM"]);
    }

    #[test]
    fn test_identify_sha256_uppercase() {
        let matches =
            identify("2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824");
        assert!(names(&matches).contains(&"SHA-256"));
    }

    #[test]
    fn test_identify_requires_exact_length() {
        // 31 hex chars, one short of MD5
        assert!(identify("5d41402abc4b2a76b9719d911017c59").is_empty());
    }

    #[test]
    fn test_identify_rejects_non_hex() {
        assert!(identify("zz41402abc4b2a76b9719d911017c592").is_empty());
    }

    #[test]
    fn test_identify_trims_whitespace() {
        let matches = identify("  aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d\n");
        assert_eq!(names(&matches), vec!["SHA-1", "RIPEMD-160"]);
    }

    #[test]
    fn test_identify_bcrypt() {
        let matches = identify("$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW");
        assert_eq!(names(&matches), vec!["bcrypt"]);
    }

    #[test]
    fn test_identify_matches_declared_length() {
        for p in HASH_PATTERNS.iter().filter(|p| p.pattern.contains("a-fA-F0-9]{")) {
            if p.name == "MySQL5" {
                continue;
            }
            let sample = "a".repeat(p.length);
            let matches = identify(&sample);
            assert!(matches.iter().any(|m| m.name == p.name), "{}", p.name);
            assert!(matches.iter().all(|m| m.length == sample.len()));
        }
    }

    #[test]
    fn test_digests_hello() {
        let out = digests(b"hello");

        assert_eq!(out[0].algorithm, "MD5");
        assert_eq!(out[0].hex, "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(out[2].algorithm, "SHA-256");
        assert_eq!(
            out[2].hex,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_digests_are_identifiable() {
        for digest in digests(b"webtools") {
            let matches = identify(&digest.hex);
            assert!(
                matches.iter().any(|m| m.name == digest.algorithm),
                "{}",
                digest.algorithm
            );
        }
    }
}
