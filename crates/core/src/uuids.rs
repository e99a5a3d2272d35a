//! UUID inspection and generation

use ::uuid::{Uuid, Variant, Version};
use chrono::DateTime;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UuidError {
    #[error("Invalid UUID '{input}': {message}")]
    Invalid { input: String, message: String },

    #[error("Unsupported UUID version for generation: v{0} (use 4 or 7)")]
    UnsupportedVersion(u8),

    #[error("Count must be at least 1")]
    ZeroCount,
}

/// Everything the viewer shows about one UUID
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UuidInfo {
    pub canonical: String,
    pub simple: String,
    pub urn: String,
    pub version: usize,
    pub version_name: &'static str,
    pub variant: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

fn version_name(uuid: &Uuid) -> &'static str {
    if uuid.is_nil() {
        return "nil";
    }
    if uuid.is_max() {
        return "max";
    }

    match uuid.get_version() {
        Some(Version::Mac) => "time-based (MAC)",
        Some(Version::Dce) => "DCE security",
        Some(Version::Md5) => "name-based (MD5)",
        Some(Version::Random) => "random",
        Some(Version::Sha1) => "name-based (SHA-1)",
        Some(Version::SortMac) => "reordered time-based",
        Some(Version::SortRand) => "Unix epoch time-based",
        Some(Version::Custom) => "custom",
        _ => "unknown",
    }
}

fn variant_name(variant: Variant) -> &'static str {
    match variant {
        Variant::NCS => "NCS (reserved)",
        Variant::RFC4122 => "RFC 4122",
        Variant::Microsoft => "Microsoft (reserved)",
        _ => "future (reserved)",
    }
}

/// Parse any accepted textual form and describe it.
///
/// Accepts hyphenated, simple (32 hex digits), braced and `urn:uuid:` forms.
pub fn inspect(input: &str) -> Result<UuidInfo, UuidError> {
    let trimmed = input.trim();
    let uuid = Uuid::parse_str(trimmed).map_err(|e| UuidError::Invalid {
        input: trimmed.to_string(),
        message: e.to_string(),
    })?;

    let timestamp = uuid.get_timestamp().and_then(|ts| {
        let (seconds, nanos) = ts.to_unix();
        DateTime::from_timestamp(seconds as i64, nanos).map(|dt| dt.to_rfc3339())
    });

    Ok(UuidInfo {
        canonical: uuid.hyphenated().to_string(),
        simple: uuid.simple().to_string(),
        urn: uuid.urn().to_string(),
        version: uuid.get_version_num(),
        version_name: version_name(&uuid),
        variant: variant_name(uuid.get_variant()),
        timestamp,
    })
}

/// Generate `count` UUIDs of the given version (4 or 7).
pub fn generate(version: u8, count: usize) -> Result<Vec<Uuid>, UuidError> {
    if count == 0 {
        return Err(UuidError::ZeroCount);
    }

    let make: fn() -> Uuid = match version {
        4 => Uuid::new_v4,
        7 => Uuid::now_v7,
        other => return Err(UuidError::UnsupportedVersion(other)),
    };

    Ok((0..count).map(|_| make()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_v4() {
        let info = inspect("f47ac10b-58cc-4372-a567-0e02b2c3d479").unwrap();

        assert_eq!(info.version, 4);
        assert_eq!(info.version_name, "random");
        assert_eq!(info.variant, "RFC 4122");
        assert_eq!(info.simple, "f47ac10b58cc4372a5670e02b2c3d479");
        assert!(info.timestamp.is_none());
    }

    #[test]
    fn test_inspect_accepts_other_forms() {
        let expected = "f47ac10b-58cc-4372-a567-0e02b2c3d479";

        for form in [
            "F47AC10B58CC4372A5670E02B2C3D479",
            "{f47ac10b-58cc-4372-a567-0e02b2c3d479}",
            "urn:uuid:f47ac10b-58cc-4372-a567-0e02b2c3d479",
        ] {
            assert_eq!(inspect(form).unwrap().canonical, expected, "{form}");
        }
    }

    #[test]
    fn test_inspect_v1_timestamp() {
        let info = inspect("c232ab00-9414-11ed-8080-808080808080").unwrap();

        assert_eq!(info.version, 1);
        assert_eq!(info.version_name, "time-based (MAC)");
        assert!(info.timestamp.is_some());
    }

    #[test]
    fn test_inspect_nil() {
        let info = inspect("00000000-0000-0000-0000-000000000000").unwrap();
        assert_eq!(info.version_name, "nil");
    }

    #[test]
    fn test_inspect_invalid() {
        assert!(matches!(
            inspect("not-a-uuid"),
            Err(UuidError::Invalid { .. })
        ));
    }

    #[test]
    fn test_generate_v7_has_timestamp() {
        let uuids = generate(7, 3).unwrap();
        assert_eq!(uuids.len(), 3);

        for uuid in uuids {
            let info = inspect(&uuid.to_string()).unwrap();
            assert_eq!(info.version, 7);
            assert!(info.timestamp.is_some());
        }
    }

    #[test]
    fn test_generate_v4_unique() {
        let uuids = generate(4, 2).unwrap();
        assert_ne!(uuids[0], uuids[1]);
    }

    #[test]
    fn test_generate_rejects_bad_input() {
        assert_eq!(generate(4, 0).unwrap_err(), UuidError::ZeroCount);
        assert_eq!(generate(5, 1).unwrap_err(), UuidError::UnsupportedVersion(5));
    }
}
