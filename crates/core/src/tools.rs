use serde::Serialize;

/// Metadata for one tool, used by `webtools tools` and the MCP listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub command: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

pub const TOOLS: &[ToolInfo] = &[
    ToolInfo {
        name: "Favicon Generator",
        command: "favicon",
        category: "images",
        description: "Rasterize an image to 16, 32 and 48 px PNGs and pack them into favicon.ico",
    },
    ToolInfo {
        name: "Unit Converter",
        command: "units",
        category: "converters",
        description: "Convert length, mass, time and temperature values between units",
    },
    ToolInfo {
        name: "Data Size Converter",
        command: "units",
        category: "converters",
        description: "Convert between bits, SI bytes (kB, MB) and IEC bytes (KiB, MiB)",
    },
    ToolInfo {
        name: "JWT Viewer",
        command: "jwt",
        category: "security",
        description: "Decode JSON Web Tokens and verify or create HMAC signatures",
    },
    ToolInfo {
        name: "Hash Analyzer",
        command: "hash",
        category: "security",
        description: "Identify likely hash algorithms from a digest and compute MD5/SHA-2 digests",
    },
    ToolInfo {
        name: "UUID Viewer",
        command: "uuid",
        category: "generators",
        description: "Inspect UUID version, variant and timestamp, or generate v4/v7 UUIDs",
    },
    ToolInfo {
        name: "Package Version Checker",
        command: "deps",
        category: "developer",
        description: "Check package.json dependencies against the latest npm registry versions",
    },
];

/// Find a tool by its display name or command, case-insensitively.
///
/// When several tools share a command the first one wins.
pub fn find_tool(query: &str) -> Option<&'static ToolInfo> {
    let query = query.trim();
    TOOLS
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(query) || t.command.eq_ignore_ascii_case(query))
}

/// Tools grouped under a category, in manifest order
pub fn tools_in_category(category: &str) -> Vec<&'static ToolInfo> {
    TOOLS
        .iter()
        .filter(|t| t.category.eq_ignore_ascii_case(category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tool_names_unique() {
        let names: HashSet<_> = TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), TOOLS.len());
    }

    #[test]
    fn test_find_tool_by_command() {
        assert_eq!(find_tool("JWT").unwrap().name, "JWT Viewer");
        assert_eq!(find_tool("units").unwrap().name, "Unit Converter");
    }

    #[test]
    fn test_find_tool_by_name() {
        assert_eq!(find_tool("hash analyzer").unwrap().command, "hash");
        assert!(find_tool("tier list").is_none());
    }

    #[test]
    fn test_tools_in_category() {
        let converters = tools_in_category("converters");
        assert_eq!(converters.len(), 2);
    }
}
