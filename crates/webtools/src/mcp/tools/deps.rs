use crate::prelude::{eprintln, *};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use webtools_core::deps::DependencyReport;

use super::{parse_args, to_call_result, JsonRpcError};

pub async fn handle_deps_check(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct DepsCheckArgs {
        manifest: Option<PathBuf>,
        refresh: Option<bool>,
    }

    let args: DepsCheckArgs = parse_args(arguments)?;
    let manifest = args
        .manifest
        .unwrap_or_else(|| PathBuf::from("package.json"));
    let registry = std::env::var("NPM_REGISTRY_URL")
        .unwrap_or_else(|_| crate::deps::DEFAULT_REGISTRY.to_string());

    if global.verbose {
        eprintln!(
            "Calling deps_check: manifest={}, registry={}",
            manifest.display(),
            registry
        );
    }

    to_call_result(check(&manifest, &registry, args.refresh.unwrap_or(false)).await)
}

async fn check(manifest: &Path, registry: &str, refresh: bool) -> Result<Vec<DependencyReport>> {
    let content = std::fs::read_to_string(manifest)
        .with_context(|| f!("Failed to read {}", manifest.display()))?;
    let cache_dir =
        crate::deps::resolve_cache_dir(std::env::var_os("WEBTOOLS_CACHE_DIR").map(PathBuf::from))?;

    crate::deps::check_data(&content, registry, &cache_dir, refresh).await
}
