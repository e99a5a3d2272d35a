use crate::prelude::eprintln;
use serde::Deserialize;

use super::{parse_args, to_call_result, JsonRpcError};

pub fn handle_hash_identify(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct HashIdentifyArgs {
        hash: String,
    }

    let args: HashIdentifyArgs = parse_args(arguments)?;

    if global.verbose {
        eprintln!("Calling hash_identify: hash={}", args.hash);
    }

    to_call_result(Ok(crate::hash::identify_data(&args.hash)))
}
