use crate::prelude::eprintln;
use serde::Deserialize;

use super::{parse_args, to_call_result, JsonRpcError};

pub fn handle_uuid_inspect(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct UuidInspectArgs {
        uuid: String,
    }

    let args: UuidInspectArgs = parse_args(arguments)?;

    if global.verbose {
        eprintln!("Calling uuid_inspect: uuid={}", args.uuid);
    }

    to_call_result(crate::uuid::inspect_data(&args.uuid))
}
