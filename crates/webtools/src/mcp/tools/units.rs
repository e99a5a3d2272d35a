use crate::prelude::eprintln;
use serde::Deserialize;

use super::{parse_args, to_call_result, JsonRpcError};

pub fn handle_units_convert(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct UnitsConvertArgs {
        value: serde_json::Value,
        from: String,
        to: Option<String>,
    }

    let args: UnitsConvertArgs = parse_args(arguments)?;

    // Clients send numbers as either JSON numbers or strings.
    let value = match &args.value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if global.verbose {
        eprintln!(
            "Calling units_convert: value={}, from={}, to={:?}",
            value, args.from, args.to
        );
    }

    to_call_result(crate::units::convert_data(
        &value,
        &args.from,
        args.to.as_deref(),
    ))
}
