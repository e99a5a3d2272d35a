use crate::prelude::eprintln;
use serde::Deserialize;

use super::{parse_args, to_call_result, JsonRpcError};

pub fn handle_jwt_decode(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct JwtDecodeArgs {
        token: String,
    }

    let args: JwtDecodeArgs = parse_args(arguments)?;

    if global.verbose {
        eprintln!("Calling jwt_decode: {} bytes", args.token.len());
    }

    to_call_result(crate::jwt::decode_data(&args.token))
}

pub fn handle_jwt_verify(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct JwtVerifyArgs {
        token: String,
        secret: String,
    }

    let args: JwtVerifyArgs = parse_args(arguments)?;

    // Never echo the secret.
    if global.verbose {
        eprintln!("Calling jwt_verify: {} bytes", args.token.len());
    }

    to_call_result(crate::jwt::verify_data(&args.token, &args.secret))
}
