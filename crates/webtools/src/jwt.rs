use crate::prelude::{println, *};
use colored::Colorize;
use webtools_core::jwt::{self, claim_times, Algorithm, ClaimTimes, DecodedJwt};

#[derive(Debug, clap::Parser)]
#[command(name = "jwt")]
#[command(about = "Decode, verify and sign JSON Web Tokens")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Decode a token without checking its signature
    #[clap(name = "decode")]
    Decode(DecodeOptions),

    /// Verify an HS256/HS384/HS512 signature
    #[clap(name = "verify")]
    Verify(VerifyOptions),

    /// Create a signed token from a JSON payload
    #[clap(name = "sign")]
    Sign(SignOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct DecodeOptions {
    /// Token to decode
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct VerifyOptions {
    /// Token to verify
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Shared HMAC secret
    #[arg(short, long, env = "JWT_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct SignOptions {
    /// Payload as a JSON object
    #[arg(value_name = "PAYLOAD")]
    pub payload: String,

    /// Shared HMAC secret
    #[arg(short, long, env = "JWT_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Algorithm: HS256, HS384 or HS512
    #[arg(short, long, default_value = "HS256")]
    pub alg: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DecodeOutput {
    #[serde(flatten)]
    pub token: DecodedJwt,
    pub claims: ClaimTimes,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct VerifyOutput {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Decode(options) => decode(options),
        Commands::Verify(options) => verify(options, global),
        Commands::Sign(options) => sign(options),
    }
}

/// Public function for MCP reuse
pub fn decode_data(token: &str) -> Result<DecodeOutput> {
    let decoded = jwt::decode(token).map_err(|e| Error::InvalidInput(e.to_string()))?;
    let claims = claim_times(&decoded.payload, chrono::Utc::now());

    Ok(DecodeOutput {
        token: decoded,
        claims,
    })
}

/// Public function for MCP reuse
pub fn verify_data(token: &str, secret: &str) -> Result<VerifyOutput> {
    let valid =
        jwt::verify(token, secret.as_bytes()).map_err(|e| Error::InvalidInput(e.to_string()))?;
    let algorithm = jwt::decode(token)
        .ok()
        .and_then(|d| d.algorithm().map(String::from));

    Ok(VerifyOutput { valid, algorithm })
}

fn decode(options: DecodeOptions) -> Result<()> {
    let output = decode_data(&options.token)?;

    if options.json {
        return output_json(&output);
    }

    println!("{}", "HEADER".bright_cyan().bold());
    println!("{}", serde_json::to_string_pretty(&output.token.header)?);
    println!();
    println!("{}", "PAYLOAD".bright_cyan().bold());
    println!("{}", serde_json::to_string_pretty(&output.token.payload)?);
    println!();

    let claims = &output.claims;
    if let Some(iat) = &claims.issued_at {
        println!("{}: {}", "Issued at".green(), iat);
    }
    if let Some(nbf) = &claims.not_before {
        println!("{}: {}", "Not before".green(), nbf);
    }
    if let Some(exp) = &claims.expires_at {
        println!("{}: {}", "Expires at".green(), exp);
    }
    if claims.expired {
        println!("{}", "Token is expired".red().bold());
    }
    if claims.not_yet_valid {
        println!("{}", "Token is not valid yet".yellow().bold());
    }

    println!("{}: {}", "Signature".green(), output.token.signature.dimmed());

    Ok(())
}

fn verify(options: VerifyOptions, global: crate::Global) -> Result<()> {
    let output = verify_data(&options.token, &options.secret)?;

    if global.verbose {
        println!(
            "Algorithm: {}",
            output.algorithm.as_deref().unwrap_or("unknown")
        );
    }

    if options.json {
        return output_json(&output);
    }

    if output.valid {
        println!("{}", "Signature verified".green().bold());
        Ok(())
    } else {
        Err(eyre!("Invalid signature"))
    }
}

fn sign(options: SignOptions) -> Result<()> {
    let payload: serde_json::Value = serde_json::from_str(&options.payload)
        .map_err(|e| Error::InvalidInput(f!("Payload is not valid JSON: {e}")))?;
    let algorithm = Algorithm::parse(&options.alg).map_err(|e| Error::InvalidInput(e.to_string()))?;

    let token = jwt::sign(&payload, options.secret.as_bytes(), algorithm)
        .map_err(|e| Error::InvalidInput(e.to_string()))?;

    println!("{token}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_data_reports_claims() {
        let token = jwt::sign(&json!({"sub": "42", "exp": 1}), b"k", Algorithm::HS256).unwrap();
        let output = decode_data(&token).unwrap();

        assert_eq!(output.token.payload["sub"], "42");
        assert!(output.claims.expired);
    }

    #[test]
    fn test_verify_data() {
        let token = jwt::sign(&json!({"sub": "42"}), b"k", Algorithm::HS512).unwrap();

        let ok = verify_data(&token, "k").unwrap();
        assert!(ok.valid);
        assert_eq!(ok.algorithm.as_deref(), Some("HS512"));

        assert!(!verify_data(&token, "nope").unwrap().valid);
    }

    #[test]
    fn test_decode_data_malformed() {
        assert!(decode_data("only.two").is_err());
    }
}
