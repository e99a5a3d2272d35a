use crate::prelude::{println, *};
use colored::Colorize;
use std::io::Read;
use std::path::PathBuf;
use webtools_core::hash::{digests, identify, DigestOutput};

#[derive(Debug, clap::Parser)]
#[command(name = "hash")]
#[command(about = "Identify hash algorithms and compute digests")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Guess which algorithm produced a digest
    #[clap(name = "identify")]
    Identify(IdentifyOptions),

    /// Compute MD5 and SHA-2 digests of text, a file, or stdin
    #[clap(name = "digest")]
    Digest(DigestOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct IdentifyOptions {
    /// Digest to analyze
    #[arg(value_name = "HASH")]
    pub hash: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct DigestOptions {
    /// Text to hash; reads stdin when neither TEXT nor --file is given
    #[arg(value_name = "TEXT", conflicts_with = "file")]
    pub text: Option<String>,

    /// Hash the contents of a file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct IdentifyOutput {
    pub input: String,
    pub length: usize,
    pub candidates: Vec<String>,
}

pub async fn run(app: App, _global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Identify(options) => identify_cmd(options),
        Commands::Digest(options) => digest_cmd(options),
    }
}

/// Public function for MCP reuse
pub fn identify_data(input: &str) -> IdentifyOutput {
    let trimmed = input.trim();

    IdentifyOutput {
        input: trimmed.to_string(),
        length: trimmed.chars().count(),
        candidates: identify(trimmed)
            .into_iter()
            .map(|p| p.name.to_string())
            .collect(),
    }
}

fn identify_cmd(options: IdentifyOptions) -> Result<()> {
    let output = identify_data(&options.hash);

    if options.json {
        return output_json(&output);
    }

    if output.candidates.is_empty() {
        println!(
            "{} (length {})",
            "No matching hash type".yellow(),
            output.length
        );
        return Ok(());
    }

    println!("{} (length {})", "Possible hash types".green().bold(), output.length);
    for candidate in &output.candidates {
        println!("  - {}", candidate);
    }

    Ok(())
}

fn digest_cmd(options: DigestOptions) -> Result<()> {
    let data = match (&options.text, &options.file) {
        (Some(text), _) => text.as_bytes().to_vec(),
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| f!("Failed to read {}", path.display()))?
        }
        (None, None) => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let output: Vec<DigestOutput> = digests(&data);

    if options.json {
        return output_json(&output);
    }

    let mut table = new_table();
    for digest in &output {
        table.add_row(prettytable::row![b -> digest.algorithm, digest.hex]);
    }
    table.printstd();

    Ok(())
}
