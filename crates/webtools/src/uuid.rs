use crate::prelude::{println, *};
use colored::Colorize;
use webtools_core::uuids::{generate, inspect, UuidInfo};

#[derive(Debug, clap::Parser)]
#[command(name = "uuid")]
#[command(about = "Inspect and generate UUIDs")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Show version, variant and timestamp of a UUID
    #[clap(name = "inspect")]
    Inspect(InspectOptions),

    /// Generate new UUIDs
    #[clap(name = "new")]
    New(NewOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct InspectOptions {
    /// UUID in hyphenated, simple, braced or URN form
    #[arg(value_name = "UUID")]
    pub uuid: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct NewOptions {
    /// UUID version (4 or 7)
    #[arg(short = 'v', long = "uuid-version", default_value = "4")]
    pub uuid_version: u8,

    /// How many to generate
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Print in uppercase
    #[arg(long)]
    pub upper: bool,
}

pub async fn run(app: App, _global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Inspect(options) => inspect_cmd(options),
        Commands::New(options) => new_cmd(options),
    }
}

/// Public function for MCP reuse
pub fn inspect_data(input: &str) -> Result<UuidInfo> {
    inspect(input).map_err(|e| Error::InvalidInput(e.to_string()).into())
}

fn inspect_cmd(options: InspectOptions) -> Result<()> {
    let info = inspect_data(&options.uuid)?;

    if options.json {
        return output_json(&info);
    }

    println!("{}: {}", "UUID".green(), info.canonical.bold());
    println!("{}: {} ({})", "Version".green(), info.version, info.version_name);
    println!("{}: {}", "Variant".green(), info.variant);
    if let Some(timestamp) = &info.timestamp {
        println!("{}: {}", "Timestamp".green(), timestamp);
    }
    println!("{}: {}", "Simple".green(), info.simple.dimmed());
    println!("{}: {}", "URN".green(), info.urn.dimmed());

    Ok(())
}

fn new_cmd(options: NewOptions) -> Result<()> {
    let uuids = generate(options.uuid_version, options.count)
        .map_err(|e| Error::InvalidInput(e.to_string()))?;

    for uuid in uuids {
        let text = uuid.hyphenated().to_string();
        if options.upper {
            println!("{}", text.to_uppercase());
        } else {
            println!("{}", text);
        }
    }

    Ok(())
}
