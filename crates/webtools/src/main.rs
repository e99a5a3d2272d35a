use crate::prelude::*;
use clap::Parser;

mod deps;
mod error;
mod favicon;
mod hash;
mod jwt;
mod mcp;
mod prelude;
mod tools;
mod units;
mod uuid;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Small, self-contained developer utilities"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "WEBTOOLS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Generate or inspect favicon.ico files
    Favicon(crate::favicon::App),

    /// Convert values between units (length, mass, time, data size, temperature)
    Units(crate::units::App),

    /// Decode, verify and sign JSON Web Tokens
    Jwt(crate::jwt::App),

    /// Identify hash algorithms and compute digests
    Hash(crate::hash::App),

    /// Inspect and generate UUIDs
    Uuid(crate::uuid::App),

    /// Check package.json dependencies against the npm registry
    Deps(crate::deps::App),

    /// List available tools
    Tools(crate::tools::App),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();
    log::debug!("parsed command: {:?}", app.command);

    match app.command {
        SubCommands::Favicon(sub_app) => crate::favicon::run(sub_app, app.global).await,
        SubCommands::Units(sub_app) => crate::units::run(sub_app, app.global).await,
        SubCommands::Jwt(sub_app) => crate::jwt::run(sub_app, app.global).await,
        SubCommands::Hash(sub_app) => crate::hash::run(sub_app, app.global).await,
        SubCommands::Uuid(sub_app) => crate::uuid::run(sub_app, app.global).await,
        SubCommands::Deps(sub_app) => crate::deps::run(sub_app, app.global).await,
        SubCommands::Tools(sub_app) => crate::tools::run(sub_app, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
