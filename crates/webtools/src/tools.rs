use crate::prelude::{println, *};
use colored::Colorize;
use webtools_core::tools::{find_tool, tools_in_category, ToolInfo, TOOLS};

#[derive(Debug, clap::Parser)]
#[command(name = "tools")]
#[command(about = "List available tools")]
pub struct App {
    /// Show a single tool by name or command
    #[arg(value_name = "TOOL")]
    pub tool: Option<String>,

    /// Only list tools in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: App, _global: crate::Global) -> Result<()> {
    let tools: Vec<&ToolInfo> = match (&app.tool, &app.category) {
        (Some(name), _) => vec![find_tool(name).ok_or_else(|| eyre!("Unknown tool: {}", name))?],
        (None, Some(category)) => tools_in_category(category),
        (None, None) => TOOLS.iter().collect(),
    };

    if app.json {
        return output_json(&tools);
    }

    let mut table = new_table();
    table.add_row(prettytable::row![b => "TOOL", "COMMAND", "CATEGORY", "DESCRIPTION"]);
    for tool in tools {
        table.add_row(prettytable::row![
            tool.name.bold(),
            f!("webtools {}", tool.command).cyan(),
            tool.category,
            tool.description
        ]);
    }
    table.printstd();

    Ok(())
}
