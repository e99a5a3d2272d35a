use crate::prelude::{println, *};
use colored::Colorize;
use webtools_core::units::{
    convert_all, find_unit, format_bytes, format_value, parse_value, units_in, Category,
};

#[derive(Debug, clap::Parser)]
#[command(name = "units")]
#[command(about = "Convert values between units")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Convert a value, e.g. `webtools units convert 10 km mi`
    #[clap(name = "convert")]
    Convert(ConvertOptions),

    /// List known units
    #[clap(name = "list")]
    List(ListOptions),

    /// Render a byte count in human-readable form
    #[clap(name = "bytes")]
    Bytes(BytesOptions),
}

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ConvertOptions {
    /// Value to convert (`_` and `,` separators allowed)
    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,

    /// Source unit (symbol or name)
    #[arg(value_name = "FROM")]
    pub from: String,

    /// Target unit; omit to show every unit of the same category
    #[arg(value_name = "TO")]
    pub to: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Only list units of this category
    #[arg(long, value_enum)]
    pub category: Option<CategoryArg>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct BytesOptions {
    /// Number of bytes
    #[arg(value_name = "BYTES")]
    pub bytes: u64,

    /// Use SI (1000-based) prefixes instead of IEC (1024-based)
    #[arg(long)]
    pub si: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CategoryArg {
    Length,
    Mass,
    Time,
    DataSize,
    Temperature,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Length => Category::Length,
            CategoryArg::Mass => Category::Mass,
            CategoryArg::Time => Category::Time,
            CategoryArg::DataSize => Category::DataSize,
            CategoryArg::Temperature => Category::Temperature,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ConvertOutput {
    pub value: f64,
    pub from: String,
    pub category: Category,
    pub results: Vec<ConvertedValue>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ConvertedValue {
    pub unit: String,
    pub name: String,
    pub value: f64,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        Commands::Convert(options) => convert(options, global),
        Commands::List(options) => list(options),
        Commands::Bytes(options) => {
            println!("{}", format_bytes(options.bytes, !options.si));
            Ok(())
        }
    }
}

fn convert(options: ConvertOptions, global: crate::Global) -> Result<()> {
    let output = convert_data(&options.value, &options.from, options.to.as_deref())?;

    if global.verbose {
        println!(
            "Converting {} {} ({})",
            output.value, output.from, output.category
        );
    }

    if options.json {
        return output_json(&output);
    }

    if options.to.is_some() {
        if let Some(result) = output.results.first() {
            println!("{} {}", format_value(result.value).bold(), result.unit);
        }
        return Ok(());
    }

    let mut table = new_table();
    for result in &output.results {
        table.add_row(prettytable::row![
            r -> format_value(result.value),
            result.unit,
            result.name.dimmed()
        ]);
    }
    table.printstd();

    Ok(())
}

/// Public function for MCP reuse
pub fn convert_data(value: &str, from: &str, to: Option<&str>) -> Result<ConvertOutput> {
    let parsed = parse_value(value).map_err(|e| Error::InvalidInput(e.to_string()))?;
    let source = find_unit(from).map_err(|e| Error::InvalidInput(e.to_string()))?;

    let results = match to {
        Some(to) => {
            let target = find_unit(to).map_err(|e| Error::InvalidInput(e.to_string()))?;
            let converted = webtools_core::units::convert_units(parsed, source, target)
                .map_err(|e| Error::InvalidInput(e.to_string()))?;
            vec![ConvertedValue {
                unit: target.symbol.to_string(),
                name: target.name.to_string(),
                value: converted,
            }]
        }
        None => convert_all(parsed, source.symbol)
            .map_err(|e| Error::InvalidInput(e.to_string()))?
            .into_iter()
            .map(|c| ConvertedValue {
                unit: c.symbol.to_string(),
                name: c.name.to_string(),
                value: c.value,
            })
            .collect(),
    };

    Ok(ConvertOutput {
        value: parsed,
        from: source.symbol.to_string(),
        category: source.category,
        results,
    })
}

fn list(options: ListOptions) -> Result<()> {
    let categories: Vec<Category> = match options.category {
        Some(category) => vec![category.into()],
        None => Category::ALL.to_vec(),
    };

    if options.json {
        let units: Vec<_> = categories.iter().flat_map(|c| units_in(*c)).collect();
        return output_json(&units);
    }

    for category in categories {
        println!("{}", category.as_str().to_uppercase().bright_cyan().bold());
        let mut table = new_table();
        for unit in units_in(category) {
            table.add_row(prettytable::row![unit.symbol, unit.name]);
        }
        table.printstd();
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_data_single_target() {
        let output = convert_data("1,000", "m", Some("km")).unwrap();
        assert_eq!(output.results.len(), 1);
        assert!((output.results[0].value - 1.0).abs() < 1e-12);
        assert_eq!(output.category, Category::Length);
    }

    #[test]
    fn test_convert_data_all_targets() {
        let output = convert_data("1", "GiB", None).unwrap();
        let mib = output.results.iter().find(|r| r.unit == "MiB").unwrap();
        assert!((mib.value - 1024.0).abs() < 1e-9);
    }

    #[test]
    fn test_convert_data_errors() {
        assert!(convert_data("x", "m", None).is_err());
        assert!(convert_data("1", "m", Some("kg")).is_err());
        assert!(convert_data("1", "furlong", None).is_err());
    }
}
