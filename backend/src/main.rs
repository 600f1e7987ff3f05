//! Pólizas CLI - validate insurance policy spreadsheets
//!
//! # Main Commands
//!
//! ```bash
//! polizas serve                     # Start HTTP server (port 3000)
//! polizas validate cartera.xlsx     # Validate and write the result workbook
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! polizas inspect cartera.xlsx      # Show detected format and column mapping
//! polizas fields                    # Show the field table and its aliases
//! ```

use clap::{Parser, Subcommand};
use polizas::{
    import_file, parse_file, save_workbook, ColumnMapping, Section, ServerConfig, SourceFormat,
    FIELD_SPECS,
};
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "polizas")]
#[command(about = "Validate insurance policy spreadsheets before CRM loading", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a spreadsheet, validate every row and write the result workbook
    Validate {
        /// Input file (xlsx, xls, ods or csv)
        input: PathBuf,

        /// Output workbook (default: validacion_polizas_<date>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the records as JSON
        #[arg(short, long)]
        json: Option<PathBuf>,
    },

    /// Show the detected format, headers and column mapping of a file
    Inspect {
        /// Input file (xlsx, xls, ods or csv)
        input: PathBuf,
    },

    /// Show the field table with accepted header aliases
    Fields,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: POLIZAS_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (default: POLIZAS_HOST or 0.0.0.0)
        #[arg(long)]
        host: Option<IpAddr>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { input, output, json } => {
            cmd_validate(&input, output.as_deref(), json.as_deref())
        }

        Commands::Inspect { input } => cmd_inspect(&input),

        Commands::Fields => cmd_fields(),

        Commands::Serve { port, host } => cmd_serve(port, host).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_validate(
    input: &Path,
    output: Option<&Path>,
    json: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let outcome = import_file(input)?;
    let summary = &outcome.summary;

    eprintln!("\n📊 Results:");
    eprintln!("   Total:    {}", summary.total);
    eprintln!("   ✅ Valid:    {}", summary.valid);
    eprintln!("   ⚠️  Warnings: {}", summary.warnings);
    eprintln!("   ❌ Errors:   {}", summary.errors);

    let flagged: Vec<_> = outcome
        .records
        .iter()
        .filter(|r| !r.validation_status.is_valid())
        .collect();
    for record in flagged.iter().take(5) {
        eprintln!(
            "\n   Row {} ({}): {}",
            record.id,
            record.display_title(),
            record.validation_message.as_deref().unwrap_or("")
        );
    }
    if flagged.len() > 5 {
        eprintln!("\n   ... and {} more", flagged.len() - 5);
    }

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(polizas::export_file_name_today()));
    save_workbook(&outcome.records, &output)?;
    eprintln!("\n💾 Workbook written to: {}", output.display());

    if let Some(json_path) = json {
        let content = serde_json::to_string_pretty(&outcome.records)?;
        fs::write(json_path, content)?;
        eprintln!("💾 Records written to: {}", json_path.display());
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔍 Inspecting: {}", input.display());

    let parse = parse_file(input)?;
    match parse.format {
        SourceFormat::Workbook => {
            eprintln!("   Format: workbook");
            eprintln!("   Sheet: {}", parse.sheet_name.as_deref().unwrap_or("?"));
        }
        SourceFormat::Delimited => {
            eprintln!("   Format: delimited text");
            eprintln!("   Encoding: {}", parse.encoding.as_deref().unwrap_or("?"));
            eprintln!(
                "   Delimiter: '{}'",
                parse.delimiter.map(format_delimiter).unwrap_or_default()
            );
        }
    }
    eprintln!("   Rows: {}", parse.rows.len());
    eprintln!("   Columns: {}", parse.headers.join(", "));

    let mapping = ColumnMapping::from_headers(&parse.headers);
    println!("\n🗺️  Column mapping ({} of {} fields):", mapping.matched.len(), FIELD_SPECS.len());
    for (field, header) in &mapping.matched {
        println!("   {:<28} ← {}", field.key(), header.trim());
    }
    if !mapping.missing.is_empty() {
        println!("\n⚠️  Missing fields:");
        for field in &mapping.missing {
            println!("   {:<28} ({})", field.key(), field.label());
        }
    }
    if !mapping.unrecognized.is_empty() {
        println!("\n🚫 Ignored columns: {}", mapping.unrecognized.join(", "));
    }

    Ok(())
}

fn cmd_fields() -> Result<(), Box<dyn std::error::Error>> {
    for section in Section::ALL {
        println!("📋 {}", section.title());
        for spec in FIELD_SPECS.iter().filter(|s| s.section == section) {
            println!("   {:<26} {}", spec.key, spec.label);
            println!("   {:<26} aliases: {}", "", spec.aliases.join(" | "));
        }
        println!();
    }
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

async fn cmd_serve(port: Option<u16>, host: Option<IpAddr>) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env().with_port(port).with_host(host);
    polizas::server::start_server(config).await
}
