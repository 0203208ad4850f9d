use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use graphpersist::wire::TokenReader;
use graphpersist::{json, storage};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Write};

#[derive(Parser)]
#[command(name = "gpx")]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON document into a token stream
    Encode { input: String, output: String },
    /// Print a token stream as JSON
    Decode { file: String },
    /// Summarize a token stream and check that it loads
    Inspect { file: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .filter_level(cli.verbose.log_level_filter())
        .init();

    match cli.command {
        Commands::Encode { input, output } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read file: {}", input))?;
            let doc: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("Invalid JSON in {}", input))?;

            if storage::exists(&output) {
                log::warn!("overwriting {}", output);
            }
            let value = json::from_json(&doc)
                .with_context(|| format!("Unsupported value in {}", input))?;
            storage::save(&output, &value)?;
            println!("Encoded {} into {}", input, output);
        }

        Commands::Decode { file } => {
            let value = storage::load(&file)?;
            let doc = json::to_json(&value)
                .with_context(|| format!("Graph in {} has no JSON form", file))?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }

        Commands::Inspect { file } => {
            let handle = File::open(&file).with_context(|| format!("Failed to read file: {}", file))?;
            let mut reader = TokenReader::new(BufReader::new(handle));
            let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
            while let Some(token) = reader.next_token()? {
                *counts.entry(token.name()).or_default() += 1;
            }

            println!("Tokens: {}", reader.line());
            for (name, count) in &counts {
                println!("  {}: {}", name, count);
            }
            let compounds = counts.get("seq_start").copied().unwrap_or(0)
                + counts.get("map_start").copied().unwrap_or(0);
            println!("Compound values: {}", compounds);
            println!("Back-references: {}", counts.get("ref").copied().unwrap_or(0));

            match storage::load(&file) {
                Ok(_) => println!("Stream loads cleanly"),
                Err(e) => println!("Stream does not load: {:#}", e),
            }
        }
    }

    Ok(())
}
