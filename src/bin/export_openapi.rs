//! Export OpenAPI specification to JSON file
//!
//! Usage:
//!   cargo run --bin export_openapi > openapi.json
//!
//! Or with file output:
//!   cargo run --bin export_openapi -- --output docs/openapi.json
//!
//! The server base path comes from `API_PREFIX` (default `api`).

use anyhow::Context;
use userbase::gateway::openapi::api_doc;

fn main() -> anyhow::Result<()> {
    let api_prefix = std::env::var("API_PREFIX").unwrap_or_else(|_| "api".to_string());
    let json = api_doc(&api_prefix)
        .to_pretty_json()
        .context("Failed to serialize OpenAPI spec")?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("--output") => {
            let path = args.get(2).context("--output needs a file path")?;
            std::fs::write(path, &json).with_context(|| format!("Failed to write {}", path))?;
            eprintln!("OpenAPI spec exported to: {}", path);
        }
        _ => println!("{}", json),
    }
    Ok(())
}
