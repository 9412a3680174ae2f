//! Prints the device API's OpenAPI document, or writes it with `--output <path>`.
//!
//!   cargo run --bin generate_openapi > openapi.json
//!   cargo run --bin generate_openapi -- --output openapi.json

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use greenhouse_service::api::handlers::ApiDoc;
use utoipa::OpenApi;

fn output_path(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>> {
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output" | "-o" => {
                let value = args.next().context("--output needs a path")?;
                path = Some(PathBuf::from(value));
            }
            other => bail!("unexpected argument: {other}"),
        }
    }
    Ok(path)
}

fn main() -> Result<()> {
    let doc = ApiDoc::openapi();
    let json = doc.to_pretty_json().context("failed to serialise OpenAPI document")?;

    match output_path(std::env::args().skip(1))? {
        Some(path) => {
            fs::write(&path, &json).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} paths written to {}", doc.paths.paths.len(), path.display());
        }
        None => io::stdout()
            .write_all(json.as_bytes())
            .context("failed to write to stdout")?,
    }
    Ok(())
}
