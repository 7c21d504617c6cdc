//! Build script for spotbridge.
//!
//! Copies the `.env.example` configuration template into the local data
//! directory so users find it next to the `.env` the binary reads:
//! - Linux: `~/.local/share/spotbridge/.env.example`
//! - macOS: `~/Library/Application Support/spotbridge/.env.example`
//! - Windows: `%LOCALAPPDATA%/spotbridge/.env.example`
//!
//! A missing template only produces a cargo warning.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotbridge");

    if !template.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
        return Ok(());
    }

    // read-only home directories (CI, sandboxes) must not break the build
    if let Err(e) = fs::create_dir_all(&out_dir)
        .and_then(|_| fs::copy(&template, out_dir.join(".env.example")).map(|_| ()))
    {
        println!("cargo:warning=could not install .env.example: {}", e);
    }

    Ok(())
}
