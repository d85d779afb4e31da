//! `quill check` command implementation.
//!
//! Loads the configuration file, runs its validation and prints the
//! resolved audit settings.

use anyhow::{Context, Result, bail};
use quill_core::{QuillConfig, SinkBackend};
use std::path::Path;

/// Human-readable description of the resolved configuration.
pub fn describe(config: &QuillConfig) -> Vec<String> {
    let mut lines = vec![
        format!("audit.enabled      = {}", config.audit.enabled),
        format!("audit.table        = {}", config.audit.table),
        format!("audit.sink.backend = {:?}", config.audit.sink.backend),
    ];

    match config.audit.sink.backend {
        SinkBackend::File => {
            if let Some(path) = &config.audit.sink.file_path {
                lines.push(format!("audit.sink.file    = {}", path));
            }
        }
        SinkBackend::Database => {
            let target = match &config.upstream.database_url_env {
                Some(env) => format!("${}", env),
                None => format!(
                    "{}:{}/{}",
                    config.upstream.host, config.upstream.port, config.upstream.database
                ),
            };
            lines.push(format!("upstream           = {}", target));
        }
        _ => {}
    }

    lines
}

pub fn run_check(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("configuration file {} not found", path.display());
    }

    let config = QuillConfig::from_file(path)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;

    println!("Configuration {} is valid.", path.display());
    for line in describe(&config) {
        println!("  {}", line);
    }
    Ok(())
}
