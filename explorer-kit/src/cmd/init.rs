//! `explorer-kit init` command — write the default explorer configuration.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::config::{Config, generate_default_config};
use crate::error::Error;

/// Execute the `init` command.
///
/// The template is parsed before anything is written, so the file on disk is
/// always loadable. Without `force`, an existing file is left untouched; the
/// check and the creation are a single `create_new` open.
///
/// # Errors
///
/// Returns an error if the file already exists (without `--force`), if the
/// template does not validate, or if writing fails.
pub fn run(output: &Path, force: bool) -> Result<(), Error> {
    let template = generate_default_config();
    let config = Config::from_toml(&template)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::config_with(format!("failed to create '{}'", parent.display()), e)
        })?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let written = options
        .open(output)
        .and_then(|mut file| file.write_all(template.as_bytes()));
    match written {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(Error::config(format!(
                "'{}' already exists, use --force to overwrite",
                output.display()
            )));
        }
        Err(e) => {
            return Err(Error::config_with(format!("failed to write '{}'", output.display()), e));
        }
    }

    tracing::info!(
        path = %output.display(),
        chain_id = config.chain.id,
        storage = %config.storage.path.display(),
        growthbook = config.features.growthbook.enabled,
        "explorer config written"
    );
    Ok(())
}
