//! Clean the public directory

use anyhow::{Context, Result};
use std::fs;

use crate::Helios;

/// Remove the generated site
pub fn run(helios: &Helios) -> Result<()> {
    if helios.public_dir.exists() {
        fs::remove_dir_all(&helios.public_dir)
            .with_context(|| format!("Failed to delete {:?}", helios.public_dir))?;
        tracing::info!("Deleted: {:?}", helios.public_dir);
    } else {
        tracing::debug!("Nothing to clean at {:?}", helios.public_dir);
    }

    Ok(())
}
