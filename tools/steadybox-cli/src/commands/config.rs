//! Show or initialize the configuration file.

use std::path::Path;

use steadybox_common::config::{config_file_path, AppConfig};

pub fn show(config: &AppConfig, path: Option<&Path>) -> anyhow::Result<()> {
    let source = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    if source.exists() {
        println!("# {}", source.display());
    } else {
        println!("# defaults ({} not found)", source.display());
    }
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

pub fn init(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let target = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    if target.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            target.display()
        );
    }

    AppConfig::default().save_to(&target)?;
    println!("Wrote default config to {}", target.display());
    Ok(())
}
