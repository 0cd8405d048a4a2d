//! Implementation of the `zero-coach init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::adapters::sqlite::initialize_database;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, DatabaseConfig};
use crate::infrastructure::config::CONFIG_DIR;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config.yaml with the defaults
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub config_written: bool,
    pub database_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push(format!("Wrote {}/config.yaml", CONFIG_DIR));
        }
        lines.push(format!("Database ready at {}", self.database_path.display()));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Database path for `config`, resolved against the project directory.
fn resolve_database_path(target: &Path, database: &DatabaseConfig) -> PathBuf {
    let raw = database.path.strip_prefix("sqlite:").unwrap_or(&database.path);
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        target.join(path)
    }
}

pub async fn execute(args: InitArgs, config: Config, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir().context("Failed to get current directory")?.join(&args.path)
    };

    let config_dir = target_path.join(CONFIG_DIR);
    fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let config_path = config_dir.join("config.yaml");
    let config_written = args.force || !config_path.exists();
    if config_written {
        let yaml = serde_yaml::to_string(&Config::default()).context("Failed to render default config")?;
        fs::write(&config_path, yaml)
            .await
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
    }

    let database_path = resolve_database_path(&target_path, &config.database);
    let database = DatabaseConfig { path: database_path.display().to_string(), ..config.database.clone() };
    initialize_database(&database).await.context("Failed to initialize database")?;

    let message = if config_written {
        "Project initialized successfully.".to_string()
    } else {
        "Project already initialized; kept existing config.yaml. Use --force to reset it.".to_string()
    };

    output(
        &InitOutput { success: true, message, initialized_path: target_path, config_written, database_path },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ConfigLoader;

    #[test]
    fn test_resolve_database_path() {
        let target = Path::new("/work");
        let relative = DatabaseConfig::default();
        assert_eq!(resolve_database_path(target, &relative), PathBuf::from("/work/.zero-coach/zero-coach.db"));

        let absolute = DatabaseConfig { path: "sqlite:/data/coach.db".to_string(), ..DatabaseConfig::default() };
        assert_eq!(resolve_database_path(target, &absolute), PathBuf::from("/data/coach.db"));
    }

    #[tokio::test]
    async fn test_init_writes_loadable_config_and_database() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs { force: false, path: dir.path().to_path_buf() };
        execute(args, Config::default(), true).await.unwrap();

        let config_path = dir.path().join(CONFIG_DIR).join("config.yaml");
        assert!(config_path.exists());
        assert!(dir.path().join(".zero-coach/zero-coach.db").exists());
        let loaded = ConfigLoader::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.session_key, "default");
    }
}
