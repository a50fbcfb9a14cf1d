use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::PathBuf;

use crate::configs::Config;

const ROUTESCRIPT_CONFIG_NAME: &str = "routescript.toml";
const ROUTESCRIPT_APP_NAME: &str = "routescript";
const ROUTES_DIR_NAME: &str = "routes";

/// Expands a path with tilde (~) and environment variable substitution
///
/// - `~` → user's home directory
/// - `~/path` → path relative to home directory
/// - `$VAR/path` and `${VAR}/path` → expands environment variable VAR
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use routescript::configs::expand_path;
///
/// # fn main() -> anyhow::Result<()> {
/// let expanded = expand_path(PathBuf::from("~/routes/main.lua"))?;
/// // Returns: /Users/username/routes/main.lua
/// # Ok(())
/// # }
/// ```
pub fn expand_path(path: PathBuf) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .context("Path contains invalid UTF-8 characters")?;

    let expanded = shellexpand::full(path_str).context("Failed to expand path")?;

    Ok(PathBuf::from(expanded.as_ref()))
}

/// Returns the default config directory based on platform conventions
///
/// Respects `$XDG_CONFIG_HOME` when it is set, non-empty and absolute.
/// Falls back to `~/.config/routescript` on all platforms.
pub fn get_default_config_dir() -> Result<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        let path = PathBuf::from(&xdg_config);
        if path.is_absolute() {
            return Ok(path.join(ROUTESCRIPT_APP_NAME));
        }
    }

    dirs::home_dir()
        .map(|dir| dir.join(".config").join(ROUTESCRIPT_APP_NAME))
        .context("Failed to determine home directory")
}

/// Finds the config file using the following search order:
///
/// 1. Explicit path (if provided) - returns error if specified but doesn't exist
/// 2. XDG config directory: `~/.config/routescript/routescript.toml`
/// 3. Current directory: `./routescript.toml`
///
/// Returns `Ok(None)` when nothing is found via auto-discovery.
pub fn find_config_file(explicit: Option<PathBuf>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path));
        } else {
            return Err(anyhow!("Specified config file does not exist: {:?}", path));
        }
    }

    let xdg_config_path = get_default_config_dir()?.join(ROUTESCRIPT_CONFIG_NAME);
    if xdg_config_path.exists() {
        return Ok(Some(xdg_config_path));
    }

    let local_config_path = PathBuf::from(".").join(ROUTESCRIPT_CONFIG_NAME);
    if local_config_path.exists() {
        return Ok(Some(local_config_path));
    }

    Ok(None)
}

/// Resolves the directories searched for `classpath:` scripts.
///
/// Configured roots are expanded and kept in order. Without any configured
/// root, `<config dir>/routes` is used.
pub fn resolve_script_roots(config: &Config) -> Result<Vec<PathBuf>> {
    if config.script_roots.is_empty() {
        return Ok(vec![get_default_config_dir()?.join(ROUTES_DIR_NAME)]);
    }

    config
        .script_roots
        .iter()
        .map(|root| {
            expand_path(root.clone())
                .with_context(|| format!("Failed to expand script root {:?}", root))
        })
        .collect()
}
