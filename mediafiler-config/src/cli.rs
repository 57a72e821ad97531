use std::path::PathBuf;

use clap::Args as ClapArgs;

/// Flags accepted by `mediafiler-server`. Anything left unset falls back to
/// the configuration file, then to built-in defaults.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Directories to scan for media files
    #[arg(value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Comma-separated file suffixes to list (e.g. `mp4,mkv`)
    #[arg(short = 'f', long = "formats", env = "MEDIAFILER_SUFFIXES")]
    pub suffixes: Option<String>,

    /// Directory archived files are moved into; enables the archive action
    #[arg(short = 'a', long = "archive", env = "MEDIAFILER_ARCHIVE_DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "MEDIAFILER_PORT")]
    pub port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "MEDIAFILER_HOST")]
    pub host: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "MEDIAFILER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Split a comma-separated suffix list, trimming blanks and making sure every
/// entry starts with a dot.
pub fn parse_suffix_list(raw: &str) -> Vec<String> {
    raw.split(',').filter_map(normalize_suffix).collect()
}

pub(crate) fn normalize_suffix(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    if trimmed.starts_with('.') {
        Some(trimmed.to_string())
    } else {
        Some(format!(".{trimmed}"))
    }
}
