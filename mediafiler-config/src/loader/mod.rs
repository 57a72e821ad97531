pub mod error;

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::{
    cli::{ServeArgs, normalize_suffix, parse_suffix_list},
    models::{
        Config, ConfigMetadata, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SUFFIXES, MediaConfig,
        ServerConfig, sources::FileConfig,
    },
    validation::{self, ConfigWarnings},
};
use error::ConfigLoadError;

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("mediafiler.toml"),
        PathBuf::from("config/mediafiler.toml"),
    ]
});

/// Load a `.env` file into the process environment. With no explicit path
/// the current directory is searched; a missing file is not an error.
pub fn load_env_file(path: Option<&Path>) -> Result<bool, ConfigLoadError> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| true),
        None => dotenvy::dotenv().map(|_| true),
    };
    loaded.or_else(|err| if err.not_found() { Ok(false) } else { Err(err.into()) })
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    args: ServeArgs,
    search_default_locations: bool,
}

impl ConfigLoader {
    pub fn new(args: ServeArgs) -> Self {
        Self {
            args,
            search_default_locations: true,
        }
    }

    /// Only read a configuration file when one is named explicitly.
    pub fn without_default_locations(mut self) -> Self {
        self.search_default_locations = false;
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config()?;
        let (config, warnings) = self.compose_config(file_config.unwrap_or_default(), config_path)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(&self) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let path = match &self.args.config {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(ConfigLoadError::MissingConfig {
                        path: explicit.clone(),
                    });
                }
                explicit.clone()
            }
            None if self.search_default_locations => {
                match DEFAULT_CONFIG_LOCATIONS.iter().find(|candidate| candidate.exists()) {
                    Some(found) => found.clone(),
                    None => return Ok((None, None)),
                }
            }
            None => return Ok((None, None)),
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "read configuration file");

        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file: FileConfig,
        config_path: Option<PathBuf>,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();
        let FileConfig {
            server: file_server,
            media: file_media,
        } = file;

        let server = ServerConfig {
            host: self
                .args
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.args.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let roots = if self.args.roots.is_empty() {
            file_media.roots
        } else {
            self.args.roots.clone()
        };
        let roots = dedup(roots, |root| {
            warnings.push(format!("duplicate root {} ignored", root.display()))
        });

        let suffixes = match (&self.args.suffixes, file_media.suffixes) {
            (Some(raw), _) => parse_suffix_list(raw),
            (None, Some(list)) => list.iter().filter_map(|s| normalize_suffix(s)).collect(),
            (None, None) => DEFAULT_SUFFIXES.iter().map(|s| s.to_string()).collect(),
        };
        let suffixes = dedup(suffixes, |suffix| {
            warnings.push(format!("duplicate suffix {suffix} ignored"))
        });

        let archive_dir = self
            .args
            .archive_dir
            .clone()
            .or(file_media.archive_dir)
            .filter(|dir| !dir.as_os_str().is_empty());

        let config = Config {
            server,
            media: MediaConfig {
                roots,
                suffixes,
                archive_dir,
            },
            metadata: ConfigMetadata { config_path },
        };

        warnings.extend(validation::apply_guard_rails(&config)?);

        Ok((config, warnings))
    }
}

/// Keep the first occurrence of every value, reporting the rest.
fn dedup<T: Clone + Eq + std::hash::Hash>(values: Vec<T>, mut on_duplicate: impl FnMut(&T)) -> Vec<T> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| {
            let fresh = seen.insert(value.clone());
            if !fresh {
                on_duplicate(value);
            }
            fresh
        })
        .collect()
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
