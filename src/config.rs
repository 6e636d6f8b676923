use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chart::palette::Rgb;
use crate::data::loader::DataSource;
use crate::secrets::{DATASET_PATH, Secrets};

/// Per-project settings directory, looked up in the working directory and
/// then in `$HOME`.
pub const CONFIG_DIR: &str = ".salary-viz";
pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("theme.{key}: '{value}' is not a hex colour")]
    InvalidColor { key: &'static str, value: String },
}

/// Viewer preferences (`.salary-viz/config.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub theme: ThemeConfig,
    pub server: ServerConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeBase {
    #[default]
    Light,
    Dark,
}

/// Colours are `#rrggbb` strings; unset keys come from the base theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    pub base: ThemeBase,
    pub primary_color: Option<String>,
    pub background_color: Option<String>,
    pub secondary_background_color: Option<String>,
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub port: u16,
    pub address: String,
    /// Serve the report over HTTP instead of opening a window.
    pub headless: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            address: DEFAULT_ADDRESS.to_string(),
            headless: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataConfig {
    /// Dataset to open on start instead of the built-in example.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `explicit` if given, otherwise the first config file found in
    /// the default locations. No file at all means defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        for candidate in default_locations() {
            if candidate.is_file() {
                log::info!("Using config {}", candidate.display());
                return Ok((Self::load(&candidate)?, Some(candidate)));
            }
        }
        log::debug!("No config file found, using defaults");
        Ok((Self::default(), None))
    }

    /// Where to read the dataset from: the command line, then `[data] source`,
    /// then the `dataset_path` secret, then the built-in example.
    pub fn data_source(&self, cli: Option<PathBuf>, secrets: &Secrets) -> DataSource {
        cli.or_else(|| self.data.source.clone())
            .or_else(|| secrets.get(DATASET_PATH).map(PathBuf::from))
            .map_or(DataSource::Example, DataSource::File)
    }

    /// Resolve the theme colours, validating every override.
    pub fn theme(&self) -> Result<Theme, ConfigError> {
        let t = &self.theme;
        let mut theme = match t.base {
            ThemeBase::Light => Theme::light(),
            ThemeBase::Dark => Theme::dark(),
        };
        let overrides: [(&'static str, &Option<String>, &mut Rgb); 4] = [
            ("primaryColor", &t.primary_color, &mut theme.primary),
            ("backgroundColor", &t.background_color, &mut theme.background),
            (
                "secondaryBackgroundColor",
                &t.secondary_background_color,
                &mut theme.secondary_background,
            ),
            ("textColor", &t.text_color, &mut theme.text),
        ];
        for (key, value, slot) in overrides {
            if let Some(value) = value {
                *slot = parse_color(key, value)?;
            }
        }
        Ok(theme)
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_DIR).join(CONFIG_FILE)];
    if let Some(home) = std::env::var_os("HOME") {
        paths.push(PathBuf::from(home).join(CONFIG_DIR).join(CONFIG_FILE));
    }
    paths
}

fn parse_color(key: &'static str, value: &str) -> Result<Rgb, ConfigError> {
    value.trim().parse::<Rgb>().map_err(|_| ConfigError::InvalidColor {
        key,
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Resolved theme
// ---------------------------------------------------------------------------

/// Concrete colours used by the window, the HTML pages and the PNG export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub dark: bool,
    pub primary: Rgb,
    pub background: Rgb,
    pub secondary_background: Rgb,
    pub text: Rgb,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            dark: false,
            primary: Rgb::new(0x63, 0x6e, 0xfa),
            background: Rgb::new(0xff, 0xff, 0xff),
            secondary_background: Rgb::new(0xf0, 0xf2, 0xf6),
            text: Rgb::new(0x26, 0x27, 0x30),
        }
    }

    pub fn dark() -> Self {
        Self {
            dark: true,
            primary: Rgb::new(0x63, 0x6e, 0xfa),
            background: Rgb::new(0x0e, 0x11, 0x17),
            secondary_background: Rgb::new(0x26, 0x27, 0x30),
            text: Rgb::new(0xfa, 0xfa, 0xfa),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_source_precedence() {
        let mut secrets = Secrets::default();
        secrets.merge_env([(
            "SALARY_VIZ_SECRET_DATASET_PATH".to_string(),
            "secret.csv".to_string(),
        )]);
        let mut cfg = AppConfig::default();
        assert_eq!(
            cfg.data_source(None, &Secrets::default()),
            DataSource::Example
        );
        assert_eq!(
            cfg.data_source(None, &secrets),
            DataSource::File("secret.csv".into())
        );
        cfg.data.source = Some("configured.csv".into());
        assert_eq!(
            cfg.data_source(None, &secrets),
            DataSource::File("configured.csv".into())
        );
        assert_eq!(
            cfg.data_source(Some("cli.csv".into()), &secrets),
            DataSource::File("cli.csv".into())
        );
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.server.port, 8501);
        assert!(!cfg.server.headless);
        assert_eq!(cfg.theme().unwrap(), Theme::light());
    }

    #[test]
    fn parses_camel_case_keys() {
        let cfg = AppConfig::from_toml(
            r##"
            [theme]
            base = "dark"
            primaryColor = "#ff4b4b"

            [server]
            port = 9000
            headless = true

            [data]
            source = "salaries.csv"
            "##,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert!(cfg.server.headless);
        assert_eq!(cfg.server.address, DEFAULT_ADDRESS);
        assert_eq!(cfg.data.source, Some(PathBuf::from("salaries.csv")));

        let theme = cfg.theme().unwrap();
        assert!(theme.dark);
        assert_eq!(theme.primary, Rgb::new(0xff, 0x4b, 0x4b));
        assert_eq!(theme.background, Theme::dark().background);
    }

    #[test]
    fn bad_colour_is_an_error() {
        let cfg = AppConfig::from_toml("[theme]\ntextColor = \"blue-ish\"\n").unwrap();
        let err = cfg.theme().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColor { key: "textColor", .. }));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = AppConfig::discover(Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = 1").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
