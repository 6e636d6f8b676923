use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::CONFIG_DIR;

pub const SECRETS_FILE: &str = "secrets.toml";
/// `SALARY_VIZ_SECRET_DATASET_PATH` → `dataset_path`.
pub const ENV_PREFIX: &str = "SALARY_VIZ_SECRET_";

/// Secret holding a dataset path that should not live in the config file.
pub const DATASET_PATH: &str = "dataset_path";

#[derive(Debug, Error)]
pub enum SecretsError {
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
}

/// Named key-value pairs from `secrets.toml` and the environment.
///
/// Nested tables flatten to dotted keys (`[db] user` → `db.user`).
/// Environment variables override the file.
#[derive(Clone, Default)]
pub struct Secrets {
    values: BTreeMap<String, String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Secrets {
    /// `./.salary-viz/secrets.toml` (if present) plus the process environment.
    pub fn load_default() -> Result<Self, SecretsError> {
        let path = PathBuf::from(CONFIG_DIR).join(SECRETS_FILE);
        let mut secrets = if path.is_file() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        secrets.merge_env(std::env::vars());
        log::debug!("Loaded {} secrets", secrets.len());
        Ok(secrets)
    }

    pub fn from_file(path: &Path) -> Result<Self, SecretsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SecretsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| SecretsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(text)?;
        let mut values = BTreeMap::new();
        flatten("", &table, &mut values);
        Ok(Self { values })
    }

    /// Take every `SALARY_VIZ_SECRET_*` variable; `__` in the name becomes `.`.
    pub fn merge_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            if let Some(key) = name.strip_prefix(ENV_PREFIX) {
                let key = key.to_ascii_lowercase().replace("__", ".");
                self.values.insert(key, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn flatten(prefix: &str, table: &toml::Table, out: &mut BTreeMap<String, String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten(&full, inner, out),
            toml::Value::String(s) => {
                out.insert(full, s.clone());
            }
            other => {
                out.insert(full, other.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_tables_flatten() {
        let secrets = Secrets::from_toml(
            r#"
            dataset_path = "/data/salaries.csv"
            [db]
            user = "viz"
            port = 5432
            "#,
        )
        .unwrap();
        assert_eq!(secrets.get(DATASET_PATH), Some("/data/salaries.csv"));
        assert_eq!(secrets.get("db.user"), Some("viz"));
        assert_eq!(secrets.get("db.port"), Some("5432"));
    }

    #[test]
    fn environment_overrides_file() {
        let mut secrets = Secrets::from_toml("dataset_path = \"a.csv\"").unwrap();
        secrets.merge_env([
            ("SALARY_VIZ_SECRET_DATASET_PATH".to_string(), "b.csv".to_string()),
            ("SALARY_VIZ_SECRET_DB__USER".to_string(), "root".to_string()),
            ("PATH".to_string(), "/bin".to_string()),
        ]);
        assert_eq!(secrets.get(DATASET_PATH), Some("b.csv"));
        assert_eq!(secrets.get("db.user"), Some("root"));
        assert_eq!(secrets.len(), 2);
    }

    #[test]
    fn debug_hides_values() {
        let secrets = Secrets::from_toml("token = \"hunter2\"").unwrap();
        let shown = format!("{secrets:?}");
        assert!(shown.contains("token"));
        assert!(!shown.contains("hunter2"));
    }
}
