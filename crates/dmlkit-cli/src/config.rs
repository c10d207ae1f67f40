use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = "dmlkit.toml";
pub const DEFAULT_SNAPSHOT: &str = "dmlkit-tables.json";

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_dir: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!("failed to read config file {}: {e}", config_path.display())
        })?;
        Self::parse(&raw, config_path)
    }

    fn parse(raw: &str, config_path: &Path) -> anyhow::Result<Self> {
        let config_dir = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let mut file: ConfigFile = toml::from_str(raw).map_err(|e| {
            anyhow::anyhow!("failed to parse config file {}: {e}", config_path.display())
        })?;

        file.expand_env()?;
        file.validate()?;

        Ok(Self { config_dir, file })
    }

    pub fn resolve_path(&self, p: impl AsRef<Path>) -> PathBuf {
        let p = p.as_ref();
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.config_dir.join(p)
        }
    }

    /// Snapshot location from the config, or the default next to it.
    pub fn snapshot_path(&self) -> PathBuf {
        self.resolve_path(
            self.file
                .tables
                .snapshot
                .as_deref()
                .unwrap_or(DEFAULT_SNAPSHOT),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tables: TablesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds before loading or validation gives up.
    pub timeout_secs: Option<u64>,
}

fn default_max_connections() -> u32 {
    2
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TablesConfig {
    /// Empty means every table of the database.
    #[serde(default)]
    pub names: Vec<String>,
    pub snapshot: Option<String>,
}

impl ConfigFile {
    fn expand_env(&mut self) -> anyhow::Result<()> {
        self.database.url = expand_env_vars(&self.database.url)?;
        for name in &mut self.tables.names {
            *name = expand_env_vars(name)?;
        }
        if let Some(snapshot) = self.tables.snapshot.as_mut() {
            *snapshot = expand_env_vars(snapshot)?;
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url must not be empty");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }
        for name in &self.tables.names {
            dmlkit::validate_identifier(name)
                .map_err(|e| anyhow::anyhow!("tables.names: {e}"))?;
        }
        Ok(())
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> anyhow::Result<ProjectConfig> {
        ProjectConfig::parse(raw, Path::new("project/dmlkit.toml"))
    }

    #[test]
    fn full_config() {
        let cfg = parse(
            r#"
version = "1"

[database]
url = "mysql://root@localhost/magento"
timeout_secs = 10

[tables]
names = ["core_config_data", "store"]
snapshot = "schema/tables.json"
"#,
        )
        .unwrap();

        assert_eq!(cfg.file.database.max_connections, 2);
        assert_eq!(cfg.file.database.timeout_secs, Some(10));
        assert_eq!(cfg.file.tables.names, ["core_config_data", "store"]);
        assert_eq!(cfg.snapshot_path(), PathBuf::from("project/schema/tables.json"));
    }

    #[test]
    fn default_snapshot_next_to_config() {
        let cfg = parse("version = \"1\"\n[database]\nurl = \"mysql://x\"\n").unwrap();
        assert!(cfg.file.tables.names.is_empty());
        assert_eq!(cfg.snapshot_path(), PathBuf::from("project/dmlkit-tables.json"));
    }

    #[test]
    fn rejects_unknown_version() {
        let err = parse("version = \"2\"\n[database]\nurl = \"mysql://x\"\n").unwrap_err();
        assert_eq!(err.to_string(), "unsupported config version: 2");
    }

    #[test]
    fn rejects_invalid_table_name() {
        let err = parse(
            "version = \"1\"\n[database]\nurl = \"mysql://x\"\n[tables]\nnames = [\"H€llo\"]\n",
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("tables.names: Not valid:"), "{err}");
    }

    #[test]
    fn expands_env_vars() {
        // SAFETY: test-only variable name, not read by other tests.
        unsafe { std::env::set_var("DMLKIT_CONFIG_TEST_HOST", "db.internal") };
        let out = expand_env_vars("mysql://u@${DMLKIT_CONFIG_TEST_HOST}/shop").unwrap();
        assert_eq!(out, "mysql://u@db.internal/shop");

        assert!(expand_env_vars("${DMLKIT_CONFIG_TEST_MISSING}").is_err());
        assert!(expand_env_vars("${unterminated").is_err());
        assert!(expand_env_vars("${}").is_err());
        assert_eq!(expand_env_vars("$HOME and $").unwrap(), "$HOME and $");
    }
}
