use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::db::Database;
use crate::search::filters::{default_date, parse_date, FilterSet, DEFAULT_BEGIN, DEFAULT_END};
use crate::search::grid::DEFAULT_PAGE_SIZE;
use crate::search::query::{Projection, QueryBuilder, DEFAULT_ENTITY_ID_FLOOR};

/// `[database]` block.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

/// `[search]` block.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub default_begin: Option<String>,
    pub default_end: Option<String>,
    pub entity_id_floor: i64,
    pub page_size: usize,
    pub include_preview_columns: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            default_begin: None,
            default_end: None,
            entity_id_floor: DEFAULT_ENTITY_ID_FLOOR,
            page_size: DEFAULT_PAGE_SIZE,
            include_preview_columns: true,
        }
    }
}

/// `[preview]` block.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PreviewConfig {
    pub viewer_url: String,
    pub pdf_base_url: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            viewer_url: "https://drive.google.com/viewerng/viewer".to_string(),
            pdf_base_url: "https://foiarchive-covid-19.s3.amazonaws.com/fauci/pdfs".to_string(),
        }
    }
}

/// Top-level foiex config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct ExplorerConfig {
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub preview: PreviewConfig,
}

impl ExplorerConfig {
    /// Load config from ~/.foiex/config.toml. Returns default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(ExplorerConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config.toml")
    }

    /// Render the effective config, defaults included.
    pub fn display(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Filter set seeded with the configured (or built-in) date window.
    pub fn default_filters(&self) -> Result<FilterSet> {
        let begin = match self.search.default_begin.as_deref() {
            Some(s) => parse_date(s).context("Bad search.default_begin in config")?,
            None => default_date(DEFAULT_BEGIN),
        };
        let end = match self.search.default_end.as_deref() {
            Some(s) => parse_date(s).context("Bad search.default_end in config")?,
            None => default_date(DEFAULT_END),
        };
        Ok(FilterSet::new(begin, end))
    }

    pub fn query_builder(&self) -> QueryBuilder {
        let projection = if self.search.include_preview_columns {
            Projection::WithPreview
        } else {
            Projection::Minimal
        };
        QueryBuilder::new(projection, self.search.entity_id_floor)
    }
}

/// Resolve the database path: --db flag (or FOIEX_DB) > config > default.
pub fn resolve_db_path(cli_flag: Option<PathBuf>, config: &ExplorerConfig) -> Result<PathBuf> {
    if let Some(path) = cli_flag.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    if let Some(ref path) = config.database.path {
        return expand_home(path);
    }
    Database::default_db_path()
}

fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().context("Could not determine home directory")?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Path to the config file: ~/.foiex/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".foiex").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.foiex/config.toml
# Database resolution order: --db flag > FOIEX_DB env var > [database] path > ~/.foiex/foiex.db

[database]
# path = "~/data/dc19.db"

[search]
# default_begin = "2020-03-19"
# default_end = "2020-03-20"
# entity_id_floor = 515
# page_size = 25
# include_preview_columns = true

[preview]
# viewer_url = "https://drive.google.com/viewerng/viewer"
# pdf_base_url = "https://foiarchive-covid-19.s3.amazonaws.com/fauci/pdfs"
"#
}

/// Create the default config file if it doesn't already exist.
pub fn init_config() -> Result<bool> {
    let path = config_path()?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, default_config_template())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_to_defaults() {
        let cfg = ExplorerConfig::parse(default_config_template()).unwrap();
        assert_eq!(cfg, ExplorerConfig::default());
        assert_eq!(cfg.search.entity_id_floor, 515);
        assert_eq!(cfg.search.page_size, 25);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = ExplorerConfig::parse(
            "[search]\ndefault_begin = \"2020-04-01\"\ninclude_preview_columns = false\n",
        )
        .unwrap();
        assert_eq!(cfg.search.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.preview, PreviewConfig::default());

        let f = cfg.default_filters().unwrap();
        assert_eq!(f.begin_date, parse_date("2020-04-01").unwrap());
        assert_eq!(f.end_date, parse_date("2020-03-20").unwrap());

        let q = cfg.query_builder().build(&FilterSet::default()).unwrap();
        assert!(q.sql.contains("NULL AS source_url_email"));
    }

    #[test]
    fn bad_default_date_is_an_error() {
        let cfg = ExplorerConfig::parse("[search]\ndefault_end = \"March 20\"\n").unwrap();
        assert!(cfg.default_filters().is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let cfg = ExplorerConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, ExplorerConfig::default());
    }

    #[test]
    fn db_path_resolution_order() {
        let mut cfg = ExplorerConfig::default();
        cfg.database.path = Some(PathBuf::from("/data/dc19.db"));

        let flag = resolve_db_path(Some(PathBuf::from("/tmp/flag.db")), &cfg).unwrap();
        assert_eq!(flag, PathBuf::from("/tmp/flag.db"));

        let from_cfg = resolve_db_path(None, &cfg).unwrap();
        assert_eq!(from_cfg, PathBuf::from("/data/dc19.db"));

        let empty_flag = resolve_db_path(Some(PathBuf::new()), &cfg).unwrap();
        assert_eq!(empty_flag, PathBuf::from("/data/dc19.db"));
    }
}
