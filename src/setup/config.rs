use crate::ConfigError;
use log::{debug, trace};
use serde::Deserialize;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Where quotes are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Datasource {
    File,
    #[default]
    Sqlite,
}

impl Datasource {
    /// File extension appended to the configured file name
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::File => "txt",
            Self::Sqlite => "db",
        }
    }
}

impl FromStr for Datasource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::UnknownDatasource(other.to_string())),
        }
    }
}

impl fmt::Display for Datasource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// The `[quote]` table of the host config. Every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct QuoteSection {
    pub datasource: Option<String>,
    pub filename: Option<String>,
    pub onefile: Option<bool>,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct HostConfig {
    #[serde(default)]
    quote: QuoteSection,
}

impl QuoteSection {
    /// Parses the `[quote]` table out of a host config document. Other tables are ignored
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the document is not valid TOML or `[quote]` has the wrong shape
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        let host: HostConfig = toml::from_str(document)?;
        trace!("Parsed quote section: {:?}", &host.quote);
        Ok(host.quote)
    }

    /// Reads and parses a host config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file can't be read, or `ConfigError::Parse`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let document = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config file: {}", path.display());
        Self::from_toml(&document)
    }

    /// Overlays the keys set in `other` on top of `self`
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            datasource: other.datasource.or(self.datasource),
            filename: other.filename.or(self.filename),
            onefile: other.onefile.or(self.onefile),
            data_dir: other.data_dir.or(self.data_dir),
        }
    }

    /// Applies defaults and validates the section
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `ConfigError::UnknownDatasource` if `datasource` is neither `file` nor `sqlite`
    /// - `ConfigError::Missing` if `filename` is set but empty
    pub fn resolve(self) -> Result<QuoteConfig, ConfigError> {
        let datasource = match self.datasource.as_deref() {
            None | Some("") => Datasource::default(),
            Some(name) => name.parse()?,
        };

        let filename = self.filename.unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        if filename.trim().is_empty() {
            return Err(ConfigError::Missing("filename"));
        }

        Ok(QuoteConfig {
            datasource,
            filename,
            onefile: self.onefile.unwrap_or(false),
            data_dir: self.data_dir.unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

pub const DEFAULT_FILENAME: &str = "quotes";

/// Validated quote settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteConfig {
    pub datasource: Datasource,
    pub filename: String,
    pub onefile: bool,
    pub data_dir: PathBuf,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            datasource: Datasource::default(),
            filename: DEFAULT_FILENAME.to_string(),
            onefile: false,
            data_dir: PathBuf::from("."),
        }
    }
}

/// A concrete store to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    pub datasource: Datasource,
    pub path: PathBuf,
}

impl QuoteConfig {
    /// Works out which file holds the quotes of `channel`.
    ///
    /// With `onefile` unset every channel gets its own store named
    /// `<filename>_<channel>`, so a channel is required.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing("channel")` if per-channel stores are used
    /// and the channel is absent or empty once sanitized
    pub fn locate(&self, channel: Option<&str>) -> Result<StoreLocation, ConfigError> {
        let stem = if self.onefile {
            self.filename.clone()
        } else {
            let channel = channel
                .map(sanitize_channel)
                .filter(|c| !c.is_empty())
                .ok_or(ConfigError::Missing("channel"))?;
            format!("{}_{channel}", self.filename)
        };

        let path = self
            .data_dir
            .join(format!("{stem}.{}", self.datasource.extension()));
        trace!("Resolved {} store: {}", self.datasource, path.display());
        Ok(StoreLocation {
            datasource: self.datasource,
            path,
        })
    }
}

/// Strips `#` from a channel name and keeps it from escaping the data directory
#[must_use]
pub fn sanitize_channel(channel: &str) -> String {
    channel
        .trim()
        .replace('#', "")
        .replace(['/', '\\'], "_")
        .replace("..", "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let config = QuoteSection::default().resolve().unwrap();
        assert_eq!(config, QuoteConfig::default());
        assert_eq!(config.datasource, Datasource::Sqlite);
        assert_eq!(config.filename, "quotes");
        assert!(!config.onefile);
    }

    #[test]
    fn missing_quote_table_uses_defaults() {
        let section = QuoteSection::from_toml("[core]\nnick = \"bot\"\n").unwrap();
        assert_eq!(section, QuoteSection::default());
    }

    #[test]
    fn parses_quote_table() {
        let section = QuoteSection::from_toml(
            r#"
            [core]
            nick = "bot"

            [quote]
            datasource = "file"
            filename = "sayings"
            onefile = true
            data_dir = "/var/lib/bot"
            "#,
        )
        .unwrap();

        let config = section.resolve().unwrap();
        assert_eq!(config.datasource, Datasource::File);
        assert_eq!(config.filename, "sayings");
        assert!(config.onefile);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/bot"));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_toml() {
        assert!(matches!(
            QuoteSection::from_toml("[quote]\nfilenmae = \"x\"\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            QuoteSection::from_toml("[quote\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn unknown_datasource_is_fatal() {
        let section = QuoteSection {
            datasource: Some("postgres".to_string()),
            ..QuoteSection::default()
        };

        let err = section.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDatasource(ref name) if name == "postgres"));
        assert_eq!(err.to_string(), "unknown datasource set in config: postgres");
    }

    #[test]
    fn empty_filename_is_missing() {
        let section = QuoteSection {
            filename: Some(String::new()),
            ..QuoteSection::default()
        };

        assert!(matches!(
            section.resolve(),
            Err(ConfigError::Missing("filename"))
        ));
    }

    #[test]
    fn merge_prefers_overrides() {
        let file = QuoteSection {
            datasource: Some("file".to_string()),
            filename: Some("from_file".to_string()),
            ..QuoteSection::default()
        };
        let flags = QuoteSection {
            filename: Some("from_flags".to_string()),
            onefile: Some(true),
            ..QuoteSection::default()
        };

        let merged = file.merge(flags);
        assert_eq!(merged.datasource.as_deref(), Some("file"));
        assert_eq!(merged.filename.as_deref(), Some("from_flags"));
        assert_eq!(merged.onefile, Some(true));
    }

    #[test]
    fn per_channel_location() {
        let config = QuoteConfig::default();

        let location = config.locate(Some("#rust")).unwrap();
        assert_eq!(location.path, PathBuf::from(".").join("quotes_rust.db"));
        assert_eq!(location.datasource, Datasource::Sqlite);
    }

    #[test]
    fn one_file_ignores_channel() {
        let config = QuoteConfig {
            datasource: Datasource::File,
            onefile: true,
            data_dir: PathBuf::from("data"),
            ..QuoteConfig::default()
        };

        assert_eq!(
            config.locate(None).unwrap().path,
            PathBuf::from("data").join("quotes.txt")
        );
        assert_eq!(
            config.locate(Some("#a")).unwrap(),
            config.locate(Some("#b")).unwrap()
        );
    }

    #[test]
    fn per_channel_store_needs_a_channel() {
        let config = QuoteConfig::default();

        assert!(matches!(
            config.locate(None),
            Err(ConfigError::Missing("channel"))
        ));
        assert!(matches!(
            config.locate(Some("##")),
            Err(ConfigError::Missing("channel"))
        ));
    }

    #[test]
    fn sanitize_keeps_channel_inside_data_dir() {
        assert_eq!(sanitize_channel("#rust"), "rust");
        assert_eq!(sanitize_channel("##rust-offtopic"), "rust-offtopic");
        assert_eq!(sanitize_channel("#../etc/passwd"), "__etc_passwd");
        assert_eq!(sanitize_channel("a\\b"), "a_b");
    }
}
