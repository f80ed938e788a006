//! JSON configuration and path resolution
//!
//! The configuration file is read once into a [`RawConfig`] and then resolved
//! against the program and home directories into an immutable [`Settings`]
//! value. Resolution is a pure function of the raw config and [`Dirs`], so it
//! can be tested without touching the real environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::layout::RedactionRegion;

/// Path value that stands for the directory the program lives in
pub const SCRIPT_PATH_SENTINEL: &str = "scriptpath";

/// Configuration file used when none is given on the command line
pub const DEFAULT_CONFIG_NAME: &str = "variables.json";

/// Configuration exactly as it appears in the JSON file
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    pub searchfile: SearchFile,
    pub mergefile: NamedFile,
    pub outfile: OutFile,
    pub excludednames: NamedFile,
    #[serde(default)]
    pub debug: DebugConfig,
    #[serde(default)]
    pub redaction: Option<RedactionRegion>,
}

/// Parameters for locating the source timesheet
#[derive(Debug, Clone, Deserialize)]
pub struct SearchFile {
    pub namekeyword: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub path: String,
}

/// A file given as a directory plus a file name
#[derive(Debug, Clone, Deserialize)]
pub struct NamedFile {
    pub path: String,
    pub name: String,
}

/// Output directory and file name prefix
#[derive(Debug, Clone, Deserialize)]
pub struct OutFile {
    pub name: String,
    pub path: String,
}

/// Which diagnostic categories to dump
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebugConfig {
    #[serde(default)]
    pub active: bool,
    /// Values recorded by the pipeline stages
    #[serde(default)]
    pub locals: bool,
    /// The resolved settings
    #[serde(default)]
    pub scope: bool,
    /// Program environment (directories, version)
    #[serde(default)]
    pub globals: bool,
    /// Extra `label -> context key` lookups
    #[serde(default)]
    pub kwargs: BTreeMap<String, String>,
}

/// Directories that relative configuration paths are resolved against
#[derive(Debug, Clone, PartialEq)]
pub struct Dirs {
    /// Directory containing the running executable
    pub program_dir: PathBuf,
    /// The user's home directory
    pub home_dir: PathBuf,
}

impl Dirs {
    /// Detect the program and home directories of the current process
    pub fn detect() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let program_dir = exe
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::General(format!("No parent directory for {}", exe.display())))?;

        let home_dir = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .ok_or_else(|| Error::General("Unable to determine the home directory".to_string()))?;

        Ok(Self { program_dir, home_dir })
    }

    /// Resolve a configured directory value.
    ///
    /// The sentinel maps to the program directory, absolute paths are kept
    /// and anything else is taken relative to the home directory.
    pub fn resolve(&self, value: &str) -> PathBuf {
        if value == SCRIPT_PATH_SENTINEL {
            return self.program_dir.clone();
        }

        let path = Path::new(value);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.home_dir.join(path)
        }
    }

    /// Location of the configuration file named on the command line
    pub fn config_path(&self, arg: &Path) -> PathBuf {
        if arg.is_absolute() {
            arg.to_path_buf()
        } else {
            self.program_dir.join(arg)
        }
    }
}

/// Source file search criteria
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub keyword: String,
    pub extension: String,
    pub folder: PathBuf,
}

/// Fully resolved, immutable run configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub search: SearchSettings,
    /// Watermark (signature line) PDF
    pub watermark: PathBuf,
    /// Prefix of the output file name, followed by the run timestamp
    pub output_prefix: String,
    pub output_dir: PathBuf,
    /// Folder and file name of the excluded-name list
    pub excluded_names_dir: PathBuf,
    pub excluded_names_file: String,
    /// Where the intermediate redacted document is created
    pub work_dir: PathBuf,
    pub redaction: RedactionRegion,
    pub debug: DebugConfig,
}

impl Settings {
    pub fn excluded_names_path(&self) -> PathBuf {
        self.excluded_names_dir.join(&self.excluded_names_file)
    }
}

impl RawConfig {
    /// Load the configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_json(&content).map_err(|e| match e {
            Error::ConfigLoad { reason, .. } => Error::ConfigLoad {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse the configuration from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigLoad {
            path: PathBuf::new(),
            reason: e.to_string(),
        })
    }

    /// Resolve every configured path into a new [`Settings`] value
    pub fn resolve(&self, dirs: &Dirs) -> Settings {
        Settings {
            search: SearchSettings {
                keyword: self.searchfile.namekeyword.clone(),
                extension: self.searchfile.file_type.clone(),
                folder: dirs.resolve(&self.searchfile.path),
            },
            watermark: dirs.resolve(&self.mergefile.path).join(&self.mergefile.name),
            output_prefix: self.outfile.name.clone(),
            output_dir: dirs.resolve(&self.outfile.path),
            excluded_names_dir: dirs.resolve(&self.excludednames.path),
            excluded_names_file: self.excludednames.name.clone(),
            work_dir: dirs.program_dir.clone(),
            redaction: self.redaction.unwrap_or_default(),
            debug: self.debug.clone(),
        }
    }
}
