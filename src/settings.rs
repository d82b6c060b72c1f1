use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::form::Taxpayer;
use crate::parser::sections::LineGate;

const DEFAULT_CONFIG: &str = "form8949";
const ENV_PREFIX: &str = "FORM8949";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Two-page fillable form used for every output page.
    pub template: PathBuf,
    /// Where the intermediate tables and per-section documents live.
    pub work_dir: PathBuf,
    /// Merged document.
    pub output: PathBuf,
    pub taxpayer_name: String,
    pub taxpayer_id: String,
    /// Forward only keyword lines to the record builder.
    pub keyword_gate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            template: PathBuf::from("f8949.pdf"),
            work_dir: PathBuf::from("."),
            output: PathBuf::from("f8949_filled.pdf"),
            taxpayer_name: String::new(),
            taxpayer_id: String::new(),
            keyword_gate: true,
        }
    }
}

impl Settings {
    /// Defaults, then `form8949.toml` (or the given file, which must exist),
    /// then `FORM8949_*` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG).required(false),
        };
        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("loading configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    pub fn gate(&self) -> LineGate {
        if self.keyword_gate {
            LineGate::Keywords
        } else {
            LineGate::All
        }
    }

    pub fn taxpayer(&self) -> Taxpayer {
        Taxpayer {
            name: self.taxpayer_name.clone(),
            tin: self.taxpayer_id.clone(),
        }
    }
}

// ── Tests ──
