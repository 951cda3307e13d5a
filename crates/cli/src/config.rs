use anyhow::{Context, Result};
use geosafe::metric::BufferStyle;
use geosafe::relax::RelaxCfg;
use geosafe::safe_ops::SafeOpsCfg;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables loaded from `--config`; missing fields keep library defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub buffer: BufferStyle,
    pub safe_ops: SafeOpsCfg,
    pub relax: RelaxCfg,
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let bytes =
            std::fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing config {}", path.display()))
    }
}
