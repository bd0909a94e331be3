//! `lvt.toml` project configuration (spec §3 ambient-stack "Config"),
//! analogous to the teacher's `packages/cli-config`.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    pub name: String,
    /// Mirrors `lvt_server::DEFAULT_RENDER_BUDGET` in milliseconds so it's
    /// plain-data in the config file rather than a `Duration`.
    #[serde(default = "default_render_budget_ms")]
    pub render_budget_ms: u64,
}

fn default_render_budget_ms() -> u64 {
    1000
}

impl ProjectConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), render_budget_ms: default_render_budget_ms() }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        toml::from_str(&text).map_err(|e| anyhow::anyhow!("parsing {}: {e}", path.display()))
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_toml() {
        let cfg = ProjectConfig::new("demo");
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: ProjectConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.name, "demo");
        assert_eq!(back.render_budget_ms, 1000);
    }
}
