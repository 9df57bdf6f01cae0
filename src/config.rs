use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use homedir::my_home;
use serde::{Deserialize, Serialize};

use crate::{
    selector::Selector,
    store::{BackendLocal, StorageManager},
};

const CONFIG_FILE: &str = "config.yaml";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Named selectors, referenced as `@name` on the command line.
    #[serde(default)]
    pub selectors: BTreeMap<String, String>,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Config {
    /// `$TAGSEL_BASE_PATH`, else `~/.local/share/tagsel`.
    pub fn base_path() -> Result<String> {
        if let Ok(base_path) = std::env::var("TAGSEL_BASE_PATH") {
            return Ok(base_path);
        }
        let home = my_home()
            .context("Could not determine home directory")?
            .context("Home directory path is empty")?;
        Ok(format!("{}/.local/share/tagsel", home.to_string_lossy()))
    }

    fn validate(&self) -> Result<()> {
        for (name, expr) in &self.selectors {
            validate_name(name)?;
            expr.parse::<Selector>()
                .with_context(|| format!("selector @{name} is malformed"))?;
        }
        Ok(())
    }

    pub fn load_with(base_path: &str) -> Result<Self> {
        let store = BackendLocal::new(base_path)
            .with_context(|| format!("failed to create {base_path}"))?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            log::info!("writing default config to {base_path}/{CONFIG_FILE}");
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)
            .context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_string();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let store = BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }

    pub fn selector(&self, name: &str) -> Result<Selector> {
        let Some(expr) = self.selectors.get(name) else {
            bail!("no selector named @{name}");
        };
        Ok(expr.parse()?)
    }

    /// Store a selector under `name`, replacing any previous one. The
    /// expression must parse.
    pub fn add_selector(&mut self, name: &str, expr: &str) -> Result<Selector> {
        validate_name(name)?;
        let selector: Selector = expr.parse()?;
        self.selectors.insert(name.to_string(), expr.to_string());
        Ok(selector)
    }

    pub fn remove_selector(&mut self, name: &str) -> Option<String> {
        self.selectors.remove(name)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        bail!("selector name {name:?} may only contain letters, digits, '-' and '_'");
    }
    Ok(())
}
