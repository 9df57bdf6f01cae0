use std::{collections::BTreeSet, path::Path};

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{selector::Expr, tag};

/// One taggable piece of content, e.g. a glossary term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Tags are normalized on the way in so they compare equal to the
    /// literals of a parsed selector.
    pub fn new(items: Vec<Item>) -> Self {
        let items = items
            .into_iter()
            .map(|item| Item {
                tags: item.tags.iter().map(|t| tag::normalize(t)).collect(),
                name: item.name,
            })
            .collect();
        Self { items }
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let items: Vec<Item> = serde_json::from_str(input).context("catalog is not valid json")?;
        Ok(Self::new(items))
    }

    pub fn from_yaml(input: &str) -> Result<Self> {
        let items: Vec<Item> = serde_yml::from_str(input).context("catalog is not valid yaml")?;
        Ok(Self::new(items))
    }

    /// Format is picked from the extension: `.json`, `.yaml` or `.yml`.
    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let catalog = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&input)?,
            Some("yaml" | "yml") => Self::from_yaml(&input)?,
            _ => bail!(
                "unsupported catalog format {}, expected .json, .yaml or .yml",
                path.display()
            ),
        };

        log::debug!("loaded {} items from {}", catalog.items.len(), path.display());
        Ok(catalog)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items selected by `expr`, in catalog order.
    pub fn filter(&self, expr: &Expr) -> Vec<&Item> {
        self.items
            .par_iter()
            .filter(|item| expr.matches(&item.tags))
            .collect()
    }

    /// Sorted union of every item's tags.
    pub fn known_tags(&self) -> BTreeSet<&str> {
        self.items
            .iter()
            .flat_map(|item| item.tags.iter().map(String::as_str))
            .collect()
    }
}
