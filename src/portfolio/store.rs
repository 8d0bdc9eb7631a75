//! Whole-collection JSON persistence.
//!
//! Each namespace key maps to `<root>/<key>.json`. Updates are plain
//! read-modify-write cycles with no locking.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};
use std::path::PathBuf;

use crate::runtime::Runtime;

pub const PORTFOLIO_KEY: &str = "cryptotracker_portfolio";
pub const ALERTS_KEY: &str = "cryptotracker_alerts";

pub struct Store<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
}

impl<'a, R: Runtime> Store<'a, R> {
    pub fn new(runtime: &'a R, root: PathBuf) -> Self {
        Self { runtime, root }
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Loads a collection. A missing or unreadable file yields an empty collection.
    #[tracing::instrument(skip(self))]
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let path = self.path(key);
        if !self.runtime.exists(&path) {
            debug!("{} does not exist yet, starting empty", path.display());
            return Vec::new();
        }

        let parsed = self
            .runtime
            .read_to_string(&path)
            .and_then(|content| serde_json::from_str(&content).map_err(anyhow::Error::from));

        match parsed {
            Ok(items) => items,
            Err(e) => {
                warn!("Ignoring unreadable {}: {:#}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Replaces a collection on disk.
    #[tracing::instrument(skip(self, items))]
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let path = self.path(key);
        if !self.runtime.exists(&self.root) {
            self.runtime.create_dir_all(&self.root)?;
        }

        let json = serde_json::to_string_pretty(items)?;
        self.runtime
            .write(&path, json.as_bytes())
            .with_context(|| format!("Failed to save {}", path.display()))?;

        debug!("Saved {} item(s) to {}", items.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::fixtures::{alert, holding};
    use crate::portfolio::{AlertCondition, Holding, PriceAlert};
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;

    #[test]
    fn test_load_missing_file_is_empty() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/data");

        runtime
            .expect_exists()
            .with(eq(root.join("cryptotracker_portfolio.json")))
            .returning(|_| false);

        let store = Store::new(&runtime, root);
        let holdings: Vec<Holding> = store.load(PORTFOLIO_KEY);
        assert!(holdings.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/data");
        let path = root.join("cryptotracker_alerts.json");

        runtime
            .expect_exists()
            .with(eq(path.clone()))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(path))
            .returning(|_| Ok("{ not json".to_string()));

        let store = Store::new(&runtime, root);
        let alerts: Vec<PriceAlert> = store.load(ALERTS_KEY);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_save_creates_root_and_writes_json() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/data");
        let path = root.join("cryptotracker_portfolio.json");

        runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| false);
        runtime
            .expect_create_dir_all()
            .with(eq(root.clone()))
            .times(1)
            .returning(|_| Ok(()));
        runtime
            .expect_write()
            .withf(move |p, contents| {
                let text = std::str::from_utf8(contents).unwrap();
                p == path && text.contains("\"cryptoId\": \"bitcoin\"")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let store = Store::new(&runtime, root);
        store
            .save(PORTFOLIO_KEY, &[holding("h1", "bitcoin", 1.0, 10.0)])
            .unwrap();
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = RealRuntime;
        let store = Store::new(&runtime, dir.path().join("sidekick"));

        let alerts = vec![
            alert("a1", "bitcoin", AlertCondition::Above, 70_000.0),
            alert("a2", "solana", AlertCondition::Below, 100.0),
        ];
        store.save(ALERTS_KEY, &alerts).unwrap();

        let loaded: Vec<PriceAlert> = store.load(ALERTS_KEY);
        assert_eq!(loaded, alerts);
        assert!(store.path(ALERTS_KEY).ends_with("cryptotracker_alerts.json"));
    }
}
