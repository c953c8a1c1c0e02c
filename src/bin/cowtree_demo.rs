//! Demo driver: builds a tree in memory, churns it, and saves a summary blob.
//!
//! # Environment Variables
//!
//! - `COWTREE_DEMO_PATH`: File the summary blob is written to (default: `cowtree-demo.bin`)
//! - `COWTREE_DEMO_KEYS`: Number of keys to insert (default: `1000`)
//! - `RUST_LOG`: Log filter (default: `cowtree=debug`)

#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use std::path::PathBuf;

use cowtree::{save_data, BTree, MemPageStore};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Demo configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DemoConfig {
    /// Where the summary blob goes.
    output_path: PathBuf,
    /// Number of keys inserted before the delete pass.
    key_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

impl DemoConfig {
    const DEFAULT_PATH: &'static str = "cowtree-demo.bin";
    const DEFAULT_KEYS: u32 = 1000;

    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let output_path = lookup("COWTREE_DEMO_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_PATH));

        let key_count = match lookup("COWTREE_DEMO_KEYS") {
            Some(raw) => raw.parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                name: "COWTREE_DEMO_KEYS".to_string(),
                message: e.to_string(),
            })?,
            None => Self::DEFAULT_KEYS,
        };

        Ok(Self {
            output_path,
            key_count,
        })
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cowtree=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match DemoConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config) {
        tracing::error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

fn run(config: &DemoConfig) -> cowtree::Result<()> {
    let mut tree = BTree::new(MemPageStore::new());

    for i in 0..config.key_count {
        let key = format!("key{i:08}");
        tree.insert(key.as_bytes(), &[(i % 251) as u8; 256])?;
    }
    tracing::info!(
        keys = config.key_count,
        height = tree.height(),
        pages = tree.store().live_pages(),
        "insert pass done"
    );
    tracing::info!("insert pass {}", tree.store().stats().snapshot());
    tree.store().stats().reset();

    let mut deleted = 0u32;
    for i in (0..config.key_count).step_by(2) {
        if tree.delete(format!("key{i:08}").as_bytes())? {
            deleted += 1;
        }
    }
    tracing::info!(
        deleted,
        height = tree.height(),
        pages = tree.store().live_pages(),
        "delete pass done"
    );

    let stats = tree.store().stats().snapshot();
    tracing::info!("delete pass {stats}");

    let summary = format!(
        "keys={} deleted={} height={} {stats}\n",
        config.key_count,
        deleted,
        tree.height()
    );
    save_data(&config.output_path, summary.as_bytes())?;
    tracing::info!(path = %config.output_path.display(), "summary saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DemoConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.output_path, PathBuf::from("cowtree-demo.bin"));
        assert_eq!(config.key_count, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = DemoConfig::from_lookup(lookup_from(&[
            ("COWTREE_DEMO_PATH", "/tmp/out.bin"),
            ("COWTREE_DEMO_KEYS", "42"),
        ]))
        .unwrap();
        assert_eq!(config.output_path, PathBuf::from("/tmp/out.bin"));
        assert_eq!(config.key_count, 42);
    }

    #[test]
    fn test_invalid_key_count() {
        let err = DemoConfig::from_lookup(lookup_from(&[("COWTREE_DEMO_KEYS", "lots")])).unwrap_err();
        assert!(err.to_string().starts_with("invalid value for COWTREE_DEMO_KEYS"));
    }

    #[test]
    fn test_run_writes_summary() {
        let dir = tempfile::tempdir().unwrap();
        let config = DemoConfig {
            output_path: dir.path().join("summary.bin"),
            key_count: 300,
        };
        run(&config).unwrap();

        let summary = std::fs::read_to_string(&config.output_path).unwrap();
        assert!(summary.starts_with("keys=300 deleted=150"));
        // Counters were reset after the insert pass, so only deletes show up.
        assert!(summary.contains("freed: "));
        assert!(!summary.contains("freed: 0,"));
    }
}
