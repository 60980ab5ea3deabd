use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use anyhow::{Context, Result};
use thiserror::Error;

use super::model::NetworkData;
use super::parse::{ParseError, parse_network};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Loads network documents from `<root>/networks/<name>.json` and keeps every
/// successfully parsed document in memory for the rest of the session.
pub struct DataFetcher {
    root: PathBuf,
    cache: Mutex<HashMap<String, Arc<NetworkData>>>,
}

impl DataFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn network_path(&self, name: &str) -> PathBuf {
        self.root.join("networks").join(format!("{name}.json"))
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn fetch(&self, name: &str) -> Result<Arc<NetworkData>, FetchError> {
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            tracing::debug!(network = name, "network cache hit");
            return Ok(Arc::clone(hit));
        }

        let path = self.network_path(name);
        let raw = fs::read_to_string(&path).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;
        let data = parse_network(&raw).map_err(|source| FetchError::Parse {
            path: path.clone(),
            source,
        })?;
        tracing::info!(
            network = name,
            nodes = data.nodes.len(),
            edges = data.edges.len(),
            "loaded network"
        );

        let data = Arc::new(data);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), Arc::clone(&data));
        Ok(data)
    }

    pub fn available_networks(&self) -> Result<Vec<String>> {
        let dir = self.root.join("networks");
        let entries = fs::read_dir(&dir)
            .with_context(|| format!("failed to list network directory {}", dir.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("failed to read entry in {}", dir.display()))?
                .path();
            if path.extension().is_some_and(|extension| extension == "json")
                && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
            {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

pub fn spawn_fetch(
    fetcher: Arc<DataFetcher>,
    name: String,
) -> Receiver<Result<Arc<NetworkData>, String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = fetcher.fetch(&name).map_err(|error| {
            tracing::error!(network = %name, %error, "network fetch failed");
            error.to_string()
        });
        let _ = tx.send(result);
    });

    rx
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn write_network(dir: &Path, name: &str, body: &str) {
        let networks = dir.join("networks");
        fs::create_dir_all(&networks).expect("create networks dir");
        fs::write(networks.join(format!("{name}.json")), body).expect("write network");
    }

    const TINY: &str = r#"{"nodes": [{"id": "a", "type": "person"}], "edges": []}"#;

    #[test]
    fn second_fetch_is_served_from_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_network(dir.path(), "global", TINY);
        let fetcher = DataFetcher::new(dir.path());

        let first = fetcher.fetch("global").expect("first fetch");
        fs::remove_file(fetcher.network_path("global")).expect("remove file");
        let second = fetcher.fetch("global").expect("cached fetch");

        assert!(Arc::ptr_eq(&first, &second));
        assert!(fetcher.is_cached("global"));
    }

    #[test]
    fn missing_file_is_an_io_error_with_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fetcher = DataFetcher::new(dir.path());
        let error = fetcher.fetch("absent").expect_err("file is missing");
        assert!(matches!(error, FetchError::Io { .. }));
        assert!(error.to_string().contains("absent.json"));
        assert!(!fetcher.is_cached("absent"));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_network(dir.path(), "broken", "{ not json");
        let fetcher = DataFetcher::new(dir.path());
        assert!(matches!(
            fetcher.fetch("broken"),
            Err(FetchError::Parse { .. })
        ));
    }

    #[test]
    fn lists_json_networks_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_network(dir.path(), "topic-network", TINY);
        write_network(dir.path(), "global", TINY);
        fs::write(dir.path().join("networks").join("notes.txt"), "x").expect("write");
        let fetcher = DataFetcher::new(dir.path());
        assert_eq!(
            fetcher.available_networks().expect("list"),
            ["global", "topic-network"]
        );
    }

    #[test]
    fn spawned_fetch_reports_through_channel() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_network(dir.path(), "global", TINY);
        let fetcher = Arc::new(DataFetcher::new(dir.path()));
        let rx = spawn_fetch(Arc::clone(&fetcher), "global".to_owned());
        let data = rx.recv().expect("worker sends").expect("fetch succeeds");
        assert_eq!(data.nodes.len(), 1);
    }
}
