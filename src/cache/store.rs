//! The query performance cache.

use std::path::Path;

use ahash::AHashMap;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::error::{LexpandError, Result};
use crate::query::repr::QueryRepr;
use crate::query::signature::{SignatureMode, encode};

use super::channel::SocketChannel;
use super::performance::{CacheKey, Performance, parse_reply};
use super::snapshot::{self, Snapshot};

/// The request sent to the backend for one evaluation.
#[derive(Debug, Serialize)]
struct CnfRequest<'a> {
    query: &'a str,
    query_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rel: Option<Vec<u64>>,
}

/// One `get_performance` call.
///
/// ```
/// use lexpand::cache::PerformanceRequest;
/// use lexpand::query::TermTags;
///
/// let repr = vec![vec![vec![TermTags::source("bank")]]];
/// let relevant = [3, 1, 3];
/// let request = PerformanceRequest::new(&repr)
///     .restricted_to(&relevant, 42)
///     .force(true);
/// assert!(request.is_restricted());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PerformanceRequest<'a> {
    repr: &'a QueryRepr,
    restriction: Option<(&'a [u64], u64)>,
    include_time: bool,
    force: bool,
}

impl<'a> PerformanceRequest<'a> {
    /// An unrestricted request that wants timing and accepts cached results.
    pub fn new(repr: &'a QueryRepr) -> Self {
        Self {
            repr,
            restriction: None,
            include_time: true,
            force: false,
        }
    }

    /// Evaluate against the relevant documents `document_ids`, cached under
    /// the caller-chosen `key`. An empty id list leaves the request
    /// unrestricted.
    pub fn restricted_to(mut self, document_ids: &'a [u64], key: u64) -> Self {
        self.restriction = (!document_ids.is_empty()).then_some((document_ids, key));
        self
    }

    /// Whether a cached entry without timing is good enough.
    pub fn include_time(mut self, include_time: bool) -> Self {
        self.include_time = include_time;
        self
    }

    /// Always ask the backend, even when a usable entry is cached.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn is_restricted(&self) -> bool {
        self.restriction.is_some()
    }
}

/// State shared by every call, guarded by one lock.
#[derive(Debug, Default)]
struct CacheState {
    table: AHashMap<CacheKey, Performance>,
    channel: Option<SocketChannel>,
}

impl CacheState {
    /// Send one request and wait for its reply, connecting first if needed.
    ///
    /// A broken or desynchronized channel is dropped; the next call opens a
    /// fresh connection.
    fn round_trip<T: Serialize>(&mut self, host: &str, port: u16, request: &T) -> Result<Value> {
        let mut channel = match self.channel.take() {
            Some(channel) => channel,
            None => SocketChannel::connect(host, port)?,
        };

        let result = channel.send(request).and_then(|()| {
            channel.receive()?.ok_or_else(|| {
                LexpandError::connection(format!(
                    "Connection to {} closed before a complete reply",
                    channel.peer()
                ))
            })
        });

        match &result {
            Err(e) if e.is_terminal_for_channel() => {
                warn!("Dropping channel to {}: {e}", channel.peer());
            }
            _ => self.channel = Some(channel),
        }
        result
    }
}

/// A grow-only cache of backend query evaluations, bound to one backend.
///
/// The table and the backend connection live behind a single mutex, held for
/// the whole check / request / store / back-fill sequence of a call. Calls
/// from several threads are therefore serialized.
#[derive(Debug)]
pub struct QueryPerformanceCache {
    host: String,
    port: u16,
    mode: SignatureMode,
    state: Mutex<CacheState>,
}

impl QueryPerformanceCache {
    /// Create an empty cache. No connection is opened until the first miss.
    pub fn new<S: Into<String>>(host: S, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            mode: SignatureMode::default(),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Choose how representations are turned into signatures.
    pub fn with_signature_mode(mut self, mode: SignatureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn signature_mode(&self) -> SignatureMode {
        self.mode
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.state.lock().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().table.is_empty()
    }

    /// The cached entry for `key`, without contacting the backend.
    pub fn get(&self, key: &CacheKey) -> Option<Performance> {
        self.state.lock().table.get(key).copied()
    }

    /// All entries, sorted by key.
    pub fn entries(&self) -> Vec<(CacheKey, Performance)> {
        let state = self.state.lock();
        let mut entries: Vec<_> = state
            .table
            .iter()
            .map(|(key, performance)| (key.clone(), *performance))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Use `channel` for the following round trips instead of connecting to
    /// `host:port`.
    pub fn attach(&self, channel: SocketChannel) {
        self.state.lock().channel = Some(channel);
    }

    /// Close the current connection, if any.
    pub fn disconnect(&self) {
        self.state.lock().channel = None;
    }

    pub fn is_connected(&self) -> bool {
        self.state.lock().channel.is_some()
    }

    /// The signature a representation is cached and evaluated under.
    pub fn signature(&self, repr: &QueryRepr) -> String {
        encode(repr, self.mode)
    }

    /// Get the performance of a query, asking the backend only on a miss.
    ///
    /// A hit needs an entry under the request's key that has timing, or a
    /// request that does not want timing. On a miss exactly one request is
    /// sent; a failure leaves the table untouched. A restricted evaluation
    /// also fills in the unrestricted entry of the same signature when that
    /// entry is missing or lacks requested timing.
    ///
    /// A representation with no AND-group, or with an empty one, has no
    /// decodable signature and is rejected before any round trip.
    pub fn get_performance(&self, request: &PerformanceRequest<'_>) -> Result<Performance> {
        if request.repr.is_empty() || request.repr.iter().any(Vec::is_empty) {
            return Err(LexpandError::format("Cannot evaluate an empty representation"));
        }

        let signature = self.signature(request.repr);
        let key = match request.restriction {
            Some((_, restriction)) => CacheKey::Restricted {
                signature: signature.clone(),
                restriction,
            },
            None => CacheKey::Unrestricted(signature.clone()),
        };

        let mut state = self.state.lock();

        if !request.force {
            if let Some(cached) = state.table.get(&key) {
                if !request.include_time || cached.exe_time().is_some() {
                    debug!("Cache hit: {key:?}");
                    return Ok(*cached);
                }
            }
        }
        debug!("Cache miss: {key:?}");

        let rel = request.restriction.map(|(document_ids, _)| {
            let mut ids = document_ids.to_vec();
            ids.sort_unstable();
            ids.dedup();
            ids
        });
        let backend_request = CnfRequest {
            query: &signature,
            query_type: "cnf",
            rel,
        };

        let reply = state.round_trip(&self.host, self.port, &backend_request)?;
        let performance = parse_reply(&reply, request.is_restricted())?;

        state.table.insert(key, performance);

        if let Performance::Restricted(restricted) = performance {
            let unrestricted = CacheKey::Unrestricted(signature);
            let stale = match state.table.get(&unrestricted) {
                None => true,
                Some(existing) => request.include_time && existing.exe_time().is_none(),
            };
            if stale {
                state
                    .table
                    .insert(unrestricted, Performance::Unrestricted(restricted.subset()));
            }
        }

        Ok(performance)
    }

    /// Write the host, port and every entry to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let snapshot = Snapshot {
            host: self.host.clone(),
            port: self.port,
            entries: self.entries(),
        };
        snapshot::save(path, &snapshot)?;
        info!(
            "Saved {} cache entries to {}",
            snapshot.entries.len(),
            path.display()
        );
        Ok(())
    }

    /// Restore a cache saved with [`save`](Self::save). The cache is bound to
    /// the saved host and port and starts disconnected.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let Snapshot {
            host,
            port,
            entries,
        } = snapshot::load(path)?;

        info!(
            "Loaded {} cache entries for {host}:{port} from {}",
            entries.len(),
            path.display()
        );

        let cache = Self::new(host, port);
        cache.state.lock().table = entries.into_iter().collect();
        Ok(cache)
    }
}
