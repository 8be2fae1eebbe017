//! Integration tests for the query performance cache against a fake backend.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use lexpand::cache::{CacheKey, Performance, QueryPerformanceSubset};
use lexpand::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

/// A backend answering each request with `answer(request)`, counting requests.
struct FakeBackend {
    port: u16,
    requests: Arc<AtomicUsize>,
    received: Arc<parking_lot::Mutex<Vec<Value>>>,
}

fn read_frame(stream: &mut TcpStream) -> Option<Value> {
    let mut prefix = [0u8; 4];
    stream.read_exact(&mut prefix).ok()?;
    let mut body = vec![0u8; u32::from_le_bytes(prefix) as usize];
    stream.read_exact(&mut body).ok()?;
    serde_json::from_slice(&body).ok()
}

fn write_frame(stream: &mut TcpStream, reply: &Value) {
    let body = serde_json::to_vec(reply).unwrap();
    stream
        .write_all(&(body.len() as u32).to_le_bytes())
        .unwrap();
    stream.write_all(&body).unwrap();
}

impl FakeBackend {
    fn start<F>(answer: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let requests = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let counter = Arc::clone(&requests);
        let log = Arc::clone(&received);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                while let Some(request) = read_frame(&mut stream) {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let reply = answer(&request);
                    log.lock().push(request);
                    write_frame(&mut stream, &reply);
                }
            }
        });

        Self {
            port,
            requests,
            received,
        }
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn query(terms: &[&str]) -> QueryRepr {
    vec![terms.iter().map(|&term| vec![TermTags::source(term)]).collect()]
}

#[test]
fn test_string_fields_and_zero_extra_round_trips() -> Result<()> {
    let backend = FakeBackend::start(|_| json!({"num_ret": "12", "exe_time": "0.5"}));
    let cache = QueryPerformanceCache::new("127.0.0.1", backend.port);
    let repr = query(&["bank"]);

    let first = cache.get_performance(&PerformanceRequest::new(&repr))?;
    assert_eq!(
        first,
        Performance::Unrestricted(QueryPerformanceSubset {
            num_ret: 12,
            exe_time: Some(0.5)
        })
    );

    let second = cache.get_performance(&PerformanceRequest::new(&repr))?;
    assert_eq!(first, second);
    assert_eq!(backend.requests(), 1);
    Ok(())
}

#[test]
fn test_backend_error_is_propagated() {
    let backend = FakeBackend::start(|_| json!({"error": "timeout"}));
    let cache = QueryPerformanceCache::new("127.0.0.1", backend.port);
    let repr = query(&["bank"]);

    let result = cache.get_performance(&PerformanceRequest::new(&repr));
    match result {
        Err(LexpandError::Backend(message)) => assert_eq!(message, "timeout"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(cache.is_empty());

    // No automatic retry: the next call is a new round trip.
    assert!(cache.get_performance(&PerformanceRequest::new(&repr)).is_err());
    assert_eq!(backend.requests(), 2);
}

#[test]
fn test_restricted_call_backfills_unrestricted_entry() -> Result<()> {
    let backend = FakeBackend::start(|request| {
        let relevant = request["rel"].as_array().map_or(0, Vec::len);
        json!({"num_ret": 30, "num_rel": relevant, "num_rel_ret": 1, "exe_time": 0.75})
    });
    let cache = QueryPerformanceCache::new("127.0.0.1", backend.port);
    let repr = query(&["interest rate", "cut"]);
    let relevant = [17, 4, 17, 9];

    let restricted =
        cache.get_performance(&PerformanceRequest::new(&repr).restricted_to(&relevant, 1))?;
    let restricted = restricted.as_restricted().copied().unwrap();
    assert_eq!(restricted.num_rel, 3);

    let signature = cache.signature(&repr);
    assert_eq!(
        backend.received.lock()[0],
        json!({"query": signature, "query_type": "cnf", "rel": [4, 9, 17]})
    );

    let backfilled = cache.get(&CacheKey::Unrestricted(signature.clone()));
    assert_eq!(
        backfilled,
        Some(Performance::Unrestricted(QueryPerformanceSubset {
            num_ret: 30,
            exe_time: Some(0.75)
        }))
    );

    let unrestricted = cache.get_performance(&PerformanceRequest::new(&repr))?;
    assert_eq!(unrestricted.num_ret(), 30);
    assert_eq!(backend.requests(), 1);
    Ok(())
}

#[test]
fn test_round_trips_never_exceed_distinct_keys() -> Result<()> {
    let backend = FakeBackend::start(|request| {
        if request.get("rel").is_some() {
            json!({"num_ret": 5, "num_rel": 2, "num_rel_ret": 1, "exe_time": 0.01})
        } else {
            json!({"num_ret": 5, "exe_time": 0.01})
        }
    });
    let cache = QueryPerformanceCache::new("127.0.0.1", backend.port);

    let queries = [query(&["bank"]), query(&["bank", "rate"]), query(&["boe"])];
    let relevant = [1, 2];
    let mut distinct_keys = std::collections::HashSet::new();

    for round in 0..3 {
        for (i, repr) in queries.iter().enumerate() {
            let mut request = PerformanceRequest::new(repr);
            if (i + round) % 2 == 0 {
                request = request.restricted_to(&relevant, 99);
                distinct_keys.insert((cache.signature(repr), Some(99)));
            } else {
                distinct_keys.insert((cache.signature(repr), None));
            }
            cache.get_performance(&request)?;
        }
    }

    assert!(backend.requests() <= distinct_keys.len());
    Ok(())
}

#[test]
fn test_snapshot_survives_reload() -> Result<()> {
    let backend = FakeBackend::start(|_| json!({"num_ret": 8, "exe_time": 0.2}));
    let cache = QueryPerformanceCache::new("127.0.0.1", backend.port);
    let repr = query(&["bank"]);
    cache.get_performance(&PerformanceRequest::new(&repr))?;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.bin");
    cache.save(&path)?;

    let restored = QueryPerformanceCache::load(&path)?;
    assert_eq!(restored.host(), "127.0.0.1");
    assert_eq!(restored.port(), backend.port);
    assert_eq!(restored.entries(), cache.entries());

    // Served from the restored table.
    restored.get_performance(&PerformanceRequest::new(&repr))?;
    assert_eq!(backend.requests(), 1);
    Ok(())
}

#[test]
fn test_connection_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let cache = QueryPerformanceCache::new("127.0.0.1", port);
    let repr = query(&["bank"]);

    let result = cache.get_performance(&PerformanceRequest::new(&repr));
    assert!(matches!(result, Err(LexpandError::Connection(_))));
    assert!(!cache.is_connected());
}

#[test]
fn test_shared_across_threads() -> Result<()> {
    let backend = FakeBackend::start(|_| json!({"num_ret": 1, "exe_time": 0.1}));
    let cache = Arc::new(QueryPerformanceCache::new("127.0.0.1", backend.port));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let repr = query(&["bank"]);
                cache.get_performance(&PerformanceRequest::new(&repr)).map(|p| p.num_ret())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap()?, 1);
    }
    assert_eq!(backend.requests(), 1);
    Ok(())
}
