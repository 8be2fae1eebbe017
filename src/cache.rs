//! Caching of backend query evaluations.
//!
//! The [`QueryPerformanceCache`] maps query signatures to the performance the
//! backend measured for them. Misses are resolved through a [`SocketChannel`]
//! speaking length-prefixed JSON; hits never touch the network. The table can
//! be saved to and restored from disk.
//!
//! Backend protocol, one request and one reply per evaluation:
//!
//! ```text
//! -> {"query": "((bank | banks))", "query_type": "cnf", "rel": [2, 5, 9]}
//! <- {"num_ret": 40, "num_rel": 3, "num_rel_ret": 2, "exe_time": 0.25}
//! <- {"error": "timeout"}
//! ```

pub mod channel;
pub mod performance;
mod snapshot;
mod store;

pub use channel::{SocketChannel, Transport};
pub use performance::{CacheKey, Performance, QueryPerformance, QueryPerformanceSubset};
pub use store::{PerformanceRequest, QueryPerformanceCache};
