//! Real-world scenario benchmarks.

mod chain;

pub use chain::bench_chain;
