#![deny(clippy::all)]
#![warn(clippy::pedantic)]

//! Benchmark harness for localdeps.
//!
//! Run benchmarks with: `cargo bench -p localdeps-bench`
//!
//! Holds criterion benchmarks for repository fingerprinting, crawling and
//! dependency resolution.
