//! Synthetic workloads for stress testing the settlement pipeline.

pub mod generator;
