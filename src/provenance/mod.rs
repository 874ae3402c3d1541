//! Provenance: append-only run log and BLAKE3 artifact hashing.

pub mod eventlog;
pub mod hasher;
