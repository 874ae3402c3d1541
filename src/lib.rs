//! infragen: natural-language to Terraform.
//!
//! Asks a hosted model for a resource's parameters, validates them against
//! a typed catalog, renders a Terraform file, archives it to S3 and applies
//! it with the Terraform CLI.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod llm;
pub mod provenance;
pub mod provision;
pub mod storage;
pub mod transport;
