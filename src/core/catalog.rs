//! IG-002: Resource catalog. Built-in kinds, YAML loading and validation.
//!
//! A catalog file replaces the built-in kinds entirely:
//!
//! ```yaml
//! kinds:
//!   s3:
//!     template: s3.tf.tmpl
//!     required: [region, name]
//!   rds:
//!     template: rds.tf.tmpl
//!     required:
//!       - region
//!       - { name: allocated_storage, type: integer }
//! ```
//!
//! Structural checks on load:
//! - At least one kind
//! - Kind names lowercase, no whitespace
//! - Non-empty template reference
//! - No duplicate required keys within a kind

use super::types::{ParamSpec, ResourceKind};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Parse(String),

    #[error("{} catalog error(s): {}", .0.len(), join_issues(.0))]
    Invalid(Vec<CatalogIssue>),
}

fn join_issues(issues: &[CatalogIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single structural problem in a catalog.
#[derive(Debug, Clone)]
pub struct CatalogIssue {
    pub message: String,
}

impl fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    kinds: IndexMap<String, KindEntry>,
}

#[derive(Debug, Deserialize)]
struct KindEntry {
    template: String,
    #[serde(default)]
    required: Vec<ParamSpec>,
}

/// The set of resource kinds available to a run. Order is preserved.
#[derive(Debug, Clone)]
pub struct Catalog {
    kinds: IndexMap<String, ResourceKind>,
}

impl Catalog {
    /// The four kinds shipped with the tool.
    pub fn builtin() -> Self {
        let defs: [(&str, &str, &[&str]); 4] = [
            ("ec2", "ec2.tf.tmpl", &["region", "name", "ami", "instance_type"]),
            ("vpc", "vpc.tf.tmpl", &["region", "name", "cidr_block"]),
            ("s3", "s3.tf.tmpl", &["region", "name"]),
            (
                "lambda",
                "lambda.tf.tmpl",
                &["region", "name", "runtime", "handler", "filename", "role_arn"],
            ),
        ];
        let kinds = defs
            .iter()
            .map(|(name, template, keys)| {
                (
                    name.to_string(),
                    ResourceKind {
                        name: name.to_string(),
                        template: template.to_string(),
                        required: keys.iter().map(|k| ParamSpec::string(k)).collect(),
                    },
                )
            })
            .collect();
        Self { kinds }
    }

    /// Load and validate a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate a catalog from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            serde_yaml_ng::from_str(yaml).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let kinds = file
            .kinds
            .into_iter()
            .map(|(name, entry)| {
                let kind = ResourceKind {
                    name: name.clone(),
                    template: entry.template,
                    required: entry.required,
                };
                (name, kind)
            })
            .collect();
        let catalog = Self { kinds };
        let issues = validate_catalog(&catalog);
        if issues.is_empty() {
            Ok(catalog)
        } else {
            Err(CatalogError::Invalid(issues))
        }
    }

    /// Built-in catalog, or the file at `path` when given.
    pub fn resolve(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::builtin()),
        }
    }

    /// Look up a kind by exact name.
    pub fn get(&self, name: &str) -> Option<&ResourceKind> {
        self.kinds.get(name)
    }

    /// Kind names in catalog order.
    pub fn names(&self) -> Vec<&str> {
        self.kinds.keys().map(String::as_str).collect()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ResourceKind> {
        self.kinds.values()
    }

    /// First kind (catalog order) whose name appears in the lowercased prompt.
    pub fn infer_kind(&self, prompt: &str) -> Option<&ResourceKind> {
        let lowered = prompt.to_lowercase();
        self.kinds.values().find(|k| lowered.contains(&k.name))
    }
}

/// Validate a catalog. Returns a list of issues (empty = valid).
pub fn validate_catalog(catalog: &Catalog) -> Vec<CatalogIssue> {
    let mut issues = Vec::new();

    if catalog.kinds.is_empty() {
        issues.push(CatalogIssue {
            message: "catalog defines no kinds".to_string(),
        });
    }

    for (name, kind) in &catalog.kinds {
        if name.is_empty()
            || name.chars().any(char::is_whitespace)
            || name.to_lowercase() != *name
        {
            issues.push(CatalogIssue {
                message: format!("kind name '{}' must be lowercase without whitespace", name),
            });
        }

        if kind.template.trim().is_empty() {
            issues.push(CatalogIssue {
                message: format!("kind '{}' has no template", name),
            });
        }

        let mut seen = HashSet::new();
        for spec in &kind.required {
            if spec.name.trim().is_empty() {
                issues.push(CatalogIssue {
                    message: format!("kind '{}' has an empty required key", name),
                });
            } else if !seen.insert(spec.name.as_str()) {
                issues.push(CatalogIssue {
                    message: format!("kind '{}' lists required key '{}' twice", name, spec.name),
                });
            }
        }
    }

    issues
}
