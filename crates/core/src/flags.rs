//! Feature-flag registry and resolution.
//!
//! A flag resolves through a fixed precedence chain:
//!
//! 1. runtime override (persisted as a delta-only JSON file)
//! 2. environment variable (`AIRPROMPTS_FLAG_<NAME>`)
//! 3. user-context rule: beta list membership, then percentage rollout
//!    (rolling-hash bucketing)
//! 4. static default
//!
//! Remote configuration held a slot in this chain in the original design
//! but no remote service exists in this deployment model, so the chain
//! skips straight from environment to rollout.
//!
//! Overrides persist only the delta from defaults: setting a flag back to
//! its default removes it from the file, and clearing all overrides deletes
//! the file entirely.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Environment variable prefix for flag seeding (`AIRPROMPTS_FLAG_<NAME>`).
pub const FLAG_ENV_PREFIX: &str = "AIRPROMPTS_FLAG_";

/// Static definition of a feature flag.
#[derive(Debug, Clone, Serialize, TS)]
pub struct FlagDef {
    pub name: &'static str,
    pub default: bool,
    /// User ids the flag is always on for, checked before the rollout
    /// bucket.
    #[ts(type = "Array<string>")]
    pub beta_users: &'static [&'static str],
    /// Percentage of users (0–100) the flag is enabled for when neither an
    /// override nor an environment variable nor the beta list decides it.
    pub rollout_percent: Option<u8>,
    pub description: &'static str,
}

/// All known flags. The registry is data: handlers and services look flags
/// up by name and never branch on identity.
pub const BUILTIN_FLAGS: &[FlagDef] = &[
    FlagDef {
        name: "USE_VIRTUALIZED_LISTS",
        default: false,
        beta_users: &["qa-dashboard"],
        rollout_percent: Some(10),
        description: "Render dashboard lists with virtualization",
    },
    FlagDef {
        name: "WORKFLOW_CONTINUE_ON_ERROR",
        default: false,
        beta_users: &[],
        rollout_percent: None,
        description: "Default workflow runs to continue past failed steps",
    },
    FlagDef {
        name: "ENABLE_FOLDER_FAVORITES",
        default: true,
        beta_users: &[],
        rollout_percent: None,
        description: "Per-folder favorite marking and ordering",
    },
    FlagDef {
        name: "ENABLE_LEGACY_IMPORT",
        default: true,
        beta_users: &[],
        rollout_percent: None,
        description: "Accept localStorage-dump migration uploads",
    },
    FlagDef {
        name: "SHOW_DEV_PANEL",
        default: false,
        beta_users: &["dev"],
        rollout_percent: None,
        description: "Expose the developer diagnostics panel",
    },
];

/// Look up a flag definition by name.
pub fn find_flag(name: &str) -> Option<&'static FlagDef> {
    BUILTIN_FLAGS.iter().find(|f| f.name == name)
}

// ---------------------------------------------------------------------------
// Rollout bucketing
// ---------------------------------------------------------------------------

/// Map a user id to a percentile bucket in `0..100`.
///
/// Polynomial rolling hash with 32-bit wraparound. Deterministic and
/// non-cryptographic; clustering is acceptable for gradual rollouts.
pub fn rollout_bucket(user_id: &str) -> u32 {
    let mut h: u32 = 0;
    for b in user_id.bytes() {
        h = h.wrapping_mul(31).wrapping_add(u32::from(b));
    }
    h % 100
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Which precedence level decided a flag's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum FlagSource {
    Override,
    Environment,
    Beta,
    Rollout,
    Default,
}

/// A resolved flag value plus the precedence level that produced it.
#[derive(Debug, Clone, Serialize, TS)]
pub struct FlagEvaluation {
    pub name: String,
    pub enabled: bool,
    pub source: FlagSource,
}

/// Runtime flag service: holds overrides in memory and mirrors the delta
/// to a JSON file so overrides survive restarts.
pub struct FlagService {
    overrides: RwLock<HashMap<String, bool>>,
    overrides_path: Option<PathBuf>,
}

impl FlagService {
    /// Create a service, loading any persisted overrides from `path`.
    ///
    /// A missing file means no overrides; an unreadable or malformed file
    /// is logged and ignored rather than failing startup.
    pub fn new(path: Option<PathBuf>) -> Self {
        let overrides = match &path {
            Some(p) if p.exists() => match std::fs::read_to_string(p)
                .map_err(|e| e.to_string())
                .and_then(|s| serde_json::from_str(&s).map_err(|e| e.to_string()))
            {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "Ignoring unreadable flag override file");
                    HashMap::new()
                }
            },
            _ => HashMap::new(),
        };
        Self {
            overrides: RwLock::new(overrides),
            overrides_path: path,
        }
    }

    /// Resolve a flag for an optional user context. `None` for unknown flags.
    pub fn evaluate(&self, name: &str, user_id: Option<&str>) -> Option<FlagEvaluation> {
        let def = find_flag(name)?;

        if let Some(&enabled) = self.overrides.read().ok()?.get(name) {
            return Some(FlagEvaluation {
                name: name.to_string(),
                enabled,
                source: FlagSource::Override,
            });
        }

        if let Ok(raw) = std::env::var(format!("{FLAG_ENV_PREFIX}{name}")) {
            if let Some(enabled) = parse_bool(&raw) {
                return Some(FlagEvaluation {
                    name: name.to_string(),
                    enabled,
                    source: FlagSource::Environment,
                });
            }
            tracing::warn!(flag = name, value = %raw, "Unparseable flag environment variable, ignoring");
        }

        if let Some(user) = user_id {
            if def.beta_users.contains(&user) {
                return Some(FlagEvaluation {
                    name: name.to_string(),
                    enabled: true,
                    source: FlagSource::Beta,
                });
            }
        }

        if let (Some(percent), Some(user)) = (def.rollout_percent, user_id) {
            return Some(FlagEvaluation {
                name: name.to_string(),
                enabled: rollout_bucket(user) < u32::from(percent),
                source: FlagSource::Rollout,
            });
        }

        Some(FlagEvaluation {
            name: name.to_string(),
            enabled: def.default,
            source: FlagSource::Default,
        })
    }

    /// Resolve every registered flag for an optional user context.
    pub fn evaluate_all(&self, user_id: Option<&str>) -> Vec<FlagEvaluation> {
        BUILTIN_FLAGS
            .iter()
            .filter_map(|def| self.evaluate(def.name, user_id))
            .collect()
    }

    /// Set a runtime override. Setting a flag to its default removes the
    /// stored entry (delta-only persistence).
    pub fn set_override(&self, name: &str, enabled: bool) -> Result<FlagEvaluation, CoreError> {
        let def = find_flag(name)
            .ok_or_else(|| CoreError::Validation(format!("Unknown feature flag '{name}'")))?;

        {
            let mut overrides = self
                .overrides
                .write()
                .map_err(|_| CoreError::Internal("flag override lock poisoned".into()))?;
            if enabled == def.default {
                overrides.remove(name);
            } else {
                overrides.insert(name.to_string(), enabled);
            }
            self.persist(&overrides)?;
        }

        Ok(FlagEvaluation {
            name: name.to_string(),
            enabled,
            source: FlagSource::Override,
        })
    }

    /// Drop all overrides and delete the persisted file.
    pub fn clear_overrides(&self) -> Result<(), CoreError> {
        let mut overrides = self
            .overrides
            .write()
            .map_err(|_| CoreError::Internal("flag override lock poisoned".into()))?;
        overrides.clear();
        if let Some(p) = &self.overrides_path {
            if p.exists() {
                std::fs::remove_file(p)
                    .map_err(|e| CoreError::Internal(format!("removing {}: {e}", p.display())))?;
            }
        }
        Ok(())
    }

    fn persist(&self, overrides: &HashMap<String, bool>) -> Result<(), CoreError> {
        let Some(p) = &self.overrides_path else {
            return Ok(());
        };
        if overrides.is_empty() {
            if p.exists() {
                std::fs::remove_file(p)
                    .map_err(|e| CoreError::Internal(format!("removing {}: {e}", p.display())))?;
            }
            return Ok(());
        }
        let body = serde_json::to_string_pretty(overrides)
            .map_err(|e| CoreError::Internal(format!("serializing flag overrides: {e}")))?;
        std::fs::write(p, body)
            .map_err(|e| CoreError::Internal(format!("writing {}: {e}", p.display())))?;
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/* --------------------------------------------------------------------------
   Tests
   -------------------------------------------------------------------------- */
