//! Email → role resolution.
//!
//! Resolution algorithm:
//!
//! 1. Fetch one snapshot of the table from the `TableSource` (single
//!    attempt, no retry).
//! 2. Parse it with the configured delimiter.
//! 3. Return the role of the first row whose email matches, ignoring case.
//! 4. On any failure or no match → `Role::Author`.
//!
//! Nothing is cached here; every call fetches. Wrap the client in
//! [`SessionCache`] when a session needs a stable answer.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use panelgate_contracts::{error::GateResult, role::Role};
use panelgate_core::traits::RoleDirectory;

use crate::source::{DirectoryConfig, HttpTableSource, TableSource};
use crate::table::{find_role, parse_table};

/// Resolves roles from a directory table.
#[derive(Debug, Clone)]
pub struct DirectoryClient<S> {
    source: S,
    delimiter: char,
}

impl<S: TableSource> DirectoryClient<S> {
    pub fn new(source: S, delimiter: char) -> Self {
        Self { source, delimiter }
    }

    /// The non-degraded resolution path: `Ok(None)` when no row matches,
    /// `Err` when the table cannot be fetched or parsed.
    pub async fn lookup(&self, email: &str) -> GateResult<Option<Role>> {
        let text = self.source.fetch().await?;
        let rows = parse_table(&text, self.delimiter)?;
        debug!(rows = rows.len(), "directory table parsed");
        Ok(find_role(&rows, email))
    }
}

impl DirectoryClient<HttpTableSource> {
    /// An HTTP-backed client built from `config`.
    pub fn from_config(config: &DirectoryConfig) -> GateResult<Self> {
        Ok(Self::new(HttpTableSource::from_config(config)?, config.delimiter))
    }
}

#[async_trait]
impl<S: TableSource> RoleDirectory for DirectoryClient<S> {
    async fn resolve_role(&self, email: &str) -> Role {
        match self.lookup(email).await {
            Ok(Some(role)) => {
                info!(role = %role, "role resolved from directory");
                role
            }
            Ok(None) => {
                debug!("email not found in directory; defaulting to author");
                Role::Author
            }
            Err(e) => {
                warn!(error = %e, "role resolution failed; defaulting to author");
                Role::Author
            }
        }
    }
}

/// Remembers the first resolution per email for the lifetime of the value.
///
/// Emails are compared case-insensitively, matching the directory.
pub struct SessionCache<D> {
    inner: D,
    resolved: Mutex<HashMap<String, Role>>,
}

impl<D: RoleDirectory> SessionCache<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// The cached role for `email`, if one was resolved.
    pub async fn cached(&self, email: &str) -> Option<Role> {
        self.resolved.lock().await.get(&email.trim().to_lowercase()).copied()
    }
}

#[async_trait]
impl<D: RoleDirectory> RoleDirectory for SessionCache<D> {
    async fn resolve_role(&self, email: &str) -> Role {
        let key = email.trim().to_lowercase();
        // Held across the fetch so concurrent callers share one resolution.
        let mut resolved = self.resolved.lock().await;
        if let Some(role) = resolved.get(&key) {
            return *role;
        }
        let role = self.inner.resolve_role(email).await;
        resolved.insert(key, role);
        role
    }
}
