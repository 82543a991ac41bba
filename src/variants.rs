//! Permission variant enumeration.
//!
//! Change output varies by what the viewer is allowed to see, so artifacts
//! are cached per effective-permission-set rather than per account. This
//! module hashes permission sets and collapses the site's accounts into the
//! distinct variants a warmer needs to cover.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Stable identifier of a host account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// An account and the roles granted to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub roles: BTreeSet<String>,
}

impl Account {
    pub fn new<I, S>(id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: AccountId::new(id),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Hashing
// ============================================================================

/// Hashes an effective permission set to a cache-key component.
pub trait PermissionHasher: Send + Sync {
    fn hash(&self, permissions: &BTreeSet<String>) -> String;
}

/// Default hasher: hex SHA-256 over the sorted permission names.
///
/// `BTreeSet` iteration is already sorted, so two role sets granting the
/// same permissions hash identically regardless of role naming.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha2PermissionHasher;

impl PermissionHasher for Sha2PermissionHasher {
    fn hash(&self, permissions: &BTreeSet<String>) -> String {
        let mut hasher = Sha256::new();
        for permission in permissions {
            hasher.update(permission.as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }
}

// ============================================================================
// Account enumeration
// ============================================================================

/// Host-side directory of accounts and the role-to-permission mapping.
pub trait AccountStore: Send + Sync {
    /// All accounts eligible for warming, in any order.
    fn accounts(&self) -> Result<Vec<Account>>;

    /// Effective permissions granted by a set of roles.
    fn permissions_for_roles(&self, roles: &BTreeSet<String>) -> Result<BTreeSet<String>>;
}

/// One distinct permission variant and the accounts that fall into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionVariant {
    pub permissions_hash: String,
    pub permissions: BTreeSet<String>,
    /// Accounts sharing this variant, sorted by id.
    pub accounts: Vec<AccountId>,
}

/// Variant enumeration entry point.
pub struct VariantInfo;

impl VariantInfo {
    /// Collapse the store's accounts into distinct permission variants.
    ///
    /// Role sets with identical effective permissions share one variant.
    /// Output order is deterministic: variants appear in the order of their
    /// first account after sorting accounts by id.
    pub fn all_variants(
        store: &dyn AccountStore,
        hasher: &dyn PermissionHasher,
    ) -> Result<Vec<PermissionVariant>> {
        let mut accounts = store.accounts()?;
        accounts.sort_by(|a, b| a.id.cmp(&b.id));

        let mut variants: IndexMap<String, PermissionVariant> = IndexMap::new();
        for account in accounts {
            let permissions = store.permissions_for_roles(&account.roles)?;
            let hash = hasher.hash(&permissions);
            variants
                .entry(hash.clone())
                .or_insert_with(|| PermissionVariant {
                    permissions_hash: hash,
                    permissions,
                    accounts: Vec::new(),
                })
                .accounts
                .push(account.id);
        }
        Ok(variants.into_values().collect())
    }
}
