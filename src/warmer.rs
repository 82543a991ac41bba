//! Cache warming.
//!
//! Pre-builds change artifacts for every (page, permission variant) pair so
//! the first real visitor gets a cache hit. Warming runs in stable batches
//! and is resumable from a cursor, so a host cron job can chip away at a
//! large site across invocations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::build::{BuildOutcome, ChangeBuilder, PageStore};
use crate::cache::CacheVariantKey;
use crate::error::{ErrorContext, Result};
use crate::model::WikiPageId;
use crate::variants::{Account, AccountId, AccountStore, PermissionVariant, VariantInfo};

/// Impersonation hook into the host's session handling.
///
/// `switch_back` must always restore the original principal, including after
/// a failed build.
pub trait AccountSwitcher: Send + Sync {
    fn switch_to(&self, account: &AccountId) -> Result<()>;
    fn switch_back(&self) -> Result<()>;
}

/// Outcome of one warming batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmReport {
    /// Items attempted in this batch.
    pub processed: usize,
    /// Artifacts built or already cached.
    pub built: usize,
    /// Items skipped: nothing to diff, or no account can view both revisions.
    pub skipped: usize,
    /// Items whose build or impersonation failed; logged and passed over.
    pub failed: usize,
    /// Cache id of the last item processed; feed back in to resume. `None`
    /// when the batch reached the end of the work list.
    pub cursor: Option<String>,
}

/// Batch driver that builds artifacts for every permission variant.
///
/// Variant hashes come from the builder's own [`PermissionHasher`], so every
/// id on the work list is an id some build actually reads.
pub struct CacheWarmer {
    builder: Arc<ChangeBuilder>,
    pages: Arc<dyn PageStore>,
    accounts: Arc<dyn AccountStore>,
    switcher: Arc<dyn AccountSwitcher>,
    batch_size: usize,
}

impl CacheWarmer {
    pub fn new(
        builder: Arc<ChangeBuilder>,
        pages: Arc<dyn PageStore>,
        accounts: Arc<dyn AccountStore>,
        switcher: Arc<dyn AccountSwitcher>,
    ) -> Self {
        Self {
            builder,
            pages,
            accounts,
            switcher,
            batch_size: 50,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Warm one batch of (page, variant) pairs, resuming after `cursor`.
    ///
    /// The work list is ordered by page then variant, so a cursor taken from
    /// one invocation remains valid in the next as long as the page list and
    /// account roles have not changed underneath it. An unrecognized cursor
    /// restarts from the beginning.
    pub fn warm_batch(
        &self,
        page_ids: &[WikiPageId],
        cursor: Option<&str>,
    ) -> Result<WarmReport> {
        let variants = VariantInfo::all_variants(self.accounts.as_ref(), self.builder.hasher())
            .context("enumerating permission variants")?;
        let accounts_by_id: HashMap<AccountId, Account> = self
            .accounts
            .accounts()
            .context("listing warm accounts")?
            .into_iter()
            .map(|account| (account.id.clone(), account))
            .collect();

        let work: Vec<(&WikiPageId, &PermissionVariant, String)> = page_ids
            .iter()
            .flat_map(|page| {
                variants.iter().map(move |variant| {
                    let id = CacheVariantKey::new(
                        page.clone(),
                        self.builder.language(),
                        self.builder.theme(),
                        variant.permissions_hash.clone(),
                    )
                    .cache_id();
                    (page, variant, id)
                })
            })
            .collect();

        let start = match cursor {
            None => 0,
            Some(cursor) => match work.iter().position(|(_, _, id)| id == cursor) {
                Some(index) => index + 1,
                None => {
                    warn!(cursor, "warm cursor not found; restarting from the top");
                    0
                }
            },
        };

        let batch = &work[start.min(work.len())..(start + self.batch_size).min(work.len())];
        let mut report = WarmReport {
            processed: 0,
            built: 0,
            skipped: 0,
            failed: 0,
            cursor: None,
        };

        for (page, variant, cache_id) in batch {
            report.processed += 1;
            report.cursor = Some(cache_id.clone());

            match self.warm_one(page, variant, &accounts_by_id) {
                Ok(ItemOutcome::Built) => report.built += 1,
                Ok(ItemOutcome::Skipped) => report.skipped += 1,
                Ok(ItemOutcome::Failed) => report.failed += 1,
                Err(err) => {
                    warn!(%page, variant = %variant.permissions_hash, error = %err,
                        "warm item failed; skipping");
                    report.failed += 1;
                }
            }
        }

        if start + batch.len() >= work.len() {
            report.cursor = None;
        }
        info!(
            processed = report.processed,
            built = report.built,
            skipped = report.skipped,
            failed = report.failed,
            "cache warm batch finished"
        );
        Ok(report)
    }

    fn warm_one(
        &self,
        page: &WikiPageId,
        variant: &PermissionVariant,
        accounts_by_id: &HashMap<AccountId, Account>,
    ) -> Result<ItemOutcome> {
        let Some(account) = self.representative_account(page, variant, accounts_by_id)? else {
            debug!(%page, variant = %variant.permissions_hash,
                "no account in variant can view both revisions; skipping");
            return Ok(ItemOutcome::Skipped);
        };

        self.switcher
            .switch_to(&account.id)
            .with_context(|| format!("impersonating account {}", account.id))?;
        let outcome = self.builder.build(page, &account);
        // Restore the principal even when the build failed.
        let restored = self.switcher.switch_back();
        restored.context("restoring the original account")?;

        Ok(match outcome {
            BuildOutcome::Built(_) => ItemOutcome::Built,
            BuildOutcome::Unbuildable => ItemOutcome::Skipped,
            BuildOutcome::Failed => ItemOutcome::Failed,
        })
    }

    /// First account in the variant that may view both revisions involved.
    fn representative_account<'a>(
        &self,
        page: &WikiPageId,
        variant: &PermissionVariant,
        accounts_by_id: &'a HashMap<AccountId, Account>,
    ) -> Result<Option<&'a Account>> {
        let Some(current) = self.pages.current_revision(page)? else {
            return Ok(None);
        };
        let Some(previous) = self.pages.previous_revision(page)? else {
            return Ok(None);
        };

        for id in &variant.accounts {
            let Some(account) = accounts_by_id.get(id) else {
                continue;
            };
            if self.pages.can_view(id, &previous)? && self.pages.can_view(id, &current)? {
                return Ok(Some(account));
            }
        }
        Ok(None)
    }
}

enum ItemOutcome {
    Built,
    Skipped,
    Failed,
}
