//! Change build orchestration.
//!
//! [`ChangeBuilder`] ties the collaborators together: it asks the host for
//! the page's revisions, renders both, diffs them, runs the alteration
//! pipeline, and caches the resulting artifact per permission variant. The
//! host CMS implements [`PageStore`] and [`RevisionRenderer`]; everything
//! behind those traits is out of scope here.

use std::sync::Arc;

use tracing::{debug, error};

use crate::alter::AlterPipeline;
use crate::cache::{CacheStore, CacheVariantKey, ChangeCache, SingleFlight};
use crate::config::ChangesConfig;
use crate::diff::markup::BASE_CLASS;
use crate::diff::{HtmlDiffer, StructuralDiffer};
use crate::error::{ErrorContext, Result};
use crate::model::{ChangeArtifact, RenderedRevision, Revision, WikiPageId};
use crate::variants::{Account, AccountId, AccountStore, PermissionHasher, Sha2PermissionHasher};

// ============================================================================
// Collaborator traits
// ============================================================================

/// Renders one revision to HTML, capturing cache metadata as it goes.
pub trait RevisionRenderer: Send + Sync {
    fn render(&self, revision: &Revision) -> Result<RenderedRevision>;
}

/// Host-side revision storage and access control.
pub trait PageStore: Send + Sync {
    /// The page's current revision, if the page exists.
    fn current_revision(&self, page: &WikiPageId) -> Result<Option<Revision>>;

    /// The revision immediately preceding the current one.
    fn previous_revision(&self, page: &WikiPageId) -> Result<Option<Revision>>;

    /// Whether the account may view the revision.
    fn can_view(&self, account: &AccountId, revision: &Revision) -> Result<bool>;
}

// ============================================================================
// Outcome
// ============================================================================

/// Result of a build attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// An artifact was produced (or found in cache).
    Built(ChangeArtifact),
    /// Nothing to build: first revision, or the viewer may not see one of
    /// the revisions. Not an error.
    Unbuildable,
    /// A collaborator failed; the error was logged and swallowed. The key's
    /// placeholder stays in place so readers see "being built".
    Failed,
}

// ============================================================================
// Builder
// ============================================================================

/// Orchestrates one change build per (page, permission variant).
pub struct ChangeBuilder {
    pages: Arc<dyn PageStore>,
    renderer: Arc<dyn RevisionRenderer>,
    accounts: Arc<dyn AccountStore>,
    hasher: Box<dyn PermissionHasher>,
    differ: Box<dyn HtmlDiffer>,
    pipeline: AlterPipeline,
    cache: ChangeCache,
    flight: SingleFlight,
    language: String,
    theme: String,
}

impl ChangeBuilder {
    pub fn new(
        pages: Arc<dyn PageStore>,
        renderer: Arc<dyn RevisionRenderer>,
        accounts: Arc<dyn AccountStore>,
        store: Arc<dyn CacheStore>,
        config: &ChangesConfig,
    ) -> Self {
        Self {
            pages,
            renderer,
            accounts,
            hasher: Box::new(Sha2PermissionHasher),
            differ: Box::new(
                StructuralDiffer::new().with_similarity_threshold(config.similarity_threshold),
            ),
            pipeline: AlterPipeline::standard(config),
            cache: ChangeCache::new(store),
            flight: SingleFlight::new(),
            language: "en".to_string(),
            theme: "default".to_string(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    #[must_use]
    pub fn with_differ(mut self, differ: Box<dyn HtmlDiffer>) -> Self {
        self.differ = differ;
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Box<dyn PermissionHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    /// The hasher variant keys are derived with. The warmer uses the same
    /// instance so warmed cache ids match the ids builds look up.
    pub fn hasher(&self) -> &dyn PermissionHasher {
        self.hasher.as_ref()
    }

    /// The cache key the given account's build would use.
    pub fn variant_key(&self, page: &WikiPageId, account: &Account) -> Result<CacheVariantKey> {
        let permissions = self
            .accounts
            .permissions_for_roles(&account.roles)
            .with_context(|| format!("resolving permissions of account {}", account.id))?;
        Ok(CacheVariantKey::new(
            page.clone(),
            &self.language,
            &self.theme,
            self.hasher.hash(&permissions),
        ))
    }

    /// Build (or fetch) the change artifact for a page as seen by an account.
    ///
    /// Collaborator errors never escape: they are logged with the page id
    /// and reported as [`BuildOutcome::Failed`].
    pub fn build(&self, page: &WikiPageId, account: &Account) -> BuildOutcome {
        match self.try_build(page, account) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(%page, account = %account.id, error = %err, "change build failed");
                BuildOutcome::Failed
            }
        }
    }

    fn try_build(&self, page: &WikiPageId, account: &Account) -> Result<BuildOutcome> {
        let key = self.variant_key(page, account)?;
        if let Some(artifact) = self.cache.get(&key) {
            debug!(%key, "serving cached change artifact");
            return Ok(BuildOutcome::Built(artifact));
        }

        let _guard = self.flight.begin(&key.cache_id());
        // A concurrent build may have finished while we waited for the slot.
        if let Some(artifact) = self.cache.get(&key) {
            return Ok(BuildOutcome::Built(artifact));
        }

        let Some(current) = self
            .pages
            .current_revision(page)
            .with_context(|| format!("loading current revision of page {page}"))?
        else {
            return Ok(BuildOutcome::Unbuildable);
        };
        let Some(previous) = self
            .pages
            .previous_revision(page)
            .with_context(|| format!("loading previous revision of page {page}"))?
        else {
            debug!(%page, "no previous revision; nothing to diff");
            return Ok(BuildOutcome::Unbuildable);
        };
        if !self.pages.can_view(&account.id, &previous)?
            || !self.pages.can_view(&account.id, &current)?
        {
            return Ok(BuildOutcome::Unbuildable);
        }

        self.cache.set_placeholder(&key);

        let old = self
            .renderer
            .render(&previous)
            .with_context(|| format!("rendering revision {}", previous.id))?;
        let new = self
            .renderer
            .render(&current)
            .with_context(|| format!("rendering revision {}", current.id))?;

        let mut tree = self.differ.diff(&old.html, &new.html);
        self.pipeline.run(&mut tree);

        let mut metadata = new.metadata;
        metadata.merge(&old.metadata);

        let html = format!("<div class=\"{BASE_CLASS}\">{}</div>", tree.to_html());
        let artifact = ChangeArtifact::new(html, metadata);
        self.cache.set(&key, &artifact);
        debug!(%key, "built and cached change artifact");
        Ok(BuildOutcome::Built(artifact))
    }

    /// Whether an artifact is already cached for this account's variant.
    pub fn is_cached(&self, page: &WikiPageId, account: &Account) -> Result<bool> {
        Ok(self.cache.is_cached(&self.variant_key(page, account)?))
    }

    /// Drop the cached artifact for this account's variant.
    pub fn invalidate(&self, page: &WikiPageId, account: &Account) -> Result<()> {
        self.cache.invalidate(&self.variant_key(page, account)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::error::{BuildErrorKind, WikiDiffError};
    use crate::model::{CacheMetadata, RevisionId};
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    struct EmptyStore;

    impl PageStore for EmptyStore {
        fn current_revision(&self, _page: &WikiPageId) -> Result<Option<Revision>> {
            Ok(None)
        }
        fn previous_revision(&self, _page: &WikiPageId) -> Result<Option<Revision>> {
            Ok(None)
        }
        fn can_view(&self, _account: &AccountId, _revision: &Revision) -> Result<bool> {
            Ok(true)
        }
    }

    struct FailingStore;

    impl PageStore for FailingStore {
        fn current_revision(&self, _page: &WikiPageId) -> Result<Option<Revision>> {
            Err(WikiDiffError::page_store("revision query failed"))
        }
        fn previous_revision(&self, _page: &WikiPageId) -> Result<Option<Revision>> {
            Err(WikiDiffError::page_store("revision query failed"))
        }
        fn can_view(&self, _account: &AccountId, _revision: &Revision) -> Result<bool> {
            Ok(true)
        }
    }

    struct StaticRenderer;

    impl RevisionRenderer for StaticRenderer {
        fn render(&self, revision: &Revision) -> Result<RenderedRevision> {
            Ok(RenderedRevision::new(
                format!("<p>{}</p>", revision.id),
                CacheMetadata::default(),
            ))
        }
    }

    struct OpenAccounts;

    impl AccountStore for OpenAccounts {
        fn accounts(&self) -> Result<Vec<Account>> {
            Ok(vec![Account::new("viewer", ["viewer"])])
        }
        fn permissions_for_roles(&self, roles: &BTreeSet<String>) -> Result<BTreeSet<String>> {
            Ok(roles.clone())
        }
    }

    fn builder(pages: Arc<dyn PageStore>) -> ChangeBuilder {
        ChangeBuilder::new(
            pages,
            Arc::new(StaticRenderer),
            Arc::new(OpenAccounts),
            Arc::new(MemoryCacheStore::new()),
            &ChangesConfig::default(),
        )
    }

    struct TwoRevisionStore;

    impl PageStore for TwoRevisionStore {
        fn current_revision(&self, page: &WikiPageId) -> Result<Option<Revision>> {
            Ok(Some(Revision {
                id: RevisionId::new("2"),
                page: page.clone(),
                date: NaiveDate::from_ymd_opt(2049, 10, 1).expect("valid date"),
            }))
        }
        fn previous_revision(&self, page: &WikiPageId) -> Result<Option<Revision>> {
            Ok(Some(Revision {
                id: RevisionId::new("1"),
                page: page.clone(),
                date: NaiveDate::from_ymd_opt(2049, 9, 30).expect("valid date"),
            }))
        }
        fn can_view(&self, _account: &AccountId, _revision: &Revision) -> Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_missing_page_is_unbuildable() {
        let builder = builder(Arc::new(EmptyStore));
        let outcome = builder.build(&WikiPageId::new("1"), &Account::new("viewer", ["viewer"]));
        assert_eq!(outcome, BuildOutcome::Unbuildable);
    }

    #[test]
    fn test_store_error_yields_failed() {
        let builder = builder(Arc::new(FailingStore));
        let outcome = builder.build(&WikiPageId::new("1"), &Account::new("viewer", ["viewer"]));
        assert_eq!(outcome, BuildOutcome::Failed);
    }

    #[test]
    fn test_built_artifact_has_stable_container() {
        let builder = builder(Arc::new(TwoRevisionStore));
        let outcome = builder.build(&WikiPageId::new("1"), &Account::new("viewer", ["viewer"]));
        let BuildOutcome::Built(artifact) = outcome else {
            panic!("expected Built, got {outcome:?}");
        };
        assert!(artifact.html.starts_with("<div class=\"wiki-changes\">"));
        assert!(artifact.html.ends_with("</div>"));
    }

    struct FailingAccounts;

    impl AccountStore for FailingAccounts {
        fn accounts(&self) -> Result<Vec<Account>> {
            Err(WikiDiffError::build(
                "listing accounts",
                BuildErrorKind::PageStore("role table unavailable".into()),
            ))
        }
        fn permissions_for_roles(&self, _roles: &BTreeSet<String>) -> Result<BTreeSet<String>> {
            Err(WikiDiffError::build(
                "expanding roles",
                BuildErrorKind::PageStore("role table unavailable".into()),
            ))
        }
    }

    #[test]
    fn test_variant_key_error_names_the_account() {
        let builder = ChangeBuilder::new(
            Arc::new(EmptyStore),
            Arc::new(StaticRenderer),
            Arc::new(FailingAccounts),
            Arc::new(MemoryCacheStore::new()),
            &ChangesConfig::default(),
        );
        let err = builder
            .variant_key(&WikiPageId::new("1"), &Account::new("viewer", ["viewer"]))
            .expect_err("account store fails");
        let WikiDiffError::Build { context, .. } = err else {
            panic!("expected Build error");
        };
        assert!(
            context.contains("resolving permissions of account viewer"),
            "missing caller context: {context}"
        );
        assert!(
            context.contains("expanding roles"),
            "missing collaborator context: {context}"
        );
    }

    #[test]
    fn test_variant_key_varies_by_language() {
        let account = Account::new("viewer", ["viewer"]);
        let page = WikiPageId::new("1");
        let en = builder(Arc::new(EmptyStore));
        let de = builder(Arc::new(EmptyStore)).with_language("de");
        let en_key = en.variant_key(&page, &account).expect("key");
        let de_key = de.variant_key(&page, &account).expect("key");
        assert_ne!(en_key.cache_id(), de_key.cache_id());
    }
}
