//! One inference operation per convention.
//!
//! [`StyleInference`] is long-lived: it owns one walker pool per
//! classifier so scratch buffers are reused across calls, and it can be
//! shared between tasks behind an `Arc`.
//!
//! Every operation first asks the configured [`StyleOptions`]. A value
//! someone stated explicitly is returned as-is and no artifact is read.
//! Otherwise the prioritized search runs.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};
use tugstyle_core::walker::DEFAULT_POOL_CAPACITY;
use tugstyle_core::{
    search, ArtifactGroup, Classifier, ExclusionRules, Inference, NoOptions, OptionValue, Outcome,
    SourceArtifact, StyleError, StyleOptions, Verdict, WalkerPool,
};
use tugstyle_csharp::conventions::parse_bool;
use tugstyle_csharp::{
    BackingFieldAdjacency, Convention, QualifyMemberAccess, UnderscoreFields, UsingPlacement,
    BACKING_FIELD_BLANK_LINE_KEY,
};

/// Infers C# conventions for artifacts of a group.
pub struct StyleInference {
    underscore_fields: WalkerPool<UnderscoreFields>,
    field_access: WalkerPool<QualifyMemberAccess>,
    property_access: WalkerPool<QualifyMemberAccess>,
    method_access: WalkerPool<QualifyMemberAccess>,
    event_access: WalkerPool<QualifyMemberAccess>,
    backing_fields: WalkerPool<BackingFieldAdjacency>,
    using_placement: WalkerPool<UsingPlacement>,
    options: Arc<dyn StyleOptions>,
    rules: ExclusionRules,
}

impl StyleInference {
    /// Create an engine that consults `options` first.
    pub fn new(options: Arc<dyn StyleOptions>) -> Self {
        Self::with_capacity(options, ExclusionRules::default(), DEFAULT_POOL_CAPACITY)
    }

    /// Create an engine with custom exclusion rules and pool capacity.
    pub fn with_capacity(
        options: Arc<dyn StyleOptions>,
        rules: ExclusionRules,
        capacity: usize,
    ) -> Self {
        StyleInference {
            underscore_fields: WalkerPool::with_capacity(UnderscoreFields, capacity),
            field_access: WalkerPool::with_capacity(QualifyMemberAccess::fields(), capacity),
            property_access: WalkerPool::with_capacity(QualifyMemberAccess::properties(), capacity),
            method_access: WalkerPool::with_capacity(QualifyMemberAccess::methods(), capacity),
            event_access: WalkerPool::with_capacity(QualifyMemberAccess::events(), capacity),
            backing_fields: WalkerPool::with_capacity(BackingFieldAdjacency, capacity),
            using_placement: WalkerPool::with_capacity(UsingPlacement, capacity),
            options,
            rules,
        }
    }

    /// The exclusion rules applied to candidates.
    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    /// Are private instance fields prefixed with `_`?
    pub async fn underscore_fields(
        &self,
        current: &Arc<SourceArtifact>,
        group: &ArtifactGroup,
        cancel: &CancellationToken,
    ) -> Result<Inference, StyleError> {
        self.run_unit(
            Convention::UnderscoreFields,
            &self.underscore_fields,
            current,
            group,
            cancel,
        )
        .await
    }

    /// Is instance field access qualified with `this.`?
    pub async fn qualify_field_access(
        &self,
        current: &Arc<SourceArtifact>,
        group: &ArtifactGroup,
        cancel: &CancellationToken,
    ) -> Result<Inference, StyleError> {
        self.run_unit(Convention::QualifyFieldAccess, &self.field_access, current, group, cancel)
            .await
    }

    /// Is instance property access qualified with `this.`?
    pub async fn qualify_property_access(
        &self,
        current: &Arc<SourceArtifact>,
        group: &ArtifactGroup,
        cancel: &CancellationToken,
    ) -> Result<Inference, StyleError> {
        self.run_unit(
            Convention::QualifyPropertyAccess,
            &self.property_access,
            current,
            group,
            cancel,
        )
        .await
    }

    /// Are instance method calls qualified with `this.`?
    pub async fn qualify_method_access(
        &self,
        current: &Arc<SourceArtifact>,
        group: &ArtifactGroup,
        cancel: &CancellationToken,
    ) -> Result<Inference, StyleError> {
        self.run_unit(Convention::QualifyMethodAccess, &self.method_access, current, group, cancel)
            .await
    }

    /// Is instance event access qualified with `this.`?
    pub async fn qualify_event_access(
        &self,
        current: &Arc<SourceArtifact>,
        group: &ArtifactGroup,
        cancel: &CancellationToken,
    ) -> Result<Inference, StyleError> {
        self.run_unit(Convention::QualifyEventAccess, &self.event_access, current, group, cancel)
            .await
    }

    /// Is a property's backing field declared right before it?
    ///
    /// On `Yes` the detail tells whether a blank line separates the two.
    /// When the convention is configured, the blank-line preference comes
    /// from its own key and defaults to `false`.
    pub async fn backing_field_adjacency(
        &self,
        current: &Arc<SourceArtifact>,
        group: &ArtifactGroup,
        cancel: &CancellationToken,
    ) -> Result<Inference<bool>, StyleError> {
        validate(current)?;
        let convention = Convention::BackingFieldAdjacency;
        if let Some((verdict, value)) = self.configured(convention, current)? {
            let blank_line = self
                .options
                .get(current.path(), BACKING_FIELD_BLANK_LINE_KEY)?
                .and_then(|blank| parse_bool(&blank.raw))
                .unwrap_or(false);
            let outcome = configured_outcome(verdict, blank_line);
            return Ok(Inference::configured(
                outcome,
                convention.option_key(),
                value.source.to_string(),
            ));
        }
        self.scan(convention, &self.backing_fields, current, group, cancel)
            .await
    }

    /// Are using directives placed inside the namespace?
    pub async fn using_placement(
        &self,
        current: &Arc<SourceArtifact>,
        group: &ArtifactGroup,
        cancel: &CancellationToken,
    ) -> Result<Inference, StyleError> {
        self.run_unit(Convention::UsingPlacement, &self.using_placement, current, group, cancel)
            .await
    }

    /// Infer any convention by name.
    ///
    /// The detail is the blank-line flag for backing-field adjacency and
    /// `None` for every other convention.
    pub async fn infer(
        &self,
        convention: Convention,
        current: &Arc<SourceArtifact>,
        group: &ArtifactGroup,
        cancel: &CancellationToken,
    ) -> Result<Inference<Option<bool>>, StyleError> {
        let span = info_span!("infer", convention = convention.name(), path = current.path());
        async {
            let unit = match convention {
                Convention::UnderscoreFields => self.underscore_fields(current, group, cancel).await,
                Convention::QualifyFieldAccess => {
                    self.qualify_field_access(current, group, cancel).await
                }
                Convention::QualifyPropertyAccess => {
                    self.qualify_property_access(current, group, cancel).await
                }
                Convention::QualifyMethodAccess => {
                    self.qualify_method_access(current, group, cancel).await
                }
                Convention::QualifyEventAccess => {
                    self.qualify_event_access(current, group, cancel).await
                }
                Convention::UsingPlacement => self.using_placement(current, group, cancel).await,
                Convention::BackingFieldAdjacency => {
                    let inference = self.backing_field_adjacency(current, group, cancel).await?;
                    return Ok(inference.map(Some));
                }
            };
            unit.map(|inference| inference.map(|()| None))
        }
        .instrument(span)
        .await
    }

    async fn run_unit<C>(
        &self,
        convention: Convention,
        pool: &WalkerPool<C>,
        current: &Arc<SourceArtifact>,
        group: &ArtifactGroup,
        cancel: &CancellationToken,
    ) -> Result<Inference, StyleError>
    where
        C: Classifier<Detail = ()>,
    {
        validate(current)?;
        if let Some((verdict, value)) = self.configured(convention, current)? {
            return Ok(Inference::configured(
                configured_outcome(verdict, ()),
                convention.option_key(),
                value.source.to_string(),
            ));
        }
        self.scan(convention, pool, current, group, cancel).await
    }

    async fn scan<C: Classifier>(
        &self,
        convention: Convention,
        pool: &WalkerPool<C>,
        current: &Arc<SourceArtifact>,
        group: &ArtifactGroup,
        cancel: &CancellationToken,
    ) -> Result<Inference<C::Detail>, StyleError> {
        debug!(convention = convention.name(), "no explicit preference, scanning");
        search(pool, current, group, &self.rules, cancel).await
    }

    /// An explicitly stated, recognizable preference for `convention`.
    fn configured(
        &self,
        convention: Convention,
        current: &SourceArtifact,
    ) -> Result<Option<(Verdict, OptionValue)>, StyleError> {
        let key = convention.option_key();
        let Some(value) = self.options.get(current.path(), key)? else {
            return Ok(None);
        };
        if !value.source.is_explicit() {
            debug!(key, value = %value.raw, "ignoring default preference");
            return Ok(None);
        }
        match convention.parse_option(&value.raw) {
            Some(verdict) => {
                debug!(key, value = %value.raw, source = %value.source, "explicit preference");
                Ok(Some((verdict, value)))
            }
            None => {
                debug!(key, value = %value.raw, "unrecognized preference value");
                Ok(None)
            }
        }
    }
}

impl Default for StyleInference {
    fn default() -> Self {
        Self::new(Arc::new(NoOptions))
    }
}

impl std::fmt::Debug for StyleInference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleInference")
            .field("capacity", &self.underscore_fields.capacity())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

fn validate(current: &SourceArtifact) -> Result<(), StyleError> {
    if current.path().is_empty() {
        return Err(StyleError::invalid_args("artifact path must not be empty"));
    }
    Ok(())
}

fn configured_outcome<D>(verdict: Verdict, detail: D) -> Outcome<D> {
    match verdict {
        Verdict::Yes => Outcome::Yes(detail),
        Verdict::No => Outcome::No,
        Verdict::Mixed => Outcome::Mixed,
        Verdict::Unknown => Outcome::Unknown,
    }
}
