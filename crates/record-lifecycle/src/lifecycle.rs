//! RecordLifecycle: persistence orchestration and lifecycle transitions.

use crate::NonceObject;
use chrono::Duration;
use record_support::{Base62Encoder, SystemClock, TimeAgo};
use record_types::*;
use std::sync::Arc;

/// Hours added to a stored UTC time before relative-time formatting.
pub const TIMEAGO_SHIFT_HOURS: i64 = 7;

type Body<S> = <S as RecordStore>::Body;

/// Lifecycle operations for records of one type, backed by store `S` and log `L`.
///
/// Every write goes through [`RecordLifecycle::persist`] or a transition; both
/// refresh `updated` and backfill `id62` when the record has an id but no
/// short identifier yet.
pub struct RecordLifecycle<S, L> {
    store: S,
    log: L,
    clock: Arc<dyn Clock>,
    encoder: Arc<dyn IdentifierEncoder>,
    formatter: Arc<dyn RelativeTime>,
}

impl<S, L> RecordLifecycle<S, L>
where
    S: RecordStore,
    L: ActivityLog,
{
    /// Lifecycle with the system clock, base62 ids, and English relative times.
    pub fn new(store: S, log: L) -> Self {
        Self {
            store,
            log,
            clock: Arc::new(SystemClock),
            encoder: Arc::new(Base62Encoder),
            formatter: Arc::new(TimeAgo),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn IdentifierEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn RelativeTime>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    /// Insert or update `record`.
    ///
    /// On first persistence stamps `site` from `site` and `created` from the
    /// clock. Always refreshes `updated`. Declared geo fields holding raw
    /// coordinates are converted to points. If the first write fails the
    /// in-memory record is left untouched.
    pub async fn persist(
        &self,
        record: &mut Record<Body<S>>,
        site: &dyn SiteContext,
    ) -> Result<(), LifecycleError> {
        let now = self.clock.moment();
        let mut next = record.clone();
        next.resolve_geo_fields();

        let first = next.created.is_none();
        if first {
            next.site = Some(site.current()?);
            next.created = Some(now);
        }

        self.save(record, next, now).await?;
        if first {
            tracing::info!(
                record_type = record.record_type(),
                record_id = ?record.id,
                id62 = ?record.id62,
                "record created"
            );
        }
        Ok(())
    }

    pub async fn approve(
        &self,
        record: &mut Record<Body<S>>,
        actor: Option<UserId>,
    ) -> Result<Transition, LifecycleError> {
        self.transition(record, actor, "approve", |r, stamp| {
            r.approval.mark(Side::Positive, stamp)
        })
        .await
    }

    pub async fn unapprove(
        &self,
        record: &mut Record<Body<S>>,
        actor: Option<UserId>,
    ) -> Result<Transition, LifecycleError> {
        self.transition(record, actor, "unapprove", |r, stamp| {
            r.approval.mark(Side::Negative, stamp)
        })
        .await
    }

    pub async fn publish(
        &self,
        record: &mut Record<Body<S>>,
        actor: Option<UserId>,
    ) -> Result<Transition, LifecycleError> {
        self.transition(record, actor, "publish", |r, stamp| {
            r.publication.mark(Side::Positive, stamp)
        })
        .await
    }

    pub async fn unpublish(
        &self,
        record: &mut Record<Body<S>>,
        actor: Option<UserId>,
    ) -> Result<Transition, LifecycleError> {
        self.transition(record, actor, "unpublish", |r, stamp| {
            r.publication.mark(Side::Negative, stamp)
        })
        .await
    }

    /// Mark the record deleted. Approval and publication are left as they are.
    pub async fn soft_delete(
        &self,
        record: &mut Record<Body<S>>,
        actor: Option<UserId>,
    ) -> Result<Transition, LifecycleError> {
        self.transition(record, actor, "soft_delete", |r, stamp| {
            r.deleted = Some(stamp.moment());
            r.deleted_by = Some(stamp.by);
        })
        .await
    }

    /// Clear the deletion mark. `deleted_by` keeps the last actor on the
    /// delete axis, i.e. the one undeleting.
    pub async fn undelete(
        &self,
        record: &mut Record<Body<S>>,
        actor: Option<UserId>,
    ) -> Result<Transition, LifecycleError> {
        self.transition(record, actor, "undelete", |r, stamp| {
            r.deleted = None;
            r.deleted_by = Some(stamp.by);
        })
        .await
    }

    /// Remove the record from storage, whatever its soft-delete state.
    pub async fn permanent_delete(&self, record: Record<Body<S>>) -> Result<bool, LifecycleError> {
        if !record.is_persisted() {
            return Err(LifecycleError::NotPersisted);
        }
        let removed = self.store.hard_delete(&record).await?;
        tracing::info!(
            record_type = record.record_type(),
            record_id = ?record.id,
            removed,
            "record permanently deleted"
        );
        Ok(removed)
    }

    pub fn created_info(&self, record: &Record<Body<S>>) -> Option<TimeInfo> {
        record.created.map(|m| self.time_info(m))
    }

    pub fn deleted_info(&self, record: &Record<Body<S>>) -> Option<TimeInfo> {
        record.deleted.map(|m| self.time_info(m))
    }

    pub fn approved_info(&self, record: &Record<Body<S>>) -> Option<TimeInfo> {
        record
            .approval
            .get(Side::Positive)
            .map(|s| self.time_info(s.moment()))
    }

    pub fn published_info(&self, record: &Record<Body<S>>) -> Option<TimeInfo> {
        record
            .publication
            .get(Side::Positive)
            .map(|s| self.time_info(s.moment()))
    }

    /// Append an activity-log entry for `record`; a mention is attached with
    /// a second log write.
    pub async fn write_log(
        &self,
        record: &Record<Body<S>>,
        actor: UserId,
        message: &str,
        mention: Option<UserId>,
    ) -> Result<LogEntry, LifecycleError> {
        let record_id = record.id.ok_or(LifecycleError::NotPersisted)?;
        let mut entry = self
            .log
            .create(record.record_type(), record_id, actor, message)
            .await?;
        if let Some(user) = mention {
            self.log.attach_mention(&entry, user).await?;
            entry.mentions.push(user);
        }
        Ok(entry)
    }

    pub async fn find(
        &self,
        filter: &RecordFilter,
    ) -> Result<Option<Record<Body<S>>>, LifecycleError> {
        Ok(self.store.find_one(filter).await?)
    }

    /// The stored record with this nonce, or `make()` tagged with it.
    pub async fn nonce_object<F>(
        &self,
        nonce: &str,
        make: F,
    ) -> Result<NonceObject<Body<S>>, LifecycleError>
    where
        F: FnOnce() -> Record<Body<S>>,
    {
        let found = self
            .store
            .find_one(&RecordFilter::Nonce(nonce.to_string()))
            .await?;
        let record = match found {
            Some(r) => r,
            None => make().with_nonce(nonce),
        };
        Ok(NonceObject::new(record))
    }

    fn time_info(&self, m: Moment) -> TimeInfo {
        let shifted = m.at + Duration::hours(TIMEAGO_SHIFT_HOURS);
        TimeInfo {
            utc: m.at,
            timestamp: m.timestamp,
            timeago: self.formatter.format(shifted, self.clock.now()),
        }
    }

    async fn transition<F>(
        &self,
        record: &mut Record<Body<S>>,
        actor: Option<UserId>,
        action: &'static str,
        apply: F,
    ) -> Result<Transition, LifecycleError>
    where
        F: FnOnce(&mut Record<Body<S>>, Stamp),
    {
        let Some(actor) = actor else {
            tracing::debug!(
                record_type = record.record_type(),
                record_id = ?record.id,
                action,
                "transition skipped: no actor"
            );
            return Ok(Transition::SkippedNoActor);
        };
        if !record.is_persisted() {
            return Err(LifecycleError::NotPersisted);
        }

        let now = self.clock.moment();
        let mut next = record.clone();
        apply(&mut next, Stamp::new(now, actor));
        self.save(record, next, now).await?;

        tracing::debug!(
            record_type = record.record_type(),
            record_id = ?record.id,
            actor = actor.0,
            action,
            "transition applied"
        );
        Ok(Transition::Applied)
    }

    /// Refresh `updated`, write, then backfill `id62` with a second write if needed.
    async fn save(
        &self,
        record: &mut Record<Body<S>>,
        mut next: Record<Body<S>>,
        now: Moment,
    ) -> Result<(), LifecycleError> {
        let record_type = next.record_type();
        next.updated = Some(now);
        *record = self.store.write(next).await?;

        let Some(id) = record.id else {
            return Ok(());
        };
        if record.id62.is_some() {
            return Ok(());
        }
        let id62 = self.encoder.encode(id).inspect_err(|e| {
            tracing::warn!(record_type, record_id = id, error = %e, "id62 encoding failed");
        })?;
        let mut with_id62 = record.clone();
        with_id62.id62 = Some(id62);
        *record = self.store.write(with_id62).await.inspect_err(|e| {
            tracing::warn!(record_type, record_id = id, error = %e, "id62 write failed");
        })?;
        Ok(())
    }
}
