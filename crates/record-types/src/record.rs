//! The base record: identity, tenancy, audit stamps, workflow axes, and body.

use crate::{AxisState, GeoField, GeoPoint, LatLng, Moment, RecordStatus, Side};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Storage-assigned primary key.
pub type RecordId = i64;

/// Reference to a user/account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Reference to a site/tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for SiteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fields and static configuration of a concrete record type.
pub trait RecordBody: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Type tag used for activity-log entries and storage naming.
    const RECORD_TYPE: &'static str;

    /// At most one record per creator.
    const UNIQUE_CREATOR: bool = false;

    /// Fields holding a [`GeoField`]; normalised on every persist.
    const GEO_FIELDS: &'static [&'static str] = &[];

    fn geo_field(&self, _name: &str) -> Option<&GeoField> {
        None
    }

    fn geo_field_mut(&mut self, _name: &str) -> Option<&mut GeoField> {
        None
    }
}

/// A record of type `B` with lifecycle metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "B: RecordBody")]
pub struct Record<B> {
    pub id: Option<RecordId>,
    pub id62: Option<String>,
    pub nonce: Option<String>,
    pub site: Option<SiteId>,
    pub created: Option<Moment>,
    pub created_by: UserId,
    pub updated: Option<Moment>,
    #[serde(default)]
    pub publication: AxisState,
    #[serde(default)]
    pub approval: AxisState,
    pub deleted: Option<Moment>,
    pub deleted_by: Option<UserId>,
    pub body: B,
}

impl<B: RecordBody> Record<B> {
    /// New in-memory record with no identity yet.
    pub fn new(created_by: UserId, body: B) -> Self {
        Self {
            id: None,
            id62: None,
            nonce: None,
            site: None,
            created: None,
            created_by,
            updated: None,
            publication: AxisState::default(),
            approval: AxisState::default(),
            deleted: None,
            deleted_by: None,
            body,
        }
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn record_type(&self) -> &'static str {
        B::RECORD_TYPE
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }

    /// True iff `user` is the creator. An absent user is never the owner.
    pub fn is_owner(&self, user: Option<UserId>) -> bool {
        user == Some(self.created_by)
    }

    pub fn status(&self) -> RecordStatus {
        RecordStatus {
            approval: self.approval.status(),
            publication: self.publication.status(),
        }
    }

    /// Coordinates of a declared geo field, `{0, 0}` when it holds no point.
    pub fn lat_lng(&self, field: &str) -> LatLng {
        self.body
            .geo_field(field)
            .and_then(GeoField::point)
            .map(LatLng::from)
            .unwrap_or_default()
    }

    /// Store coordinates on a geo field as a point. Returns `None` if the body
    /// has no such field.
    pub fn set_lat_lng(&mut self, field: &str, value: LatLng) -> Option<GeoPoint> {
        let slot = self.body.geo_field_mut(field)?;
        let point = GeoPoint::from(value);
        *slot = GeoField::Point(point);
        Some(point)
    }

    /// Turn pending coordinates on every declared geo field into points.
    pub fn resolve_geo_fields(&mut self) {
        for name in B::GEO_FIELDS {
            if let Some(field) = self.body.geo_field_mut(name) {
                field.resolve();
            }
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.map(|m| m.at)
    }

    pub fn created_at_timestamp(&self) -> Option<i64> {
        self.created.map(|m| m.timestamp)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated.map(|m| m.at)
    }

    pub fn updated_at_timestamp(&self) -> Option<i64> {
        self.updated.map(|m| m.timestamp)
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.publication.get(Side::Positive).map(|s| s.at)
    }

    pub fn published_at_timestamp(&self) -> Option<i64> {
        self.publication.get(Side::Positive).map(|s| s.timestamp)
    }

    pub fn published_by(&self) -> Option<UserId> {
        self.publication.get(Side::Positive).map(|s| s.by)
    }

    pub fn unpublished_at(&self) -> Option<DateTime<Utc>> {
        self.publication.get(Side::Negative).map(|s| s.at)
    }

    pub fn unpublished_at_timestamp(&self) -> Option<i64> {
        self.publication.get(Side::Negative).map(|s| s.timestamp)
    }

    pub fn unpublished_by(&self) -> Option<UserId> {
        self.publication.get(Side::Negative).map(|s| s.by)
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approval.get(Side::Positive).map(|s| s.at)
    }

    pub fn approved_at_timestamp(&self) -> Option<i64> {
        self.approval.get(Side::Positive).map(|s| s.timestamp)
    }

    pub fn approved_by(&self) -> Option<UserId> {
        self.approval.get(Side::Positive).map(|s| s.by)
    }

    pub fn unapproved_at(&self) -> Option<DateTime<Utc>> {
        self.approval.get(Side::Negative).map(|s| s.at)
    }

    pub fn unapproved_at_timestamp(&self) -> Option<i64> {
        self.approval.get(Side::Negative).map(|s| s.timestamp)
    }

    pub fn unapproved_by(&self) -> Option<UserId> {
        self.approval.get(Side::Negative).map(|s| s.by)
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted.map(|m| m.at)
    }

    pub fn deleted_at_timestamp(&self) -> Option<i64> {
        self.deleted.map(|m| m.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Shop {
        name: String,
        #[serde(default)]
        location: GeoField,
    }

    impl RecordBody for Shop {
        const RECORD_TYPE: &'static str = "shop";
        const GEO_FIELDS: &'static [&'static str] = &["location"];

        fn geo_field(&self, name: &str) -> Option<&GeoField> {
            (name == "location").then_some(&self.location)
        }

        fn geo_field_mut(&mut self, name: &str) -> Option<&mut GeoField> {
            (name == "location").then_some(&mut self.location)
        }
    }

    fn shop() -> Record<Shop> {
        Record::new(
            UserId(7),
            Shop {
                name: "corner".to_string(),
                location: GeoField::Unset,
            },
        )
    }

    #[test]
    fn owner_is_creator_only() {
        let r = shop();
        assert!(r.is_owner(Some(UserId(7))));
        assert!(!r.is_owner(Some(UserId(8))));
        assert!(!r.is_owner(None));
    }

    #[test]
    fn lat_lng_defaults_to_origin() {
        let mut r = shop();
        assert_eq!(r.lat_lng("location"), LatLng::default());
        r.body.location = GeoField::Pending(LatLng {
            latitude: 1.5,
            longitude: 2.5,
        });
        assert_eq!(r.lat_lng("location"), LatLng::default());
        r.resolve_geo_fields();
        assert_eq!(
            r.lat_lng("location"),
            LatLng {
                latitude: 1.5,
                longitude: 2.5
            }
        );
    }

    #[test]
    fn set_lat_lng_on_unknown_field_is_none() {
        let mut r = shop();
        assert!(r.set_lat_lng("nowhere", LatLng::default()).is_none());
        let p = r
            .set_lat_lng(
                "location",
                LatLng {
                    latitude: 3.0,
                    longitude: 4.0,
                },
            )
            .unwrap();
        assert_eq!(p, GeoPoint { x: 4.0, y: 3.0 });
    }
}
