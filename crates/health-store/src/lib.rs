//! Persistence for the vitals services.
//!
//! Every collaborator the engines talk to sits behind a narrow trait in
//! [`store`]; [`InMemoryHealthStore`] backs tests and local runs and
//! [`PostgresHealthStore`] backs deployments.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use common::{DeviceId, DeviceKind, MetricType, RecordId, UserId};
pub use error::{Result, StoreError};
pub use memory::InMemoryHealthStore;
pub use postgres::PostgresHealthStore;
pub use query::{DeviceQuery, MetricQuery, SortOrder};
pub use record::{
    AssessmentRecord, Device, DeviceUpdate, FamilyHistoryEntry, HealthProfile, MetricSample,
    NotificationEntry, NotificationSetting,
};
pub use store::{
    AssessmentRepository, DeviceRegistry, HealthStore, MetricStore, MetricStoreExt,
    NotificationRepository, ProfileRepository,
};
