use crate::errors::{AppError, ExternalStoreError};
use crate::mapping::MappingProfile;
use crate::models::{MappedRecord, RecordId};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Write capability of the external document store.
///
/// Each call appends one record; there is no update or dedup key.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_record(
        &self,
        container_id: &str,
        properties: Map<String, Value>,
    ) -> Result<RecordId, ExternalStoreError>;
}

/// Hands mapped inquiry records to the store.
pub struct InquiryService<'a> {
    store: &'a dyn RecordStore,
    container_id: &'a str,
}

impl<'a> InquiryService<'a> {
    pub fn new(store: &'a dyn RecordStore, container_id: &'a str) -> Self {
        Self {
            store,
            container_id,
        }
    }

    /// Writes `record` as a new row using the property layout of `profile`.
    pub async fn submit(
        &self,
        profile: &MappingProfile,
        record: &MappedRecord,
    ) -> Result<RecordId, AppError> {
        let properties = profile.to_properties(record);
        let record_id = self
            .store
            .create_record(self.container_id, properties)
            .await?;
        Ok(record_id)
    }
}
