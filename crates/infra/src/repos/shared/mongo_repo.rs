use super::repo::{DeleteResult, UpdateResult};
use crate::error::{Result, UserStoreError};
use mongodb::{
    bson::{self, doc, oid::ObjectId, Document},
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::error;

/// Server error code for writes violating a unique index
const DUPLICATE_KEY_ERROR_CODE: i32 = 11000;

pub trait MongoDocument<E>: Serialize + DeserializeOwned {
    fn to_domain(self) -> E;
}

fn persistence_to_entity<E, D: MongoDocument<E>>(doc: Document) -> Result<E> {
    let raw: D = bson::from_document(doc).map_err(|e| {
        error!("Unable to decode stored document: {:?}", e);
        UserStoreError::MalformedDocument(e.to_string())
    })?;
    Ok(raw.to_domain())
}

pub fn to_persistence<T: Serialize>(raw: &T) -> Result<Document> {
    bson::to_document(raw).map_err(|e| UserStoreError::MalformedDocument(e.to_string()))
}

pub fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_ERROR_CODE
    )
}

/// Creating an index that already exists with the same options is a no-op
/// on the server, so this is safe to run on every startup.
pub async fn ensure_unique_index(collection: &Collection<Document>, field: &str) -> Result<()> {
    let index = IndexModel::builder()
        .keys(doc! { field: 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    collection.create_index(index, None).await?;
    Ok(())
}

/// Returns the `ObjectId` the document was stored with, if the server reported one
pub async fn insert<T: Serialize>(
    collection: &Collection<Document>,
    raw: &T,
) -> Result<Option<ObjectId>> {
    let doc = to_persistence(raw)?;
    let res = collection.insert_one(doc, None).await?;
    Ok(res.inserted_id.as_object_id())
}

pub async fn find_one_by<E, D: MongoDocument<E>>(
    collection: &Collection<Document>,
    filter: Document,
) -> Result<Option<E>> {
    match collection.find_one(filter, None).await? {
        Some(doc) => persistence_to_entity::<E, D>(doc).map(Some),
        None => Ok(None),
    }
}

/// Sets the given fields on the first document matching the filter.
/// Fields not present in `set` are never removed.
pub async fn update_one(
    collection: &Collection<Document>,
    filter: Document,
    set: Document,
) -> Result<UpdateResult> {
    let res = collection
        .update_one(filter, doc! { "$set": set }, None)
        .await?;
    Ok(UpdateResult {
        modified_count: res.modified_count,
    })
}

pub async fn delete_one_by(
    collection: &Collection<Document>,
    filter: Document,
) -> Result<DeleteResult> {
    let res = collection.delete_one(filter, None).await?;
    Ok(DeleteResult {
        deleted_count: res.deleted_count,
    })
}
