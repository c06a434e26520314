use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::record::Record;

/// A résumé held by the repository: the extracted record plus the
/// embedding computed at store time.
///
/// `embedder` names the strategy that produced `embedding`. Vectors from
/// different strategies have different dimensions and semantics, so the
/// search path only scores candidates whose embedder matches the query's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResume {
    pub id: Uuid,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub record: Record,
    #[serde(skip_serializing, default)]
    pub embedding: Vec<f32>,
    pub embedder: String,
}
