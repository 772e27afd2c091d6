//! Library visit log

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::timestamp;

/// `guest` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    /// Student document id of the visitor
    pub student_id: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub tanggal_kunjungan: DateTime<Utc>,
}

/// Visit joined with the visitor's name and class
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuestVisit {
    pub id: String,
    pub name: String,
    pub class: String,
    pub tanggal_kunjungan: DateTime<Utc>,
}
