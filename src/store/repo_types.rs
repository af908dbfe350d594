use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String, // opaque to the store
}

/// Fields accepted by `GenerationStore::create_user`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    Text,
    Image,
}

/// Option name -> option value, specific to the generation kind.
pub type Metadata = BTreeMap<String, String>;

/// One persisted prompt -> result exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub kind: GenerationKind,
    pub prompt: String,
    pub result: String,
    pub metadata: Option<Metadata>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Fields accepted by `GenerationStore::create_generation`.
#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub user_id: Option<Uuid>,
    pub kind: GenerationKind,
    pub prompt: String,
    pub result: String,
    pub metadata: Option<Metadata>,
}
