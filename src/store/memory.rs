use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rand::{rngs::OsRng, RngCore};
use time::OffsetDateTime;
use tracing::{debug, error};
use uuid::Uuid;

use super::{GenerationRecord, GenerationStore, NewGeneration, NewUser, StoreError, User};

/// Source of fresh identifiers. Swappable so id faults can be exercised.
pub type IdSource = Box<dyn Fn() -> Result<Uuid, StoreError> + Send + Sync>;

/// Random v4 uuid from OS entropy; surfaces entropy failure instead of panicking.
pub fn random_id() -> Result<Uuid, StoreError> {
    let mut bytes = [0u8; 16];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        error!(error = %e, "os rng failed");
        StoreError::IdGeneration(e.to_string())
    })?;
    Ok(uuid::Builder::from_random_bytes(bytes).into_uuid())
}

#[derive(Default)]
struct Generations {
    seq: u64,
    // id -> (insertion sequence, record)
    by_id: HashMap<Uuid, (u64, GenerationRecord)>,
}

pub struct MemStore {
    users: RwLock<HashMap<Uuid, User>>,
    generations: RwLock<Generations>,
    next_id: IdSource,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self::with_id_source(Box::new(random_id))
    }

    pub fn with_id_source(next_id: IdSource) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            generations: RwLock::new(Generations::default()),
            next_id,
        }
    }

    fn fresh_id<V>(&self, taken: &HashMap<Uuid, V>) -> Result<Uuid, StoreError> {
        loop {
            let id = (self.next_id)()?;
            if !taken.contains_key(&id) {
                return Ok(id);
            }
            debug!(%id, "id collision, regenerating");
        }
    }

    fn users_read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, User>>, StoreError> {
        self.users.read().map_err(|_| StoreError::Poisoned)
    }

    fn users_write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, User>>, StoreError> {
        self.users.write().map_err(|_| StoreError::Poisoned)
    }

    fn generations_read(&self) -> Result<RwLockReadGuard<'_, Generations>, StoreError> {
        self.generations.read().map_err(|_| StoreError::Poisoned)
    }

    fn generations_write(&self) -> Result<RwLockWriteGuard<'_, Generations>, StoreError> {
        self.generations.write().map_err(|_| StoreError::Poisoned)
    }
}

impl GenerationStore for MemStore {
    fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users_read()?.get(&id).cloned())
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users_read()?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn create_user(&self, fields: NewUser) -> Result<User, StoreError> {
        let mut users = self.users_write()?;
        let id = self.fresh_id(&*users)?;
        let user = User {
            id,
            username: fields.username,
            password: fields.password,
        };
        users.insert(id, user.clone());
        debug!(user_id = %id, "user stored");
        Ok(user)
    }

    fn create_generation(&self, fields: NewGeneration) -> Result<GenerationRecord, StoreError> {
        let mut generations = self.generations_write()?;
        let id = self.fresh_id(&generations.by_id)?;
        let record = GenerationRecord {
            id,
            user_id: fields.user_id,
            kind: fields.kind,
            prompt: fields.prompt,
            result: fields.result,
            metadata: fields.metadata,
            created_at: OffsetDateTime::now_utc(),
        };
        generations.seq += 1;
        let seq = generations.seq;
        generations.by_id.insert(id, (seq, record.clone()));
        debug!(generation_id = %id, kind = ?record.kind, "generation stored");
        Ok(record)
    }

    fn list_generations_by_user(
        &self,
        user_id: Option<Uuid>,
    ) -> Result<Vec<GenerationRecord>, StoreError> {
        let Some(user_id) = user_id else {
            return Ok(Vec::new());
        };
        let generations = self.generations_read()?;
        let mut owned: Vec<&(u64, GenerationRecord)> = generations
            .by_id
            .values()
            .filter(|(_, r)| r.user_id == Some(user_id))
            .collect();
        owned.sort_by(|(sa, a), (sb, b)| {
            b.created_at.cmp(&a.created_at).then_with(|| sb.cmp(sa))
        });
        Ok(owned.into_iter().map(|(_, r)| r.clone()).collect())
    }
}
