//! The multi-user profile store.
//!
//! [`UserStore`] owns the full collection of [`UserProfile`]s and the
//! current-user pointer, and is the only writer of the consolidated users
//! document. Facade stores ([`crate::facade`]) are borrowed views over the
//! current profile's tree and route every mutation through [`UserStore::save`].
//!
//! Startup is a single [`UserStore::initialize`] call: load the persisted
//! document (running the migration chain), or seed a first profile from the
//! legacy flat keys, or seed a default profile. Saving is suppressed for the
//! whole routine — a save issued mid-load would clobber the richer on-disk
//! document with whatever half-built state is in memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::backend::StorageBackend;
use crate::error::{FretpadError, Result};
use crate::kv::KvAdapter;
use crate::legacy;
use crate::migrate;
use crate::model::{UserData, UserProfile};

pub const USERS_KEY: &str = "users";
pub const USER_META_KEY: &str = "userMeta";
/// Superseded by the pointer inside the users document; still honored as a
/// fallback when resolving the current user.
pub const LEGACY_CURRENT_USER_KEY: &str = "currentUserId";

pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";
pub const DEFAULT_USER_NAME: &str = "Default User";

/// The consolidated persisted document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsersDocument {
    schema_version: u64,
    users: Vec<UserProfile>,
    current_user_id: Option<Uuid>,
    last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMeta {
    pub last_export_date: Option<DateTime<Utc>>,
    pub last_import_date: Option<DateTime<Utc>>,
}

/// Shallow profile-metadata update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedUser {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub data: UserData,
}

impl From<&UserProfile> for ExportedUser {
    fn from(p: &UserProfile) -> Self {
        Self {
            name: p.name.clone(),
            email: p.email.clone(),
            avatar: p.avatar.clone(),
            created_at: p.created_at,
            // Clone is the deep copy: no substructure is shared with the
            // live profile, and handle ids inside are weak by construction.
            data: p.data.clone(),
        }
    }
}

/// Versioned export envelope, single-user or bulk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<ExportedUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<ExportedUser>>,
}

pub struct UserStore<B: StorageBackend> {
    kv: KvAdapter<B>,
    users: Vec<UserProfile>,
    current_user_id: Option<Uuid>,
    initializing: bool,
    initialized: bool,
    meta: UserMeta,
}

impl<B: StorageBackend> UserStore<B> {
    pub fn new(kv: KvAdapter<B>) -> Self {
        Self {
            kv,
            users: Vec::new(),
            current_user_id: None,
            initializing: false,
            initialized: false,
            meta: UserMeta::default(),
        }
    }

    pub fn kv(&self) -> &KvAdapter<B> {
        &self.kv
    }

    pub(crate) fn kv_mut(&mut self) -> &mut KvAdapter<B> {
        &mut self.kv
    }

    pub fn users(&self) -> &[UserProfile] {
        &self.users
    }

    pub fn meta(&self) -> &UserMeta {
        &self.meta
    }

    pub fn current_user_id(&self) -> Option<Uuid> {
        self.current_user_id
    }

    pub fn current_user(&self) -> Option<&UserProfile> {
        let id = self.current_user_id?;
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user(&self, id: Uuid) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.id == id)
    }

    fn user_mut(&mut self, id: Uuid) -> Option<&mut UserProfile> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    /// Idempotent startup routine. Loads the persisted collection, seeding
    /// from legacy flat keys or plain defaults when none exists, then
    /// resolves the current user (document pointer, then the legacy
    /// standalone pointer key, then the first profile).
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initializing = true;

        self.load_users_from_storage();

        if self.users.is_empty() {
            let mut profile = UserProfile::new(DEFAULT_USER_NAME);
            if let Some(data) = legacy::decode_legacy_profile(&self.kv) {
                info!("seeding first profile from legacy flat keys");
                profile.data = data;
            } else {
                info!("no persisted users, seeding default profile");
            }
            self.current_user_id = Some(profile.id);
            self.users.push(profile);
        }

        let resolved = self
            .current_user_id
            .filter(|id| self.users.iter().any(|u| u.id == *id))
            .or_else(|| self.legacy_current_pointer())
            .or_else(|| self.users.first().map(|u| u.id));
        self.current_user_id = resolved;

        if let Some(user) = resolved.and_then(|id| self.user_mut(id)) {
            user.last_active = Utc::now();
        }

        self.meta = self.kv.get_json(USER_META_KEY).unwrap_or_default();

        self.initializing = false;
        self.initialized = true;
        self.save();
        Ok(())
    }

    fn legacy_current_pointer(&self) -> Option<Uuid> {
        let raw = self.kv.get(LEGACY_CURRENT_USER_KEY, true)?;
        let id = raw.trim_matches('"').parse().ok()?;
        self.users.iter().any(|u| u.id == id).then_some(id)
    }

    /// Load and migrate the consolidated document. Parse failures are
    /// logged and treated as "no persisted data" — startup must never fail
    /// on a corrupt store.
    fn load_users_from_storage(&mut self) {
        let Some(raw) = self.kv.get(USERS_KEY, true) else {
            return;
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "users document is corrupt, falling back to defaults");
                return;
            }
        };
        let migrated = migrate::migrate(value);
        match serde_json::from_value::<UsersDocument>(migrated) {
            Ok(doc) => {
                self.users = doc.users;
                self.current_user_id = doc.current_user_id;
            }
            Err(e) => {
                warn!(error = %e, "users document did not deserialize, falling back to defaults");
            }
        }
    }

    /// Persist the whole collection as one document. A no-op while
    /// initialization is in flight. After writing, the value is read back
    /// and compared; a mismatch is logged as a warning and nothing more.
    pub fn save(&mut self) {
        if self.initializing {
            debug!("save suppressed during initialization");
            return;
        }
        if let Some(id) = self.current_user_id {
            if let Some(user) = self.user_mut(id) {
                user.last_active = Utc::now();
            }
        }
        let doc = UsersDocument {
            schema_version: migrate::SCHEMA_VERSION,
            users: self.users.clone(),
            current_user_id: self.current_user_id,
            last_modified: Some(Utc::now()),
        };
        let serialized = match serde_json::to_string(&doc) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "users document failed to serialize, skipping save");
                return;
            }
        };
        self.kv.set(USERS_KEY, &serialized, true);

        match self.kv.get(USERS_KEY, true) {
            Some(read_back) if read_back == serialized => {}
            _ => warn!("written users document did not read back identically"),
        }
    }

    fn save_meta(&mut self) {
        let meta = self.meta.clone();
        self.kv.set_json(USER_META_KEY, &meta);
    }

    pub fn create_user(
        &mut self,
        name: impl Into<String>,
        email: Option<String>,
        avatar: Option<String>,
    ) -> Result<Uuid> {
        let mut profile = UserProfile::new(name);
        profile.email = email;
        profile.avatar = avatar;
        let id = profile.id;
        self.users.push(profile);
        self.save();
        Ok(id)
    }

    /// Deleting the last remaining profile is refused: the app always has at
    /// least one profile once initialized.
    pub fn delete_user(&mut self, id: Uuid) -> Result<()> {
        let index = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(FretpadError::UserNotFound(id))?;
        if self.users.len() == 1 {
            return Err(FretpadError::LastProfile);
        }
        self.users.remove(index);
        if self.current_user_id == Some(id) {
            // Never leave the store without an active profile.
            self.current_user_id = self.users.first().map(|u| u.id);
            if let Some(current) = self.current_user_id.and_then(|id| self.user_mut(id)) {
                current.last_active = Utc::now();
            }
        }
        self.save();
        Ok(())
    }

    /// Point the store at another profile. No data is copied: facade stores
    /// read through the current pointer, so they reflect the new profile on
    /// their next access.
    pub fn switch_user(&mut self, id: Uuid) -> Result<()> {
        let user = self.user_mut(id).ok_or(FretpadError::UserNotFound(id))?;
        user.last_active = Utc::now();
        self.current_user_id = Some(id);
        self.save();
        Ok(())
    }

    pub fn update_user_profile(&mut self, id: Uuid, update: ProfileUpdate) -> Result<()> {
        let user = self.user_mut(id).ok_or(FretpadError::UserNotFound(id))?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = Some(email);
        }
        if let Some(avatar) = update.avatar {
            user.avatar = Some(avatar);
        }
        self.save();
        Ok(())
    }

    /// Run a mutation against the current profile's data tree, then persist
    /// the whole collection. This is the single write path the facade
    /// stores use.
    pub(crate) fn mutate_current<R>(&mut self, f: impl FnOnce(&mut UserData) -> R) -> Result<R> {
        let id = self
            .current_user_id
            .ok_or_else(|| FretpadError::Store("store is not initialized".to_string()))?;
        let user = self.user_mut(id).ok_or(FretpadError::UserNotFound(id))?;
        let result = f(&mut user.data);
        self.save();
        Ok(result)
    }

    pub fn current_data(&self) -> Option<&UserData> {
        self.current_user().map(|u| &u.data)
    }

    pub fn export_user(&mut self, id: Uuid) -> Result<ExportDocument> {
        let user = self.user(id).ok_or(FretpadError::UserNotFound(id))?;
        let doc = ExportDocument {
            version: EXPORT_FORMAT_VERSION.to_string(),
            export_date: Utc::now(),
            user: Some(ExportedUser::from(user)),
            users: None,
        };
        self.meta.last_export_date = Some(doc.export_date);
        self.save_meta();
        Ok(doc)
    }

    pub fn export_all_users(&mut self) -> ExportDocument {
        let doc = ExportDocument {
            version: EXPORT_FORMAT_VERSION.to_string(),
            export_date: Utc::now(),
            user: None,
            users: Some(self.users.iter().map(ExportedUser::from).collect()),
        };
        self.meta.last_export_date = Some(doc.export_date);
        self.save_meta();
        doc
    }

    /// Import a single-user envelope. Shape is validated up front and the
    /// whole import either succeeds or leaves the store untouched.
    ///
    /// Name collisions never overwrite silently: with `overwrite_existing`
    /// unset the imported profile is renamed `"<name> (Imported <date>)"`.
    pub fn import_user(&mut self, doc: &Value, overwrite_existing: bool) -> Result<Uuid> {
        if doc.get("version").and_then(Value::as_str).is_none() {
            return Err(FretpadError::InvalidFormat(
                "missing version field".to_string(),
            ));
        }
        let user = doc
            .get("user")
            .ok_or_else(|| FretpadError::InvalidFormat("missing user field".to_string()))?;
        let id = self.import_user_entry(user, overwrite_existing)?;
        self.meta.last_import_date = Some(Utc::now());
        self.save_meta();
        self.save();
        Ok(id)
    }

    /// Import one entry of an envelope. Shared by single and bulk import;
    /// does not persist — callers save once they are done.
    pub(crate) fn import_user_entry(
        &mut self,
        user: &Value,
        overwrite_existing: bool,
    ) -> Result<Uuid> {
        let name = user
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| FretpadError::InvalidFormat("user.name is missing".to_string()))?
            .to_string();
        let data_value = user
            .get("data")
            .ok_or_else(|| FretpadError::InvalidFormat("user.data is missing".to_string()))?;
        let data: UserData = serde_json::from_value(data_value.clone())
            .map_err(|e| FretpadError::InvalidFormat(format!("user.data: {}", e)))?;
        let email = user
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);
        let avatar = user
            .get("avatar")
            .and_then(Value::as_str)
            .map(str::to_string);

        if let Some(existing) = self.users.iter_mut().find(|u| u.name == name) {
            if overwrite_existing {
                existing.data = data;
                if email.is_some() {
                    existing.email = email;
                }
                if avatar.is_some() {
                    existing.avatar = avatar;
                }
                return Ok(existing.id);
            }
            let renamed = format!("{} (Imported {})", name, Utc::now().format("%Y-%m-%d"));
            let mut profile = UserProfile::new(renamed);
            profile.email = email;
            profile.avatar = avatar;
            profile.data = data;
            let id = profile.id;
            self.users.push(profile);
            return Ok(id);
        }

        let mut profile = UserProfile::new(name);
        profile.email = email;
        profile.avatar = avatar;
        profile.data = data;
        let id = profile.id;
        self.users.push(profile);
        Ok(id)
    }

    /// Replace the whole collection. Used by backup restore.
    pub(crate) fn replace_collection(
        &mut self,
        users: Vec<UserProfile>,
        current_user_id: Option<Uuid>,
    ) {
        self.users = users;
        self.current_user_id = current_user_id
            .filter(|id| self.users.iter().any(|u| u.id == *id))
            .or_else(|| self.users.first().map(|u| u.id));
        self.save();
    }
}
