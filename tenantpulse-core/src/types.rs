//! Core domain types for tenantpulse
//!
//! These types are read-only views over a platform snapshot: a list of
//! tenant companies, each owning users, instances, channels and broadcasts.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Company** | A tenant of the platform |
//! | **Instance** | A connected messaging endpoint (e.g. a phone-number-backed connection) |
//! | **Channel** | A named grouping used to route messages |
//! | **Broadcast** | A bulk messaging campaign with a lifecycle status |
//! | **Speed message** | A pre-defined quick-reply template counted per channel |
//!
//! ## Normalization
//!
//! Every record is normalized while it is deserialized, so analytics code
//! never has to branch on missing data:
//! - counters default to `0` when absent, `null` or not a whole number;
//!   integral floats such as `3.0` are accepted
//! - categorical fields default to [`UNKNOWN`] when absent or `null`
//! - flags default to `false` when absent or `null`
//! - `type_details: null` is treated exactly like a missing `type_details`
//! - identifiers are read from `_id` or `id`, whichever is present
//! - contact fields (`email`, `phone`) accept strings or numbers
//!
//! Denormalized counters (`users_count`, ...) may legitimately differ from
//! the length of the populated collections. Rates use collection lengths;
//! volumes (revenue, capacity) use the counters.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Placeholder for categorical values that are absent or null.
pub const UNKNOWN: &str = "Unknown";

/// The fixed set of known user types used for adoption diversity.
pub const KNOWN_USER_TYPES: [&str; 4] = ["Agent", "Admin", "Supervisor", "AI"];

// ============================================
// Deserialization helpers
// ============================================

fn unknown() -> String {
    UNKNOWN.to_string()
}

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Oid {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Number(i64),
}

/// Accept `"abc"`, `{"$oid": "abc"}` or a number as an identifier.
fn record_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Oid { oid } => oid,
        RawId::Number(n) => n.to_string(),
    }))
}

/// Identifier under `_id` or `id`. Exports sometimes carry both; `_id` wins.
///
/// Used on a flattened field so both keys reach one reader instead of
/// colliding as duplicates.
fn either_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct IdKeys {
        #[serde(rename = "_id", default, deserialize_with = "record_id")]
        object_id: Option<String>,
        #[serde(default, deserialize_with = "record_id")]
        id: Option<String>,
    }

    let keys = IdKeys::deserialize(deserializer)?;
    Ok(keys.object_id.or(keys.id))
}

/// Write a flattened identifier back as a plain `id` key.
fn id_entry<S>(id: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(id.iter().map(|id| ("id", id)))
}

/// Lenient counter: integers and integral floats (`3.0`) are kept; null,
/// negative, fractional and non-numeric values read as 0.
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .unwrap_or(0),
        _ => 0,
    })
}

/// Contact fields arrive as strings or bare numbers; anything else is absent.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Lenient status flag: booleans as-is, numbers are true when non-zero,
/// strings are true for "true", "active", "enabled" or "1".
/// `null` is treated as absent.
fn status_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::Number(n)) => Some(n.as_f64().map_or(false, |f| f != 0.0)),
        Some(serde_json::Value::String(s)) => Some(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "active" | "enabled" | "1"
        )),
        Some(_) => Some(false),
    })
}

// ============================================
// Snapshot
// ============================================

/// A full platform snapshot as supplied by the ingestion layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Pre-computed platform totals shipped with the export
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: SnapshotMetadata,
    /// Tenant companies
    #[serde(default, deserialize_with = "null_as_default")]
    pub companies: Vec<Company>,
    /// SHA-256 of the raw document, set by the loader
    #[serde(skip)]
    pub source_digest: Option<String>,
}

/// Totals exported alongside the companies.
///
/// The engine derives its own totals from company counters; these are kept
/// for cross-checking only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    #[serde(default, deserialize_with = "count")]
    pub total_companies: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_users: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_channels: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_instances: u64,
    #[serde(default, deserialize_with = "count")]
    pub total_broadcasts: u64,
    #[serde(
        rename = "total_speedMessages",
        default,
        deserialize_with = "count"
    )]
    pub total_speed_messages: u64,
}

// ============================================
// Company
// ============================================

/// A tenant owning users, instances, channels and broadcasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    #[serde(flatten, deserialize_with = "either_id", serialize_with = "id_entry")]
    pub id: Option<String>,
    #[serde(default = "unknown", deserialize_with = "null_as_unknown")]
    pub name: String,
    #[serde(rename = "isActive", default, deserialize_with = "null_as_default")]
    pub is_active: bool,

    // Denormalized counters (authoritative for volume)
    #[serde(default, deserialize_with = "count")]
    pub users_count: u64,
    #[serde(default, deserialize_with = "count")]
    pub channels_count: u64,
    #[serde(default, deserialize_with = "count")]
    pub instances_count: u64,
    #[serde(default, deserialize_with = "count")]
    pub broadcasts_count: u64,
    #[serde(
        rename = "speedMessages_count",
        default,
        deserialize_with = "count"
    )]
    pub speed_messages_count: u64,

    // Owned collections (authoritative for rates)
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instances: Vec<Instance>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channels: Vec<Channel>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub broadcasts: Vec<Broadcast>,
}

impl Company {
    /// Create an empty company with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            is_active: false,
            users_count: 0,
            channels_count: 0,
            instances_count: 0,
            broadcasts_count: 0,
            speed_messages_count: 0,
            users: Vec::new(),
            instances: Vec::new(),
            channels: Vec::new(),
            broadcasts: Vec::new(),
        }
    }

    /// Populated channels with no speed messages.
    pub fn empty_channels(&self) -> usize {
        self.channels
            .iter()
            .filter(|c| c.speed_messages_count == 0)
            .count()
    }

    /// Pairs of (counter name, counter, populated length) that disagree.
    pub fn counter_mismatches(&self) -> Vec<(&'static str, u64, usize)> {
        [
            ("users", self.users_count, self.users.len()),
            ("instances", self.instances_count, self.instances.len()),
            ("channels", self.channels_count, self.channels.len()),
            ("broadcasts", self.broadcasts_count, self.broadcasts.len()),
        ]
        .into_iter()
        .filter(|(_, counter, len)| *counter != *len as u64)
        .collect()
    }
}

impl Default for Company {
    fn default() -> Self {
        Self::new(UNKNOWN)
    }
}

// ============================================
// User
// ============================================

/// A weak reference to the channel a user is assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRef {
    #[serde(flatten, deserialize_with = "either_id", serialize_with = "id_entry")]
    pub id: Option<String>,
    #[serde(default = "unknown", deserialize_with = "null_as_unknown")]
    pub name: String,
}

/// A platform user belonging to a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten, deserialize_with = "either_id", serialize_with = "id_entry")]
    pub id: Option<String>,
    #[serde(
        default = "unknown",
        alias = "user_name",
        deserialize_with = "null_as_unknown"
    )]
    pub name: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub phone: Option<String>,
    /// One of Agent/Admin/Supervisor/AI, or anything else the source emits
    #[serde(default = "unknown", deserialize_with = "null_as_unknown")]
    pub user_type_name: String,
    #[serde(default, deserialize_with = "status_flag")]
    pub user_status: Option<bool>,
    #[serde(rename = "isActive", default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default)]
    pub assigned_channel: Option<ChannelRef>,
}

impl User {
    pub fn new(name: impl Into<String>, user_type: impl Into<String>, active: bool) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: None,
            phone: None,
            user_type_name: user_type.into(),
            user_status: None,
            is_active: active,
            assigned_channel: None,
        }
    }

    /// Activity flag: `user_status` when present, else `isActive`.
    pub fn is_active(&self) -> bool {
        self.user_status.unwrap_or(self.is_active)
    }
}

// ============================================
// Instance
// ============================================

/// Classification attached to an instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceType {
    #[serde(default = "unknown", deserialize_with = "null_as_unknown")]
    pub name: String,
}

/// A connected messaging endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    #[serde(flatten, deserialize_with = "either_id", serialize_with = "id_entry")]
    pub id: Option<String>,
    #[serde(
        default = "unknown",
        alias = "nickName",
        deserialize_with = "null_as_unknown"
    )]
    pub name: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub phone: Option<String>,
    /// Connection status (open set, e.g. connected/disconnected)
    #[serde(default = "unknown", deserialize_with = "null_as_unknown")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default)]
    pub type_details: Option<InstanceType>,
    #[serde(default, deserialize_with = "count")]
    pub broadcasts_count: u64,
}

impl Instance {
    pub fn new(name: impl Into<String>, active: bool) -> Self {
        Self {
            id: None,
            name: name.into(),
            phone: None,
            status: unknown(),
            active,
            type_details: None,
            broadcasts_count: 0,
        }
    }

    /// Type classification, [`UNKNOWN`] when `type_details` is missing or null.
    pub fn type_name(&self) -> &str {
        self.type_details
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or(UNKNOWN)
    }
}

// ============================================
// Channel
// ============================================

/// A named message-routing grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    #[serde(flatten, deserialize_with = "either_id", serialize_with = "id_entry")]
    pub id: Option<String>,
    #[serde(default = "unknown", deserialize_with = "null_as_unknown")]
    pub name: String,
    #[serde(rename = "isActive", default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(
        rename = "speedMessages_count",
        default,
        deserialize_with = "count"
    )]
    pub speed_messages_count: u64,
    #[serde(default, deserialize_with = "count")]
    pub instances_count: u64,
}

impl Channel {
    pub fn new(name: impl Into<String>, active: bool) -> Self {
        Self {
            id: None,
            name: name.into(),
            is_active: active,
            speed_messages_count: 0,
            instances_count: 0,
        }
    }
}

// ============================================
// Broadcast
// ============================================

/// A bulk messaging campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broadcast {
    #[serde(flatten, deserialize_with = "either_id", serialize_with = "id_entry")]
    pub id: Option<String>,
    #[serde(default = "unknown", deserialize_with = "null_as_unknown")]
    pub name: String,
    /// Lifecycle status; case varies across exports
    #[serde(default = "unknown", deserialize_with = "null_as_unknown")]
    pub status: String,
}

impl Broadcast {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            status: status.into(),
        }
    }

    /// Status folded to a canonical capitalization ("completed" -> "Completed").
    pub fn normalized_status(&self) -> String {
        let lower = self.status.trim().to_lowercase();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => unknown(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("completed")
    }
}
