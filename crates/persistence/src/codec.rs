//! Snapshot codec.
//!
//! The on-disk shape is versionless JSON:
//!
//! ```json
//! { "currentResource": 0.0, "cumulativeResource": 0.0, "prestigeLevel": 0,
//!   "producers": { "minion_intern": 3 }, "upgrades": ["banana_peeler"],
//!   "achievements": ["first_bunch"],
//!   "settings": { "musicVolume": 0.5, "sfxVolume": 0.5 } }
//! ```
//!
//! Every field is optional on read. A field that is present but malformed is
//! treated as absent, so one bad value never discards the rest of a save.
//! Producer maps and id lists go further and drop only their bad entries.
//! Only text that is not a JSON object at all is rejected.

use idle_core::{AchievementId, Catalog, GameState, ProducerId, RunState, Settings, UpgradeId};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Serializable projection of the full mutable state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub current_resource: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub cumulative_resource: f64,
    #[serde(default, deserialize_with = "lenient_level")]
    pub prestige_level: u32,
    /// Producer id to owned count.
    #[serde(default, deserialize_with = "lenient_counts")]
    pub producers: BTreeMap<String, u32>,
    /// Owned upgrade ids.
    #[serde(default, deserialize_with = "lenient_ids")]
    pub upgrades: Vec<String>,
    /// Unlocked achievement ids. Older saves omit this.
    #[serde(
        default,
        deserialize_with = "lenient_optional_ids",
        skip_serializing_if = "Option::is_none"
    )]
    pub achievements: Option<Vec<String>>,
    /// Older saves omit this.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub settings: Option<SnapshotSettings>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotSettings {
    pub music_volume: f64,
    pub sfx_volume: f64,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Settings::default().into()
    }
}

impl From<Settings> for SnapshotSettings {
    fn from(s: Settings) -> Self {
        Self {
            music_volume: s.music_volume,
            sfx_volume: s.sfx_volume,
        }
    }
}

impl From<SnapshotSettings> for Settings {
    fn from(s: SnapshotSettings) -> Self {
        Settings {
            music_volume: s.music_volume,
            sfx_volume: s.sfx_volume,
        }
        .clamped()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0))
}

fn lenient_level<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_count(&value).unwrap_or(0))
}

/// Keeps well-formed entries of a producer map and drops the rest.
fn lenient_counts<'de, D>(deserializer: D) -> Result<BTreeMap<String, u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Object(entries) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(id, v)| as_count(&v).map(|n| (id, n)))
        .collect())
}

/// String elements of an id list; anything else in the list is skipped.
fn string_items(value: Value) -> Option<Vec<String>> {
    let Value::Array(items) = value else {
        return None;
    };
    Some(
        items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(id) => Some(id),
                _ => None,
            })
            .collect(),
    )
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_items(value).unwrap_or_default())
}

fn lenient_optional_ids<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_items(value))
}

/// Non-negative integer, also accepting integral floats such as `3.0`.
fn as_count(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return Some(u32::try_from(n).unwrap_or(u32::MAX));
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 {
        Some(f.min(f64::from(u32::MAX)) as u32)
    } else {
        None
    }
}

/// Pure projection of the state into a snapshot.
pub fn serialize(state: &GameState) -> Snapshot {
    Snapshot {
        current_resource: state.run.current,
        cumulative_resource: state.run.cumulative,
        prestige_level: state.run.prestige_level,
        producers: state
            .producers
            .iter()
            .map(|(id, n)| (id.0.clone(), *n))
            .collect(),
        upgrades: state.upgrades.iter().map(|id| id.0.clone()).collect(),
        achievements: Some(state.achievements.iter().map(|id| id.0.clone()).collect()),
        settings: Some(state.settings.clone().into()),
    }
}

/// Rebuild state from a snapshot against the catalog.
///
/// Ids the catalog does not know are dropped; producers missing from the
/// snapshot start at zero; absent achievements and settings take defaults.
pub fn deserialize(snapshot: Snapshot, catalog: &Catalog) -> GameState {
    let mut state = GameState::new(catalog);
    state.run = RunState {
        current: snapshot.current_resource,
        cumulative: snapshot.cumulative_resource,
        prestige_level: snapshot.prestige_level,
    };
    for (id, owned) in snapshot.producers {
        let id = ProducerId(id);
        match state.producers.get_mut(&id) {
            Some(slot) => *slot = owned,
            None => debug!(producer = %id, "dropping unknown producer from save"),
        }
    }
    state.upgrades = snapshot
        .upgrades
        .into_iter()
        .map(UpgradeId)
        .filter(|id| catalog.upgrade(id).is_some())
        .collect();
    state.achievements = snapshot
        .achievements
        .unwrap_or_default()
        .into_iter()
        .map(AchievementId)
        .filter(|id| catalog.achievement(id).is_some())
        .collect();
    state.settings = snapshot.settings.map(Settings::from).unwrap_or_default();
    state
}

/// Encode a snapshot as JSON text.
pub fn encode(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Decode JSON text. Fails only when the text is not a JSON object.
pub fn decode(text: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(text)
}

/// Startup load: decode the stored text if any, falling back to the zero
/// state when it is missing or unreadable.
pub fn load_or_default(text: Option<&str>, catalog: &Catalog) -> GameState {
    let Some(text) = text else {
        return GameState::new(catalog);
    };
    match decode(text) {
        Ok(snapshot) => deserialize(snapshot, catalog),
        Err(e) => {
            warn!(error = %e, "corrupt save ignored, starting fresh");
            GameState::new(catalog)
        }
    }
}
