//! Validation and coercion of raw catalog rows into typed domain shapes.
//!
//! Authored content arrives loosely typed: decision options may be an object,
//! a bare array or a string of JSON, field names come in two vocabularies,
//! and ids use `0` for "none". Everything is normalized here.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use storyflow_core::error::DomainError;
use storyflow_core::ids::{CharacterId, MediaId, RewardId, StepId, StoryId};

use super::media::{
    AppLaunchConfig, HotspotConfig, MediaContent, MediaKind, MediaResource, SceneConfig,
};
use super::records::{CharacterRecord, MediaRecord, RewardRecord, StepRecord, StoryRecord};
use super::reward::{Character, Reward};
use super::step::{DecisionOption, FlowStep, NextTarget, StepType};
use super::story::Story;

/// Keys under which an options array may be nested.
const OPTION_LIST_KEYS: [&str; 2] = ["options", "opciones_siguientes_json"];

#[derive(Debug, Deserialize)]
struct RawOption {
    #[serde(alias = "texto")]
    text: String,
    #[serde(alias = "siguiente_paso_id", alias = "nextStepId")]
    next_step_id: i64,
    #[serde(default, alias = "recompensaId", alias = "rewardId")]
    reward_id: Option<i64>,
}

fn positive(id: Option<i64>) -> Option<i64> {
    id.filter(|value| *value > 0)
}

/// Parses a step type name.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an unknown name.
pub fn parse_step_type(name: &str) -> Result<StepType, DomainError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "narrative" | "narrativo" => Ok(StepType::Narrative),
        "decision" | "pregunta" => Ok(StepType::Decision),
        "final" => Ok(StepType::Final),
        "app" => Ok(StepType::App),
        other => Err(DomainError::Validation(format!(
            "unknown step type '{other}'"
        ))),
    }
}

/// Parses a media kind name.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an unknown name.
pub fn parse_media_kind(name: &str) -> Result<MediaKind, DomainError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "image" | "imagen" => Ok(MediaKind::Image),
        "video" => Ok(MediaKind::Video),
        "audio" => Ok(MediaKind::Audio),
        "3d_model" => Ok(MediaKind::Model3d),
        "interactive" => Ok(MediaKind::Interactive),
        "app" => Ok(MediaKind::App),
        "transcript" | "transcripcion" => Ok(MediaKind::Transcript),
        "subtitle" | "subtitulo" => Ok(MediaKind::Subtitle),
        other => Err(DomainError::Validation(format!(
            "unknown media kind '{other}'"
        ))),
    }
}

/// Decodes a JSON column that may hold either JSON or a string of JSON.
fn decode_json_text(value: Option<Value>, what: &str) -> Result<Option<Value>, DomainError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| DomainError::Validation(format!("{what} is not valid JSON: {e}"))),
        Some(other) => Ok(Some(other)),
    }
}

/// Parses decision options from any accepted encoding.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the value is not an options list, or
/// an option lacks its text or target.
pub fn parse_options(value: &Value) -> Result<Vec<DecisionOption>, DomainError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(_) => match decode_json_text(Some(value.clone()), "decision options")? {
            Some(decoded) => parse_options(&decoded),
            None => Ok(Vec::new()),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let raw: RawOption = serde_json::from_value(item.clone()).map_err(|e| {
                    DomainError::Validation(format!("malformed decision option: {e}"))
                })?;
                Ok(DecisionOption {
                    text: raw.text,
                    next_step_id: StepId(raw.next_step_id),
                    reward_id: positive(raw.reward_id).map(RewardId),
                })
            })
            .collect(),
        Value::Object(map) => OPTION_LIST_KEYS
            .iter()
            .find_map(|key| map.get(*key))
            .map_or_else(|| Ok(Vec::new()), parse_options),
        other => Err(DomainError::Validation(format!(
            "decision options must be a list, got {other}"
        ))),
    }
}

/// Coerces a story row.
#[must_use]
pub fn coerce_story(record: StoryRecord) -> Story {
    Story {
        id: StoryId(record.id),
        title: record.title,
        description: record.description,
        dependency_story_id: positive(record.dependency_story_id).map(StoryId),
        order_index: record.order_index.unwrap_or(0),
        image_resource_id: positive(record.image_resource_id).map(MediaId),
    }
}

/// Coerces a step row, resolving its successor by step type.
///
/// On `final` steps the successor is a story: the row's `next_step_id`, or
/// failing that the first option's target.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an unknown step type or malformed
/// options.
pub fn coerce_step(record: StepRecord) -> Result<FlowStep, DomainError> {
    let step_type = parse_step_type(&record.step_type)
        .map_err(|e| DomainError::Validation(format!("step {}: {e}", record.id)))?;
    let options = match &record.decision_options {
        Some(value) => parse_options(value)
            .map_err(|e| DomainError::Validation(format!("step {}: {e}", record.id)))?,
        None => Vec::new(),
    };

    let next_id = positive(record.next_step_id);
    let next = match step_type {
        StepType::Final => next_id
            .or_else(|| options.first().map(|option| option.next_step_id.get()))
            .filter(|id| *id > 0)
            .map(|id| NextTarget::Story(StoryId(id))),
        _ => next_id.map(|id| NextTarget::Step(StepId(id))),
    };

    Ok(FlowStep {
        id: StepId(record.id),
        story_id: StoryId(record.story_id),
        order_index: record.order_index,
        step_type,
        content: record.content,
        reward_id: positive(record.reward_id).map(RewardId),
        character_id: positive(record.character_id).map(CharacterId),
        media_resource_id: positive(record.media_resource_id).map(MediaId),
        next,
        options,
    })
}

fn normalize_hotspot(hotspot: &mut HotspotConfig) {
    hotspot.reward_id = hotspot.reward_id.filter(|id| id.get() > 0);
    hotspot.character_id = hotspot.character_id.filter(|id| id.get() > 0);
    hotspot.success_reward_id = hotspot.success_reward_id.filter(|id| id.get() > 0);
    hotspot.failure_reward_id = hotspot.failure_reward_id.filter(|id| id.get() > 0);
}

fn decode_scene(metadata: Option<Value>) -> Result<SceneConfig, DomainError> {
    let Some(value) = metadata else {
        return Ok(SceneConfig::default());
    };
    let (hotspots_value, resource_music) = match value {
        Value::Array(_) => (value, None),
        Value::Object(mut map) => {
            let hotspots = map
                .remove("hotspots")
                .unwrap_or_else(|| Value::Array(Vec::new()));
            let music = map
                .remove("background_music")
                .or_else(|| map.remove("backgroundMusic"))
                .and_then(|v| v.as_str().map(str::to_owned))
                .filter(|url| !url.is_empty());
            (hotspots, music)
        }
        other => {
            return Err(DomainError::Validation(format!(
                "3d_model metadata must be an array or object, got {other}"
            )));
        }
    };

    let mut hotspots: Vec<HotspotConfig> = serde_json::from_value(hotspots_value)
        .map_err(|e| DomainError::Validation(format!("malformed hotspot list: {e}")))?;
    for hotspot in &mut hotspots {
        normalize_hotspot(hotspot);
    }

    let mut seen = HashSet::new();
    for hotspot in &hotspots {
        if hotspot.is_interactive() && hotspot.mesh_name.is_empty() {
            return Err(DomainError::Validation(
                "interactive hotspot without a mesh name".to_owned(),
            ));
        }
        if !hotspot.mesh_name.is_empty() && !seen.insert(hotspot.mesh_name.as_str()) {
            return Err(DomainError::Validation(format!(
                "duplicate hotspot mesh name '{}'",
                hotspot.mesh_name
            )));
        }
    }

    let music: Vec<&HotspotConfig> = hotspots.iter().filter(|h| !h.is_interactive()).collect();
    if music.len() > 1 || (!music.is_empty() && resource_music.is_some()) {
        return Err(DomainError::Validation(
            "more than one background music source".to_owned(),
        ));
    }
    let background_music_url = music
        .first()
        .map(|h| h.url.clone())
        .filter(|url| !url.is_empty())
        .or(resource_music);

    Ok(SceneConfig {
        hotspots,
        background_music_url,
    })
}

fn decode_app(metadata: Option<Value>) -> Result<AppLaunchConfig, DomainError> {
    let Some(value) = metadata else {
        return Ok(AppLaunchConfig::default());
    };
    let Value::Object(mut map) = value else {
        return Err(DomainError::Validation(
            "app metadata must be an object".to_owned(),
        ));
    };
    let app_config = map
        .remove("app_config")
        .or_else(|| map.remove("appConfig"))
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    let options = match map.remove("flow_config").or_else(|| map.remove("flowConfig")) {
        Some(flow) => parse_options(&flow)?,
        None => Vec::new(),
    };
    Ok(AppLaunchConfig {
        app_config,
        options,
    })
}

/// Coerces a media row, decoding its metadata according to its kind.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an unknown kind or metadata that does
/// not decode for the kind. The error concerns this resource only.
pub fn coerce_media(record: MediaRecord) -> Result<MediaResource, DomainError> {
    let id = MediaId(record.id);
    let wrap = |e: DomainError| DomainError::Validation(format!("media {id}: {e}"));
    let kind = parse_media_kind(&record.kind).map_err(wrap)?;
    let content = match kind {
        MediaKind::Model3d => {
            let metadata = decode_json_text(record.metadata, "metadata").map_err(wrap)?;
            MediaContent::Scene(decode_scene(metadata).map_err(wrap)?)
        }
        MediaKind::App => {
            let metadata = decode_json_text(record.metadata, "metadata").map_err(wrap)?;
            MediaContent::App(decode_app(metadata).map_err(wrap)?)
        }
        _ => MediaContent::Opaque {
            metadata: record.metadata.filter(|v| !v.is_null()),
        },
    };
    Ok(MediaResource {
        id,
        kind,
        file: record.file,
        content,
    })
}

/// Coerces a reward row.
#[must_use]
pub fn coerce_reward(record: RewardRecord) -> Reward {
    Reward {
        id: RewardId(record.id),
        name: record.name,
        description: record.description,
        kind: record.kind,
        xp_value: record.value,
        origin_story_id: positive(record.origin_story_id).map(StoryId),
    }
}

/// Coerces a character row.
#[must_use]
pub fn coerce_character(record: CharacterRecord) -> Character {
    Character {
        id: CharacterId(record.id),
        name: record.name,
        description: record.description,
    }
}
