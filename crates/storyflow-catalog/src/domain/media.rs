//! Media resources, 3D hotspot layouts and embedded app configuration.

use serde::{Deserialize, Serialize};
use storyflow_core::ids::{CharacterId, MediaId, RewardId};

use super::step::DecisionOption;

/// The kind of asset a resource holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// A still image.
    Image,
    /// A video; steps wait for playback to end.
    Video,
    /// An audio track; steps wait for playback to end.
    Audio,
    /// A steerable 3D scene with discoverable hotspots.
    #[serde(rename = "3d_model")]
    Model3d,
    /// An interactive embed with no completion contract.
    Interactive,
    /// A sandboxed child application.
    App,
    /// A transcript document.
    Transcript,
    /// A subtitle track.
    Subtitle,
}

impl MediaKind {
    /// Whether steps bound to this kind wait for an end-of-playback event.
    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(self, Self::Video | Self::Audio)
    }
}

/// What a hotspot opens when clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HotspotContentType {
    /// An image popup.
    #[serde(alias = "imagen")]
    Image,
    /// A video popup.
    Video,
    /// An audio popup.
    Audio,
    /// An embedded child application.
    Interactive,
    /// Ambient audio for the scene; not discoverable.
    #[serde(alias = "background_music")]
    BackgroundMusic,
}

/// Optional placement of a hotspot in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotspotPosition {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

/// A named interactive region of a 3D scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotConfig {
    /// Mesh name inside the model; unique per resource.
    #[serde(default)]
    pub mesh_name: String,
    /// What the hotspot opens.
    pub content_type: HotspotContentType,
    /// Popup title.
    #[serde(default)]
    pub title: String,
    /// Content URL.
    #[serde(default)]
    pub url: String,
    /// Reward granted on first discovery.
    #[serde(default, alias = "recompensaId")]
    pub reward_id: Option<RewardId>,
    /// Character met on first discovery.
    #[serde(default, alias = "personajeId")]
    pub character_id: Option<CharacterId>,
    /// Subtitle track for video/audio hotspots.
    #[serde(default)]
    pub subtitles_url: Option<String>,
    /// Reward the embedded app grants on success.
    #[serde(default, alias = "successRecompensaId")]
    pub success_reward_id: Option<RewardId>,
    /// Reward the embedded app grants on failure.
    #[serde(default, alias = "failureRecompensaId")]
    pub failure_reward_id: Option<RewardId>,
    /// Configuration posted to the embedded app.
    #[serde(default, alias = "rentalAppConfig")]
    pub app_config: Option<serde_json::Value>,
    /// Scene placement.
    #[serde(default)]
    pub position: Option<HotspotPosition>,
}

impl HotspotConfig {
    /// Whether the hotspot counts toward discovery.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.content_type != HotspotContentType::BackgroundMusic
    }
}

/// The decoded hotspot layout of a `3d_model` resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneConfig {
    /// Hotspots in authored order, background music included.
    pub hotspots: Vec<HotspotConfig>,
    /// Ambient audio URL, from the music hotspot or the resource-level field.
    pub background_music_url: Option<String>,
}

impl SceneConfig {
    /// Hotspots that count toward discovery.
    pub fn interactive(&self) -> impl Iterator<Item = &HotspotConfig> {
        self.hotspots.iter().filter(|h| h.is_interactive())
    }

    /// Number of hotspots that count toward discovery.
    #[must_use]
    pub fn interactive_count(&self) -> usize {
        self.interactive().count()
    }

    /// Looks up a hotspot by mesh name.
    #[must_use]
    pub fn hotspot(&self, mesh_name: &str) -> Option<&HotspotConfig> {
        self.hotspots.iter().find(|h| h.mesh_name == mesh_name)
    }
}

/// The decoded configuration of an `app` resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppLaunchConfig {
    /// Opaque configuration forwarded to the child app.
    pub app_config: serde_json::Value,
    /// Outcome options; matched against the child's reported status.
    pub options: Vec<DecisionOption>,
}

impl Default for AppLaunchConfig {
    fn default() -> Self {
        Self {
            app_config: serde_json::Value::Object(serde_json::Map::new()),
            options: Vec::new(),
        }
    }
}

/// Kind-specific decoded metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaContent {
    /// Hotspot layout of a 3D scene.
    Scene(SceneConfig),
    /// Launch configuration of a child app.
    App(AppLaunchConfig),
    /// Metadata of any other kind, kept verbatim.
    Opaque {
        /// The raw metadata, if any.
        metadata: Option<serde_json::Value>,
    },
}

/// A media asset referenced by steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaResource {
    /// Resource identifier.
    pub id: MediaId,
    /// Asset kind.
    pub kind: MediaKind,
    /// Asset URL.
    pub file: String,
    /// Decoded metadata.
    pub content: MediaContent,
}

impl MediaResource {
    /// The hotspot layout, for `3d_model` resources.
    #[must_use]
    pub fn scene(&self) -> Option<&SceneConfig> {
        match &self.content {
            MediaContent::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    /// The launch configuration, for `app` resources.
    #[must_use]
    pub fn app(&self) -> Option<&AppLaunchConfig> {
        match &self.content {
            MediaContent::App(app) => Some(app),
            _ => None,
        }
    }
}
