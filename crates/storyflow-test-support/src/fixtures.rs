//! A fixture catalog covering every step type and media gate.
//!
//! | Story | Steps |
//! |---|---|
//! | 1 Plaza | 10 narrative (character 3, reward 9) → 11 decision {go: 12, stay: 13 (reward 7)}; 12 final → story 99; 13 final |
//! | 99 Tunnels | depends on 1; 990 narrative → 995 (dangling) |
//! | 2 Market | 20 narrative on 3D scene 5 {a, b, music} → 21 final |
//! | 3 Rental | 30 app (media 6: success → 31 with reward 8, failure → 32); 31, 32 narrative ends |
//! | 4 Cinema | 40 narrative on video 1 → 41 decision on audio 2 {left: 42, right: 43}; 42, 43 final |
//! | 5 Broken | 50 narrative on malformed media 8 → 51 final |
//! | 6 Kiosk | 60 decision on 3D scene 7 {kiosk: interactive} {success: 61, failure: 62}; 61, 62 final |

use serde_json::json;
use storyflow_catalog::application::yaml_source::CatalogDocument;
use storyflow_core::ids::{CharacterId, MediaId, RewardId, StepId, StoryId};

pub const PLAZA: StoryId = StoryId(1);
pub const TUNNELS: StoryId = StoryId(99);
pub const MARKET: StoryId = StoryId(2);
pub const RENTAL: StoryId = StoryId(3);
pub const CINEMA: StoryId = StoryId(4);
pub const BROKEN: StoryId = StoryId(5);
pub const KIOSK: StoryId = StoryId(6);

pub const PLAZA_INTRO: StepId = StepId(10);
pub const PLAZA_CHOICE: StepId = StepId(11);
pub const PLAZA_GO: StepId = StepId(12);
pub const PLAZA_STAY: StepId = StepId(13);
pub const TUNNELS_ENTRY: StepId = StepId(990);
pub const TUNNELS_DANGLING: StepId = StepId(995);
pub const MARKET_SCENE: StepId = StepId(20);
pub const MARKET_END: StepId = StepId(21);
pub const RENTAL_APP: StepId = StepId(30);
pub const RENTAL_SUCCESS: StepId = StepId(31);
pub const RENTAL_FAILURE: StepId = StepId(32);
pub const CINEMA_VIDEO: StepId = StepId(40);
pub const CINEMA_CHOICE: StepId = StepId(41);
pub const CINEMA_LEFT: StepId = StepId(42);
pub const BROKEN_ENTRY: StepId = StepId(50);
pub const KIOSK_SCENE: StepId = StepId(60);
pub const KIOSK_SUCCESS: StepId = StepId(61);
pub const KIOSK_FAILURE: StepId = StepId(62);

pub const VIDEO_MEDIA: MediaId = MediaId(1);
pub const SCENE_MEDIA: MediaId = MediaId(5);
pub const APP_MEDIA: MediaId = MediaId(6);
pub const BROKEN_MEDIA: MediaId = MediaId(8);

pub const MAP_REWARD: RewardId = RewardId(7);
pub const RECEIPT_REWARD: RewardId = RewardId(8);
pub const MARTA_TOKEN: RewardId = RewardId(9);
pub const MARTA: CharacterId = CharacterId(3);

/// XP value of [`MAP_REWARD`].
pub const MAP_REWARD_XP: i64 = 50;
/// XP value of [`RECEIPT_REWARD`].
pub const RECEIPT_REWARD_XP: i64 = 20;

/// Builds the fixture catalog.
///
/// # Panics
///
/// Panics if the fixture JSON no longer matches the catalog row shapes.
#[must_use]
pub fn catalog_document() -> CatalogDocument {
    serde_json::from_value(json!({
        "stories": [
            { "id": 1, "title": "Plaza", "order_index": 1 },
            { "id": 99, "title": "Tunnels", "order_index": 2, "dependency_story_id": 1 },
            { "id": 2, "title": "Market", "order_index": 3 },
            { "id": 3, "title": "Rental", "order_index": 4 },
            { "id": 4, "title": "Cinema", "order_index": 5 },
            { "id": 5, "title": "Broken", "order_index": 6 },
            { "id": 6, "title": "Kiosk", "order_index": 7 }
        ],
        "steps": [
            { "id": 10, "story_id": 1, "order_index": 0, "step_type": "narrative",
              "content": "The plaza at dusk.", "character_id": 3, "reward_id": 9, "next_step_id": 11 },
            { "id": 11, "story_id": 1, "order_index": 1, "step_type": "decision",
              "decision_options": { "options": [
                  { "text": "go", "next_step_id": 12 },
                  { "text": "stay", "next_step_id": 13, "reward_id": 7 }
              ]}},
            { "id": 12, "story_id": 1, "order_index": 2, "step_type": "final", "next_step_id": 99 },
            { "id": 13, "story_id": 1, "order_index": 3, "step_type": "final" },

            { "id": 990, "story_id": 99, "order_index": 0, "step_type": "narrative", "next_step_id": 995 },

            { "id": 20, "story_id": 2, "order_index": 0, "step_type": "narrative",
              "media_resource_id": 5, "next_step_id": 21 },
            { "id": 21, "story_id": 2, "order_index": 1, "step_type": "final" },

            { "id": 30, "story_id": 3, "order_index": 0, "step_type": "app", "media_resource_id": 6 },
            { "id": 31, "story_id": 3, "order_index": 1, "step_type": "narrative", "content": "Rented." },
            { "id": 32, "story_id": 3, "order_index": 2, "step_type": "narrative", "content": "No luck." },

            { "id": 40, "story_id": 4, "order_index": 0, "step_type": "narrative",
              "media_resource_id": 1, "next_step_id": 41 },
            { "id": 41, "story_id": 4, "order_index": 1, "step_type": "decision", "media_resource_id": 2,
              "decision_options": [
                  { "texto": "left", "siguiente_paso_id": 42 },
                  { "texto": "right", "siguiente_paso_id": 43 }
              ]},
            { "id": 42, "story_id": 4, "order_index": 2, "step_type": "final" },
            { "id": 43, "story_id": 4, "order_index": 3, "step_type": "final" },

            { "id": 50, "story_id": 5, "order_index": 0, "step_type": "narrative",
              "media_resource_id": 8, "next_step_id": 51 },
            { "id": 51, "story_id": 5, "order_index": 1, "step_type": "final" },

            { "id": 60, "story_id": 6, "order_index": 0, "step_type": "decision", "media_resource_id": 7,
              "decision_options": "{\"opciones_siguientes_json\":[{\"texto\":\"success\",\"siguiente_paso_id\":61},{\"texto\":\"failure\",\"siguiente_paso_id\":62}]}" },
            { "id": 61, "story_id": 6, "order_index": 1, "step_type": "final" },
            { "id": 62, "story_id": 6, "order_index": 2, "step_type": "final" }
        ],
        "media": [
            { "id": 1, "kind": "video", "file": "intro.mp4" },
            { "id": 2, "kind": "audio", "file": "choice.mp3" },
            { "id": 5, "kind": "3d_model", "file": "market.glb", "metadata": [
                { "meshName": "a", "contentType": "image", "title": "Mural", "url": "mural.png", "recompensaId": 7 },
                { "meshName": "b", "contentType": "video", "title": "Vendor", "url": "vendor.mp4", "personajeId": 3 },
                { "meshName": "music", "contentType": "backgroundMusic", "url": "theme.mp3" }
            ]},
            { "id": 6, "kind": "app", "file": "https://apps.example/rental/index.html",
              "metadata": "{\"appConfig\":{\"price\":40},\"flowConfig\":{\"opciones_siguientes_json\":[{\"texto\":\"success\",\"siguiente_paso_id\":31,\"recompensaId\":8},{\"texto\":\"failure\",\"siguiente_paso_id\":32}]}}" },
            { "id": 7, "kind": "3d_model", "file": "kiosk.glb", "metadata": { "hotspots": [
                { "meshName": "kiosk", "contentType": "interactive", "title": "Kiosk",
                  "url": "https://apps.example/kiosk/index.html",
                  "rentalAppConfig": { "stock": 3 }, "successRecompensaId": 8, "failureRecompensaId": 0 }
            ]}},
            { "id": 8, "kind": "3d_model", "file": "broken.glb", "metadata": [
                { "meshName": "x", "contentType": "image" },
                { "meshName": "x", "contentType": "audio" }
            ]}
        ],
        "rewards": [
            { "id": 7, "name": "Old map", "kind": "item", "value": 50, "origin_story_id": 1 },
            { "id": 8, "name": "Rental receipt", "kind": "item", "value": 20 },
            { "id": 9, "name": "Marta's token", "kind": "character", "value": 0 }
        ],
        "characters": [
            { "id": 3, "name": "Marta", "description": "Runs the market stall." }
        ]
    }))
    .expect("fixture catalog matches the row shapes")
}
