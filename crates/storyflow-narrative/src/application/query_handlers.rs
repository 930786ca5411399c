//! Query handlers for the Narrative Flow context.
//!
//! Read-only views of a session, shaped for a presentation layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use storyflow_catalog::domain::media::MediaResource;
use storyflow_catalog::domain::step::{DecisionOption, StepType};
use storyflow_core::ids::{PlayerId, SessionId, StepId, StoryId};
use storyflow_ledger::application::query_handlers::DashboardSummary;

use crate::domain::bridge::LaunchOrigin;
use crate::domain::gate::GateStatus;
use crate::domain::locks::{self, HubEntry};
use crate::domain::session::{FlowSession, SessionPhase};

/// The active story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryView {
    pub id: StoryId,
    pub title: String,
}

/// The active step with its resolved media.
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub id: StepId,
    pub step_type: StepType,
    pub content: Option<String>,
    /// `None` when the step has no media or its resource was rejected.
    pub media: Option<MediaResource>,
    pub options: Vec<DecisionOption>,
    /// Name of the character the step introduces.
    pub character: Option<String>,
}

/// Hotspot progress on a 3D step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryProgress {
    pub discovered: Vec<String>,
    pub total: usize,
    pub all_discovered: bool,
}

/// The open child-app presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppView {
    pub origin: LaunchOrigin,
    pub url: String,
    pub ready: bool,
    pub launched_at: DateTime<Utc>,
}

/// Everything a presentation layer needs to render a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub player_id: PlayerId,
    pub locale: String,
    pub phase: SessionPhase,
    pub story: Option<StoryView>,
    pub step: Option<StepView>,
    pub gate: GateStatus,
    pub overlay_visible: bool,
    pub discovery: Option<DiscoveryProgress>,
    pub app: Option<AppView>,
    pub visited_this_session: Vec<StoryId>,
    pub stats: DashboardSummary,
}

/// Every story in hub order, with completion and lock state.
#[must_use]
pub fn hub(session: &FlowSession) -> Vec<HubEntry> {
    locks::hub_listing(session.catalog(), &session.stats().visited_stories)
}

/// Renders the session's current state.
#[must_use]
pub fn view(session: &FlowSession) -> SessionView {
    let catalog = session.catalog();
    let story = session
        .active_story_id()
        .and_then(|id| catalog.story(id))
        .map(|story| StoryView {
            id: story.id,
            title: story.title.clone(),
        });
    let step = session.current_step().map(|step| StepView {
        id: step.id,
        step_type: step.step_type,
        content: step.content.clone(),
        media: session.current_media().cloned(),
        options: step.options.clone(),
        character: step
            .character_id
            .and_then(|id| catalog.character(id))
            .map(|c| c.name.clone()),
    });
    let discovery = session.current_scene().map(|_| {
        let tracker = session.tracker();
        DiscoveryProgress {
            discovered: tracker.discovered().map(str::to_owned).collect(),
            total: tracker.total_interactive(),
            all_discovered: tracker.all_discovered(),
        }
    });
    let app = session.bridge().presentation().map(|p| AppView {
        origin: p.config.origin.clone(),
        url: p.config.url.clone(),
        ready: p.ready,
        launched_at: p.launched_at,
    });

    SessionView {
        session_id: session.id(),
        player_id: session.player_id(),
        locale: session.locale().to_owned(),
        phase: session.phase(),
        story,
        step,
        gate: session.gate_status(),
        overlay_visible: session.gate().overlay_visible(),
        discovery,
        app,
        visited_this_session: session.visited_this_session().to_vec(),
        stats: DashboardSummary::from(session.stats()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use storyflow_catalog::application::cache::CatalogCache;
    use storyflow_catalog::application::cache::StepSequence;
    use storyflow_ledger::domain::stats::PlayerStats;
    use storyflow_test_support::fixtures;
    use uuid::Uuid;

    use super::*;

    fn session() -> FlowSession {
        let document = fixtures::catalog_document();
        let catalog = CatalogCache::from_records(
            document.stories,
            document.media,
            document.rewards,
            document.characters,
        );
        let player_id = PlayerId(Uuid::new_v4());
        FlowSession::new(
            SessionId::new_v7(),
            player_id,
            "en",
            Arc::new(catalog),
            PlayerStats::new(player_id),
        )
    }

    fn sequence(story_id: StoryId) -> StepSequence {
        let steps = fixtures::catalog_document()
            .steps
            .into_iter()
            .filter(|s| s.story_id == story_id.get())
            .collect();
        StepSequence::from_records(story_id, steps).unwrap()
    }

    #[test]
    fn test_hub_lists_stories_with_locks() {
        let session = session();

        let entries = hub(&session);

        assert_eq!(entries[0].story_id, fixtures::PLAZA);
        assert!(entries[0].lock.is_none());
        assert_eq!(entries[1].story_id, fixtures::TUNNELS);
        assert_eq!(entries[1].lock.as_ref().unwrap().required_story_id, fixtures::PLAZA);
        assert!(entries.iter().all(|e| !e.completed));
    }

    #[test]
    fn test_view_of_hub_session_has_no_step() {
        let session = session();

        let view = view(&session);

        assert_eq!(view.phase, SessionPhase::Hub);
        assert!(view.story.is_none());
        assert!(view.step.is_none());
        assert_eq!(view.gate, GateStatus::Open);
        assert_eq!(view.stats.level, 1);
    }

    #[test]
    fn test_view_of_scene_step_reports_discovery() {
        // Arrange
        let mut session = session();
        session.enter_story(sequence(fixtures::MARKET));
        session.tracker.discover("a");

        // Act
        let view = view(&session);

        // Assert
        assert_eq!(view.story.unwrap().title, "Market");
        let step = view.step.unwrap();
        assert_eq!(step.id, fixtures::MARKET_SCENE);
        assert_eq!(step.media.unwrap().id, fixtures::SCENE_MEDIA);
        let discovery = view.discovery.unwrap();
        assert_eq!(discovery.discovered, vec!["a".to_owned()]);
        assert_eq!(discovery.total, 2);
        assert!(view.overlay_visible);
        assert_eq!(view.gate, GateStatus::AwaitingOverlayDismissal);
    }

    #[test]
    fn test_view_serializes_app_presentation() {
        let mut session = session();
        session.enter_story(sequence(fixtures::RENTAL));
        session.bridge.launch(
            crate::domain::bridge::LaunchConfig {
                origin: LaunchOrigin::AppStep { step_id: fixtures::RENTAL_APP },
                url: "https://apps.example/rental/index.html".into(),
                app_data: "{}".into(),
                success_reward_id: None,
                failure_reward_id: None,
                options: Vec::new(),
            },
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        );

        let json = serde_json::to_value(view(&session)).unwrap();

        assert_eq!(json["app"]["origin"]["kind"], "app_step");
        assert_eq!(json["gate"], "awaiting_app_result");
        assert_eq!(json["phase"], "in_story");
    }
}
