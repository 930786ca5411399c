//! The Reward Ledger service.
//!
//! Every operation is load, mutate, version-checked write, then broadcast.
//! The returned [`PlayerStats`] is the state that was persisted; on error
//! nothing was written and nothing is broadcast.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use storyflow_catalog::application::cache::CatalogCache;
use storyflow_core::clock::Clock;
use storyflow_core::error::DomainError;
use storyflow_core::event::EventMetadata;
use storyflow_core::ids::{CharacterId, PlayerId, RewardId, StoryId};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::application::notifier::StatsNotifier;
use crate::application::ports::PlayerStateStore;
use crate::domain::events::{
    AchievementUnlocked, CharacterKnown, LedgerEvent, LedgerEventKind, LocationVisited,
    RewardGranted, StoryCompleted, StoryVisited, XpApplied,
};
use crate::domain::stats::{InventoryItem, PlayerStats};

/// XP awarded the first time a story is completed.
pub const DEFAULT_COMPLETION_XP: i64 = 25;

/// XP awarded the first time a location is visited.
pub const LOCATION_VISIT_XP: i64 = 50;

/// How [`RewardLedger::grant_reward`] treats the surrounding story.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrantOptions {
    /// Story the grant happens in.
    pub story_id: Option<StoryId>,
    /// Also add `story_id` to the visited set.
    pub mark_story_visited: bool,
    /// Fold the reward's own XP value into the total.
    pub apply_reward_xp: bool,
}

/// Outcome of [`RewardLedger::complete_story`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryCompletion {
    /// Stats after the call.
    pub stats: PlayerStats,
    /// `false` when the story had already been completed.
    pub first_completion: bool,
}

/// Applies XP and grants to player profiles.
#[derive(Clone)]
pub struct RewardLedger {
    store: Arc<dyn PlayerStateStore>,
    clock: Arc<dyn Clock>,
    notifier: StatsNotifier,
    completion_xp: i64,
}

impl std::fmt::Debug for RewardLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardLedger")
            .field("completion_xp", &self.completion_xp)
            .finish_non_exhaustive()
    }
}

impl RewardLedger {
    #[must_use]
    pub fn new(
        store: Arc<dyn PlayerStateStore>,
        clock: Arc<dyn Clock>,
        notifier: StatsNotifier,
    ) -> Self {
        Self {
            store,
            clock,
            notifier,
            completion_xp: DEFAULT_COMPLETION_XP,
        }
    }

    /// Overrides the story completion bonus.
    #[must_use]
    pub fn with_completion_xp(mut self, completion_xp: i64) -> Self {
        self.completion_xp = completion_xp;
        self
    }

    #[must_use]
    pub fn notifier(&self) -> &StatsNotifier {
        &self.notifier
    }

    /// Re-fetches a player's stats. A player never written gets a fresh profile.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read fails.
    pub async fn stats(&self, player_id: PlayerId) -> Result<PlayerStats, DomainError> {
        Ok(self
            .store
            .get_player_stats(player_id)
            .await?
            .unwrap_or_else(|| PlayerStats::new(player_id)))
    }

    /// Adds a signed XP delta and recomputes the level. A zero delta writes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read or the write fails.
    #[instrument(skip(self), fields(player_id = %player_id))]
    pub async fn apply_xp_delta(
        &self,
        player_id: PlayerId,
        delta: i64,
        reason: &str,
        correlation_id: Uuid,
    ) -> Result<PlayerStats, DomainError> {
        self.mutate(player_id, correlation_id, |stats, _| {
            if delta == 0 {
                return Vec::new();
            }
            stats.apply_xp(delta);
            vec![xp_applied(stats, delta, reason)]
        })
        .await
    }

    /// Grants a catalog reward: merges the inventory row, optionally applies
    /// the reward's XP and marks the story visited, all in one write.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the reward is not in the catalog, or
    /// the store's error if the read or the write fails.
    #[instrument(skip(self, catalog), fields(player_id = %player_id, reward_id = %reward_id))]
    pub async fn grant_reward(
        &self,
        player_id: PlayerId,
        catalog: &CatalogCache,
        reward_id: RewardId,
        options: GrantOptions,
        correlation_id: Uuid,
    ) -> Result<PlayerStats, DomainError> {
        let reward = catalog
            .reward(reward_id)
            .ok_or_else(|| DomainError::not_found("reward", reward_id))?;

        self.mutate(player_id, correlation_id, |stats, now| {
            let mut events = Vec::new();
            if options.apply_reward_xp && reward.xp_value != 0 {
                stats.apply_xp(reward.xp_value);
                events.push(xp_applied(
                    stats,
                    reward.xp_value,
                    &format!("reward:{reward_id}"),
                ));
            }
            let quantity = stats.add_item(InventoryItem {
                reward_id,
                name: reward.name.clone(),
                description: reward.description.clone(),
                kind: reward.kind.clone(),
                quantity: 1,
                story_id: options.story_id.or(reward.origin_story_id),
                acquired_at: now,
            });
            events.push(LedgerEventKind::RewardGranted(RewardGranted {
                reward_id,
                quantity,
                story_id: options.story_id,
            }));
            if options.mark_story_visited
                && let Some(story_id) = options.story_id
                && stats.mark_story_visited(story_id)
            {
                events.push(LedgerEventKind::StoryVisited(StoryVisited { story_id }));
            }
            events
        })
        .await
    }

    /// Adds a story to the visited set without completing it.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read or the write fails.
    #[instrument(skip(self), fields(player_id = %player_id, story_id = %story_id))]
    pub async fn mark_story_visited(
        &self,
        player_id: PlayerId,
        story_id: StoryId,
        correlation_id: Uuid,
    ) -> Result<PlayerStats, DomainError> {
        self.mutate(player_id, correlation_id, |stats, _| {
            if stats.mark_story_visited(story_id) {
                vec![LedgerEventKind::StoryVisited(StoryVisited { story_id })]
            } else {
                Vec::new()
            }
        })
        .await
    }

    /// Completes a story. Only the first completion counts: it marks the story
    /// visited, bumps the completed count and applies the completion bonus.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read or the write fails.
    #[instrument(skip(self), fields(player_id = %player_id, story_id = %story_id))]
    pub async fn complete_story(
        &self,
        player_id: PlayerId,
        story_id: StoryId,
        correlation_id: Uuid,
    ) -> Result<StoryCompletion, DomainError> {
        let bonus_xp = self.completion_xp;
        let mut first_completion = false;
        let stats = self
            .mutate(player_id, correlation_id, |stats, _| {
                if !stats.mark_story_visited(story_id) {
                    return Vec::new();
                }
                first_completion = true;
                stats.stories_completed += 1;
                stats.apply_xp(bonus_xp);
                let mut events = vec![LedgerEventKind::StoryCompleted(StoryCompleted {
                    story_id,
                    bonus_xp,
                })];
                if bonus_xp != 0 {
                    events.push(xp_applied(stats, bonus_xp, &format!("story:{story_id}")));
                }
                events
            })
            .await?;
        Ok(StoryCompletion {
            stats,
            first_completion,
        })
    }

    /// Records that the player has met a character.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the character is not in the
    /// catalog, or the store's error if the read or the write fails.
    #[instrument(skip(self, catalog), fields(player_id = %player_id, character_id = %character_id))]
    pub async fn mark_character_known(
        &self,
        player_id: PlayerId,
        catalog: &CatalogCache,
        character_id: CharacterId,
        correlation_id: Uuid,
    ) -> Result<PlayerStats, DomainError> {
        let character = catalog
            .character(character_id)
            .ok_or_else(|| DomainError::not_found("character", character_id))?;
        self.mutate(player_id, correlation_id, |stats, _| {
            if stats.know_character(&character.name) {
                vec![LedgerEventKind::CharacterKnown(CharacterKnown {
                    character_id,
                    name: character.name.clone(),
                })]
            } else {
                Vec::new()
            }
        })
        .await
    }

    /// Records a visit to a location. The first visit applies
    /// [`LOCATION_VISIT_XP`]; later visits change nothing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a blank location id, or the
    /// store's error if the read or the write fails.
    #[instrument(skip(self), fields(player_id = %player_id))]
    pub async fn mark_location_visited(
        &self,
        player_id: PlayerId,
        location_id: &str,
        correlation_id: Uuid,
    ) -> Result<PlayerStats, DomainError> {
        let location_id = location_id.trim();
        if location_id.is_empty() {
            return Err(DomainError::Validation("location id is empty".into()));
        }
        self.mutate(player_id, correlation_id, |stats, _| {
            if !stats.visit_location(location_id) {
                return Vec::new();
            }
            stats.apply_xp(LOCATION_VISIT_XP);
            vec![
                LedgerEventKind::LocationVisited(LocationVisited {
                    location_id: location_id.to_owned(),
                    xp: LOCATION_VISIT_XP,
                }),
                xp_applied(stats, LOCATION_VISIT_XP, &format!("location:{location_id}")),
            ]
        })
        .await
    }

    async fn mutate<F>(
        &self,
        player_id: PlayerId,
        correlation_id: Uuid,
        apply: F,
    ) -> Result<PlayerStats, DomainError>
    where
        F: FnOnce(&mut PlayerStats, DateTime<Utc>) -> Vec<LedgerEventKind>,
    {
        let mut stats = self.stats(player_id).await?;
        let expected_version = stats.version;
        let now = self.clock.now();

        let mut kinds = apply(&mut stats, now);
        if kinds.is_empty() {
            debug!("ledger mutation changed nothing");
            return Ok(stats);
        }
        kinds.extend(stats.evaluate_achievements().into_iter().map(|achievement| {
            LedgerEventKind::AchievementUnlocked(AchievementUnlocked { achievement })
        }));

        stats.version = expected_version + 1;
        self.store.put_player_stats(&stats, expected_version).await?;

        let events = kinds
            .into_iter()
            .map(|kind| LedgerEvent {
                metadata: EventMetadata {
                    event_id: Uuid::new_v4(),
                    event_type: kind.event_type().to_owned(),
                    player_id,
                    correlation_id,
                    occurred_at: now,
                },
                kind,
            })
            .collect::<Vec<_>>();
        debug!(events = events.len(), version = stats.version, "ledger mutation stored");
        self.notifier.publish(events);
        Ok(stats)
    }
}

fn xp_applied(stats: &PlayerStats, delta: i64, reason: &str) -> LedgerEventKind {
    LedgerEventKind::XpApplied(XpApplied {
        delta,
        reason: reason.to_owned(),
        xp_total: stats.xp_total,
        level: stats.level,
    })
}
