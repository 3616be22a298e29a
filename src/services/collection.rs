//! Unlock Rewards
//!
//! The collectible goose catalog and the player's collection. Winning a
//! theme's round unlocks that theme's reward.

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Reward rarity, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardRarity {
    /// Common
    Common,
    /// Rare
    Rare,
    /// Epic
    Epic,
    /// Legendary
    Legendary,
}

/// A collectible in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RewardTemplate {
    /// Stable id, referenced by themes
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Flavor text
    pub description: &'static str,
    /// Rarity tier
    pub rarity: RewardRarity,
    /// How to earn it
    pub unlock_condition: &'static str,
}

const fn reward(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    rarity: RewardRarity,
    unlock_condition: &'static str,
) -> RewardTemplate {
    RewardTemplate { id, name, description, rarity, unlock_condition }
}

/// Every collectible, grouped by rarity.
pub static REWARD_CATALOG: [RewardTemplate; 11] = [
    reward("goose_fresh", "Fresh Goose", "Lives on fruit and greens",
        RewardRarity::Common, "Clear the Fresh Produce theme"),
    reward("goose_sweet", "Sweet Goose", "Cannot say no to dessert",
        RewardRarity::Common, "Clear the Sweet Treats theme"),
    reward("goose_breakfast", "Breakfast Goose", "Up early for a proper breakfast",
        RewardRarity::Common, "Clear the Breakfast Time theme"),
    reward("goose_healthy", "Fitness Goose", "Sticks to a clean diet",
        RewardRarity::Common, "Clear the Light & Healthy theme"),
    reward("goose_ocean", "Ocean Goose", "Came up from the deep, faintly salty",
        RewardRarity::Rare, "Clear the Ocean Feast theme"),
    reward("goose_juice", "Juice Goose", "Smells of fresh fruit",
        RewardRarity::Rare, "Clear the Juice Bar theme"),
    reward("goose_weekend", "Party Goose", "Hosts a party every weekend",
        RewardRarity::Rare, "Clear the Weekend Feast theme"),
    reward("goose_tropical", "Tropical Goose", "Flew in from a tropical island",
        RewardRarity::Epic, "Score 3000 or more on the Tropical Vibes theme"),
    reward("goose_golden", "Golden Goose", "Almost never seen",
        RewardRarity::Epic, "Score 10000 in a single day"),
    reward("goose_master", "Goose Master", "Only the best players catch this one",
        RewardRarity::Legendary, "Win any theme without shaking"),
    reward("goose_rainbow", "Rainbow Goose", "Glows in every color",
        RewardRarity::Legendary, "Collect every other goose"),
];

/// Look up a catalog entry.
pub fn reward_by_id(id: &str) -> Option<&'static RewardTemplate> {
    REWARD_CATALOG.iter().find(|r| r.id == id)
}

/// Catalog entries of one rarity.
pub fn rewards_by_rarity(rarity: RewardRarity) -> impl Iterator<Item = &'static RewardTemplate> {
    REWARD_CATALOG.iter().filter(move |r| r.rarity == rarity)
}

/// A reward the player owns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnlockedReward {
    /// Record id
    pub id: Uuid,
    /// Catalog id
    pub reward_id: String,
    /// Day it was unlocked
    pub unlocked_on: NaiveDate,
    /// Theme whose round unlocked it
    pub theme_id: u32,
    /// Winning score
    pub score: u32,
}

impl UnlockedReward {
    /// Catalog entry, if the id is still in the catalog.
    pub fn template(&self) -> Option<&'static RewardTemplate> {
        reward_by_id(&self.reward_id)
    }
}

/// The player's collection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionManager {
    unlocked: Vec<UnlockedReward>,
}

impl CollectionManager {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Owned rewards, in unlock order.
    pub fn unlocked(&self) -> &[UnlockedReward] {
        &self.unlocked
    }

    /// Whether a reward is owned.
    pub fn is_unlocked(&self, reward_id: &str) -> bool {
        self.unlocked.iter().any(|u| u.reward_id == reward_id)
    }

    /// Add a reward. Returns false if already owned or not in the catalog.
    pub fn unlock(&mut self, reward_id: &str, theme_id: u32, score: u32, date: NaiveDate) -> bool {
        if reward_by_id(reward_id).is_none() {
            warn!(reward_id, "Unknown reward");
            return false;
        }
        if self.is_unlocked(reward_id) {
            return false;
        }

        self.unlocked.push(UnlockedReward {
            id: Uuid::new_v4(),
            reward_id: reward_id.to_string(),
            unlocked_on: date,
            theme_id,
            score,
        });
        info!(reward_id, theme_id, score, "Reward unlocked");
        true
    }

    /// Number of owned rewards.
    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Owned fraction of the catalog.
    pub fn collection_progress(&self) -> f64 {
        self.unlocked_count() as f64 / REWARD_CATALOG.len() as f64
    }

    /// Owned rewards of one rarity.
    pub fn count_by_rarity(&self, rarity: RewardRarity) -> usize {
        self.unlocked
            .iter()
            .filter_map(|u| u.template())
            .filter(|t| t.rarity == rarity)
            .count()
    }
}
