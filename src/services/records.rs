//! Persistence Contract
//!
//! Plain record values and the store the session reports results to. The
//! round never reads from the store; only the host does.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Days, NaiveDate};
use serde::{Serialize, Deserialize};
use tracing::debug;
use uuid::Uuid;

use crate::services::collection::CollectionManager;

// =============================================================================
// RECORDS
// =============================================================================

/// Best results for one day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Record id
    pub id: Uuid,
    /// Calendar day
    pub date: NaiveDate,
    /// Theme played that day
    pub theme_id: u32,
    /// Best score
    pub best_score: u32,
    /// Rounds finished
    pub attempts: u32,
    /// Most seconds left on a finished round
    pub best_time_remaining: u32,
    /// Only one round finished so far
    pub first_time_played: bool,
}

impl DailyRecord {
    /// Empty record.
    pub fn new(date: NaiveDate, theme_id: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            theme_id,
            best_score: 0,
            attempts: 0,
            best_time_remaining: 0,
            first_time_played: true,
        }
    }

    /// Fold in a finished round.
    pub fn record_attempt(&mut self, score: u32, time_remaining: u32) {
        self.attempts += 1;
        self.best_score = self.best_score.max(score);
        self.best_time_remaining = self.best_time_remaining.max(time_remaining);
        if self.attempts > 1 {
            self.first_time_played = false;
        }
    }
}

/// Lifetime player totals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Rounds finished
    pub total_games_played: u32,
    /// Rewards unlocked
    pub total_rewards_unlocked: u32,
    /// Best single-round score
    pub highest_score: u32,
    /// Shortest winning round (seconds)
    pub fastest_win: Option<u32>,
    /// Seconds spent in rounds
    pub total_play_time: u64,
    /// First launch
    pub first_launch_date: Option<NaiveDate>,
}

impl PlayerProfile {
    /// Raise the high score if beaten.
    pub fn update_highest_score(&mut self, score: u32) {
        self.highest_score = self.highest_score.max(score);
    }

    /// Lower the fastest win if beaten.
    pub fn update_fastest_win(&mut self, elapsed: u32) {
        self.fastest_win = Some(match self.fastest_win {
            Some(best) => best.min(elapsed),
            None => elapsed,
        });
    }
}

/// Counters for achievements.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Three-matches cleared, all time
    pub total_eliminations: u32,
    /// Shakes, all time
    pub total_shakes: u32,
    /// Wins without a single shake
    pub perfect_wins: u32,
    /// Consecutive days played
    pub consecutive_days: u32,
    /// Last day played
    pub last_play_date: Option<NaiveDate>,
}

impl GameStatistics {
    /// Count `today` toward the daily streak.
    ///
    /// Playing again on the same day keeps the streak, playing the next day
    /// extends it, and any gap restarts it at one.
    pub fn update_streak(&mut self, today: NaiveDate) {
        self.consecutive_days = match self.last_play_date {
            Some(last) if last == today => self.consecutive_days.max(1),
            Some(last) if last.checked_add_days(Days::new(1)) == Some(today) => {
                self.consecutive_days + 1
            }
            _ => 1,
        };
        self.last_play_date = Some(today);
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Where the session reports round outcomes.
pub trait RecordStore: Send {
    /// A round finished (won or lost).
    fn record_round_result(&mut self, score: u32, time_remaining: u32, theme_id: u32, date: NaiveDate);

    /// A round was won after `elapsed` seconds; `perfect` when no shake was used.
    fn record_win(&mut self, elapsed: u32, perfect: bool);

    /// Seconds spent in a finished round.
    fn record_play_time(&mut self, seconds: u32);

    /// A shake happened.
    fn record_shake(&mut self);

    /// A three-match cleared.
    fn record_elimination(&mut self);

    /// Unlock a reward. Returns false if already owned.
    fn unlock_reward(&mut self, reward_id: &str, theme_id: u32, score: u32, date: NaiveDate) -> bool;

    /// Best score for a day and theme (0 when none).
    fn best_score(&self, date: NaiveDate, theme_id: u32) -> u32;
}

/// In-memory store. Serializable as a whole for hosts that persist to disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecordStore {
    /// Lifetime totals
    pub profile: PlayerProfile,
    /// Achievement counters
    pub statistics: GameStatistics,
    /// Unlocked rewards
    pub collection: CollectionManager,
    /// Daily bests by day
    pub daily: BTreeMap<NaiveDate, DailyRecord>,
}

impl MemoryRecordStore {
    /// Fresh store; `today` becomes the first launch date.
    pub fn new(today: NaiveDate) -> Self {
        let mut store = Self::default();
        store.profile.first_launch_date = Some(today);
        store
    }

    /// Record for a day, if any.
    pub fn daily_record(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.daily.get(&date)
    }

    /// Drop daily records older than `keep_days` before `today`.
    pub fn cleanup_old_records(&mut self, today: NaiveDate, keep_days: u64) {
        let Some(cutoff) = today.checked_sub_days(Days::new(keep_days)) else {
            return;
        };
        let before = self.daily.len();
        self.daily = self.daily.split_off(&cutoff);
        debug!(removed = before - self.daily.len(), %cutoff, "Old daily records removed");
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Load from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl RecordStore for MemoryRecordStore {
    fn record_round_result(&mut self, score: u32, time_remaining: u32, theme_id: u32, date: NaiveDate) {
        let record = self
            .daily
            .entry(date)
            .or_insert_with(|| DailyRecord::new(date, theme_id));
        if record.theme_id != theme_id {
            *record = DailyRecord::new(date, theme_id);
        }
        record.record_attempt(score, time_remaining);

        self.profile.total_games_played += 1;
        self.profile.update_highest_score(score);
        self.statistics.update_streak(date);
    }

    fn record_win(&mut self, elapsed: u32, perfect: bool) {
        self.profile.update_fastest_win(elapsed);
        if perfect {
            self.statistics.perfect_wins += 1;
        }
    }

    fn record_play_time(&mut self, seconds: u32) {
        self.profile.total_play_time += u64::from(seconds);
    }

    fn record_shake(&mut self) {
        self.statistics.total_shakes += 1;
    }

    fn record_elimination(&mut self) {
        self.statistics.total_eliminations += 1;
    }

    fn unlock_reward(&mut self, reward_id: &str, theme_id: u32, score: u32, date: NaiveDate) -> bool {
        let unlocked = self.collection.unlock(reward_id, theme_id, score, date);
        if unlocked {
            self.profile.total_rewards_unlocked += 1;
        }
        unlocked
    }

    fn best_score(&self, date: NaiveDate, theme_id: u32) -> u32 {
        self.daily
            .get(&date)
            .filter(|r| r.theme_id == theme_id)
            .map_or(0, |r| r.best_score)
    }
}

fn locked<S>(store: &Mutex<S>) -> MutexGuard<'_, S> {
    store.lock().unwrap_or_else(|e| e.into_inner())
}

impl<S: RecordStore> RecordStore for Arc<Mutex<S>> {
    fn record_round_result(&mut self, score: u32, time_remaining: u32, theme_id: u32, date: NaiveDate) {
        locked(self).record_round_result(score, time_remaining, theme_id, date);
    }

    fn record_win(&mut self, elapsed: u32, perfect: bool) {
        locked(self).record_win(elapsed, perfect);
    }

    fn record_play_time(&mut self, seconds: u32) {
        locked(self).record_play_time(seconds);
    }

    fn record_shake(&mut self) {
        locked(self).record_shake();
    }

    fn record_elimination(&mut self) {
        locked(self).record_elimination();
    }

    fn unlock_reward(&mut self, reward_id: &str, theme_id: u32, score: u32, date: NaiveDate) -> bool {
        locked(self).unlock_reward(reward_id, theme_id, score, date)
    }

    fn best_score(&self, date: NaiveDate, theme_id: u32) -> u32 {
        locked(self).best_score(date, theme_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_record_attempt() {
        let mut record = DailyRecord::new(day(1), 0);
        record.record_attempt(500, 30);
        assert!(record.first_time_played);
        record.record_attempt(300, 60);
        assert_eq!(record.attempts, 2);
        assert_eq!(record.best_score, 500);
        assert_eq!(record.best_time_remaining, 60);
        assert!(!record.first_time_played);
    }

    #[test]
    fn test_streak() {
        let mut stats = GameStatistics::default();
        stats.update_streak(day(1));
        assert_eq!(stats.consecutive_days, 1);
        stats.update_streak(day(1));
        assert_eq!(stats.consecutive_days, 1);
        stats.update_streak(day(2));
        stats.update_streak(day(3));
        assert_eq!(stats.consecutive_days, 3);
        stats.update_streak(day(5));
        assert_eq!(stats.consecutive_days, 1);
    }

    #[test]
    fn test_store_round_results() {
        let mut store = MemoryRecordStore::new(day(1));
        store.record_round_result(600, 40, 2, day(1));
        store.record_round_result(800, 10, 2, day(1));
        store.record_win(80, true);
        store.record_play_time(80);
        store.record_play_time(110);

        assert_eq!(store.best_score(day(1), 2), 800);
        assert_eq!(store.best_score(day(1), 3), 0);
        assert_eq!(store.profile.total_games_played, 2);
        assert_eq!(store.profile.highest_score, 800);
        assert_eq!(store.profile.fastest_win, Some(80));
        assert_eq!(store.statistics.perfect_wins, 1);
        assert_eq!(store.profile.total_play_time, 190);
        assert_eq!(store.daily_record(day(1)).map(|r| r.attempts), Some(2));
    }

    #[test]
    fn test_unlock_counts_once() {
        let mut store = MemoryRecordStore::new(day(1));
        assert!(store.unlock_reward("goose_fresh", 0, 500, day(1)));
        assert!(!store.unlock_reward("goose_fresh", 0, 900, day(2)));
        assert_eq!(store.profile.total_rewards_unlocked, 1);
    }

    #[test]
    fn test_cleanup_old_records() {
        let mut store = MemoryRecordStore::new(day(1));
        for d in 1..=20 {
            store.record_round_result(100, 5, 0, day(d));
        }
        store.cleanup_old_records(day(20), 7);
        assert_eq!(store.daily.len(), 8);
        assert!(store.daily_record(day(12)).is_none());
        assert!(store.daily_record(day(13)).is_some());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut store = MemoryRecordStore::new(day(1));
        store.record_round_result(250, 12, 4, day(2));
        store.unlock_reward("goose_tropical", 4, 250, day(2));
        let json = store.to_json().unwrap();
        let back = MemoryRecordStore::from_json(&json).unwrap();
        assert_eq!(back, store);
    }
}
