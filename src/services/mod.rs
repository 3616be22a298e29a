//! Collaborator Services
//!
//! Contracts for everything around the round: presentation, audio and
//! haptics, persistence, rewards and settings. Each ships a null or
//! in-memory implementation; hosts inject their own.

pub mod effects;
pub mod scene;
pub mod records;
pub mod collection;
pub mod settings;

pub use effects::{EffectSink, SoundEffect, HapticStyle, NullEffects, RecordingEffects, dispatch_effect};
pub use scene::{ScenePresenter, NullScene, RecordingScene, present_events};
pub use records::{RecordStore, MemoryRecordStore, DailyRecord, PlayerProfile, GameStatistics};
pub use collection::{CollectionManager, RewardRarity, RewardTemplate, REWARD_CATALOG};
pub use settings::GameSettings;
