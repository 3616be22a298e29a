//! Audio / Haptics Contract
//!
//! Fire-and-forget feedback keyed by round events. Sinks never feed back
//! into the round.

use std::sync::{Arc, Mutex};

use serde::{Serialize, Deserialize};

use crate::game::events::RoundEventKind;
use crate::services::settings::GameSettings;

/// Countdown ticks at or below this many seconds get an audible cue.
pub const COUNTDOWN_CUE_SECS: u32 = 5;

/// Sound effect identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundEffect {
    /// Item tapped into the tray
    Select,
    /// Three-match cleared
    Eliminate,
    /// Pot shaken
    Shake,
    /// Round won
    Win,
    /// Round lost
    Lose,
    /// UI button
    Button,
    /// Final seconds of the clock
    Countdown,
}

/// Haptic feedback styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticStyle {
    /// Light impact
    Light,
    /// Heavy impact
    Heavy,
    /// Soft impact
    Soft,
    /// Rigid impact
    Rigid,
    /// Success notification
    Success,
    /// Error notification
    Error,
}

impl SoundEffect {
    /// Asset key.
    pub fn key(self) -> &'static str {
        match self {
            SoundEffect::Select => "select",
            SoundEffect::Eliminate => "eliminate",
            SoundEffect::Shake => "shake",
            SoundEffect::Win => "win",
            SoundEffect::Lose => "lose",
            SoundEffect::Button => "button",
            SoundEffect::Countdown => "countdown",
        }
    }

    /// Haptic paired with this effect.
    pub fn haptic(self) -> HapticStyle {
        match self {
            SoundEffect::Select => HapticStyle::Light,
            SoundEffect::Eliminate | SoundEffect::Win => HapticStyle::Success,
            SoundEffect::Shake => HapticStyle::Heavy,
            SoundEffect::Lose => HapticStyle::Error,
            SoundEffect::Button => HapticStyle::Soft,
            SoundEffect::Countdown => HapticStyle::Rigid,
        }
    }

    /// Effect for a round event, if it has one.
    pub fn for_event(kind: &RoundEventKind) -> Option<SoundEffect> {
        match kind {
            RoundEventKind::ItemSelected { .. } => Some(SoundEffect::Select),
            RoundEventKind::Eliminated { .. } => Some(SoundEffect::Eliminate),
            RoundEventKind::Shaken { .. } => Some(SoundEffect::Shake),
            RoundEventKind::RoundWon { .. } => Some(SoundEffect::Win),
            RoundEventKind::RoundLost { .. } => Some(SoundEffect::Lose),
            RoundEventKind::TimeTick { time_remaining }
                if *time_remaining > 0 && *time_remaining <= COUNTDOWN_CUE_SECS =>
            {
                Some(SoundEffect::Countdown)
            }
            _ => None,
        }
    }
}

/// Audio and haptics output.
pub trait EffectSink: Send {
    /// Play a sound effect.
    fn play(&mut self, effect: SoundEffect);

    /// Fire a haptic.
    fn haptic(&mut self, style: HapticStyle);
}

/// Play an effect and its haptic, honoring the player's toggles.
///
/// Haptics ride on sound: muting sound silences both.
pub fn dispatch_effect(sink: &mut dyn EffectSink, effect: SoundEffect, settings: &GameSettings) {
    if !settings.sound_enabled {
        return;
    }
    sink.play(effect);
    if settings.haptic_enabled {
        sink.haptic(effect.haptic());
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEffects;

impl EffectSink for NullEffects {
    fn play(&mut self, _effect: SoundEffect) {}
    fn haptic(&mut self, _style: HapticStyle) {}
}

/// Keeps a log of what was played.
#[derive(Debug, Default, Clone)]
pub struct RecordingEffects {
    /// Effects in play order
    pub played: Vec<SoundEffect>,
    /// Haptics in fire order
    pub haptics: Vec<HapticStyle>,
}

impl EffectSink for RecordingEffects {
    fn play(&mut self, effect: SoundEffect) {
        self.played.push(effect);
    }

    fn haptic(&mut self, style: HapticStyle) {
        self.haptics.push(style);
    }
}

impl<S: EffectSink> EffectSink for Arc<Mutex<S>> {
    fn play(&mut self, effect: SoundEffect) {
        self.lock().unwrap_or_else(|e| e.into_inner()).play(effect);
    }

    fn haptic(&mut self, style: HapticStyle) {
        self.lock().unwrap_or_else(|e| e.into_inner()).haptic(style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::LossReason;

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            SoundEffect::for_event(&RoundEventKind::Shaken { shake_count: 1, moved: 3 }),
            Some(SoundEffect::Shake)
        );
        assert_eq!(
            SoundEffect::for_event(&RoundEventKind::RoundLost {
                reason: LossReason::TimeUp,
                score: 0,
                time_remaining: 0,
            }),
            Some(SoundEffect::Lose)
        );
        assert_eq!(
            SoundEffect::for_event(&RoundEventKind::TimeTick { time_remaining: 30 }),
            None
        );
        assert_eq!(
            SoundEffect::for_event(&RoundEventKind::TimeTick { time_remaining: 3 }),
            Some(SoundEffect::Countdown)
        );
    }

    #[test]
    fn test_dispatch_respects_toggles() {
        let mut sink = RecordingEffects::default();
        let mut settings = GameSettings::default();

        dispatch_effect(&mut sink, SoundEffect::Win, &settings);
        assert_eq!(sink.played, vec![SoundEffect::Win]);
        assert_eq!(sink.haptics, vec![HapticStyle::Success]);

        settings.haptic_enabled = false;
        dispatch_effect(&mut sink, SoundEffect::Select, &settings);
        assert_eq!(sink.played.len(), 2);
        assert_eq!(sink.haptics.len(), 1);

        settings.sound_enabled = false;
        settings.haptic_enabled = true;
        dispatch_effect(&mut sink, SoundEffect::Shake, &settings);
        assert_eq!(sink.played.len(), 2);
        assert_eq!(sink.haptics.len(), 1);
    }
}
