use serde::{Deserialize, Serialize};

use crate::items::{Inventory, Modifiers};

const CHARS_PER_WORD: f64 = 5.0;
const YEN_PER_WPM: f64 = 5.0;
const PASS_ACCURACY: u32 = 80;
const ZEN_PAYOUT_FACTOR: f64 = 0.5;

/// Why a session reached FINISHED.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The phrase was typed out (NORMAL).
    Completed,
    BossDefeated,
    TimeExpired,
    Aborted,
    /// Explicit end of a ZEN session.
    CashedOut,
}

impl FinishReason {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            FinishReason::Completed | FinishReason::BossDefeated | FinishReason::CashedOut
        )
    }
}

/// Result of a finished session, handed to the progression store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub wpm: u32,
    pub accuracy: u32,
    pub yen_payout: u64,
    pub passed: bool,
    pub boss_defeated: bool,
    pub is_zen: bool,
    pub reason: FinishReason,
    /// Charges spent during the session.
    pub consumed: Inventory,
}

/// Words per minute over `elapsed_secs`, five characters to a word.
pub fn wpm(typed_len: usize, elapsed_secs: f64) -> u32 {
    let minutes = elapsed_secs / 60.0;
    if minutes <= 0.0 {
        return 0;
    }
    ((typed_len as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

/// Percentage of typed characters that match the target position for position.
pub fn accuracy(typed: &[char], target: &[char]) -> u32 {
    if typed.is_empty() {
        return 0;
    }
    let correct = typed
        .iter()
        .zip(target.iter())
        .filter(|(t, e)| t == e)
        .count();
    ((correct as f64 / typed.len() as f64) * 100.0).floor() as u32
}

pub fn passed(reason: FinishReason, is_zen: bool, accuracy: u32) -> bool {
    reason.is_success() && (is_zen || accuracy > PASS_ACCURACY)
}

/// Everything the payout depends on.
#[derive(Debug, Clone, Copy)]
pub struct PayoutInput {
    pub wpm: u32,
    pub boss_reward: Option<u64>,
    pub is_zen: bool,
    pub heat_multiplier: f64,
    pub modifiers: Modifiers,
}

pub fn payout(input: &PayoutInput) -> u64 {
    let mut base = input.wpm as f64 * YEN_PER_WPM + input.boss_reward.unwrap_or(0) as f64;
    if input.is_zen {
        base *= ZEN_PAYOUT_FACTOR;
    }
    let total = base
        * input.modifiers.yen_multiplier
        * input.heat_multiplier
        * input.modifiers.prestige_multiplier();
    total.floor().max(0.0) as u64
}
