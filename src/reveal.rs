use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SCRAMBLE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789#@&%";
const FRAME_SECS: f64 = 0.03;
const CHARS_PER_FRAME: usize = 2;

/// Cosmetic "decryption" of a freshly loaded phrase: unrevealed characters
/// show as random glyphs until the reveal front sweeps past them.
///
/// Nothing here is read by scoring; the session always judges against its
/// own target text.
#[derive(Debug, Clone)]
pub struct Reveal {
    target: Vec<char>,
    revealed: usize,
    carry: f64,
    rng: StdRng,
}

impl Reveal {
    pub fn new(target: &str, seed: u64) -> Self {
        Self {
            target: target.chars().collect(),
            revealed: 0,
            carry: 0.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A reveal that starts out complete.
    pub fn finished(target: &str) -> Self {
        let mut reveal = Self::new(target, 0);
        reveal.revealed = reveal.target.len();
        reveal
    }

    pub fn restart(&mut self, target: &str) {
        self.target = target.chars().collect();
        self.revealed = 0;
        self.carry = 0.0;
    }

    pub fn advance(&mut self, delta_secs: f64) {
        if self.is_done() || delta_secs <= 0.0 {
            return;
        }
        self.carry += delta_secs;
        let frames = (self.carry / FRAME_SECS).floor();
        self.carry -= frames * FRAME_SECS;
        self.revealed = (self.revealed + frames as usize * CHARS_PER_FRAME).min(self.target.len());
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.target.len()
    }

    /// Current display buffer. Spaces are never scrambled so word shapes stay visible.
    pub fn display(&mut self) -> String {
        let revealed = self.revealed;
        let rng = &mut self.rng;
        self.target
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                if i < revealed || c == ' ' {
                    c
                } else {
                    SCRAMBLE_CHARS[rng.gen_range(0..SCRAMBLE_CHARS.len())] as char
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reveal_is_scrambled() {
        let mut reveal = Reveal::new("hello world", 3);

        assert!(!reveal.is_done());
        let shown = reveal.display();
        assert_eq!(shown.chars().count(), 11);
        assert_eq!(shown.chars().nth(5), Some(' '));
        assert!(shown.chars().all(|c| c == ' ' || SCRAMBLE_CHARS.contains(&(c as u8))));
    }

    #[test]
    fn test_advance_reveals_two_chars_per_frame() {
        let mut reveal = Reveal::new("abcdefgh", 1);

        reveal.advance(0.031);
        assert!(reveal.display().starts_with("ab"));

        reveal.advance(0.06);
        assert!(reveal.display().starts_with("abcdef"));
    }

    #[test]
    fn test_small_deltas_accumulate() {
        let mut reveal = Reveal::new("abcd", 1);

        for _ in 0..5 {
            reveal.advance(0.01);
        }
        assert!(reveal.display().starts_with("ab"));
    }

    #[test]
    fn test_reveal_completes() {
        let mut reveal = Reveal::new("abc", 9);

        reveal.advance(1.0);

        assert!(reveal.is_done());
        assert_eq!(reveal.display(), "abc");
    }

    #[test]
    fn test_restart_and_finished() {
        let mut reveal = Reveal::finished("done");
        assert!(reveal.is_done());
        assert_eq!(reveal.display(), "done");

        reveal.restart("again");
        assert!(!reveal.is_done());
    }
}
