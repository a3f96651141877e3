use crate::combo::ComboMeter;

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    /// A mismatch absorbed by a proxy shield charge.
    Blocked,
    Wrong,
}

impl Verdict {
    pub fn is_mismatch(&self) -> bool {
        !matches!(self, Verdict::Correct)
    }

    /// Applies the verdict's heat/streak deltas to `meter`.
    pub fn apply(&self, meter: &mut ComboMeter) {
        match self {
            Verdict::Correct => meter.on_correct(),
            Verdict::Blocked => {}
            Verdict::Wrong => meter.on_mistake(),
        }
    }
}

/// Judges one keystroke. Consuming the shield charge on `Blocked` is the
/// caller's job.
pub fn judge(typed: char, expected: char, shield_available: bool) -> Verdict {
    if typed == expected {
        Verdict::Correct
    } else if shield_available {
        Verdict::Blocked
    } else {
        Verdict::Wrong
    }
}

/// Character expected after `typed_len` characters, cycling through the target.
pub fn expected_char(target: &[char], typed_len: usize) -> Option<char> {
    if target.is_empty() {
        return None;
    }
    Some(target[typed_len % target.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_match_is_correct_regardless_of_shield() {
        assert_matches!(judge('a', 'a', false), Verdict::Correct);
        assert_matches!(judge('a', 'a', true), Verdict::Correct);
    }

    #[test]
    fn test_mismatch_with_shield_is_blocked() {
        assert_matches!(judge('x', 'a', true), Verdict::Blocked);
    }

    #[test]
    fn test_mismatch_without_shield_is_wrong() {
        assert_matches!(judge('x', 'a', false), Verdict::Wrong);
        assert!(Verdict::Wrong.is_mismatch());
        assert!(Verdict::Blocked.is_mismatch());
        assert!(!Verdict::Correct.is_mismatch());
    }

    #[test]
    fn test_case_matters() {
        assert_matches!(judge('A', 'a', false), Verdict::Wrong);
    }

    #[test]
    fn test_apply_deltas() {
        let mut meter = ComboMeter::with(12, 7);

        Verdict::Blocked.apply(&mut meter);
        assert_eq!((meter.heat(), meter.streak()), (12, 7));

        Verdict::Correct.apply(&mut meter);
        assert_eq!((meter.heat(), meter.streak()), (13, 8));

        Verdict::Wrong.apply(&mut meter);
        assert_eq!((meter.heat(), meter.streak()), (0, 0));
    }

    #[test]
    fn test_expected_char_wraps() {
        let target: Vec<char> = "abc".chars().collect();

        assert_eq!(expected_char(&target, 0), Some('a'));
        assert_eq!(expected_char(&target, 2), Some('c'));
        assert_eq!(expected_char(&target, 3), Some('a'));
        assert_eq!(expected_char(&[], 0), None);
    }
}
