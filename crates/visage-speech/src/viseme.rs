//! Phoneme to viseme-id mapping.
//!
//! Viseme ids follow the 22-shape convention (0 = silence/rest through
//! 20 = bilabial closure) used by the SAPI-style speech engines that feed
//! the external timeline builder, so both builders emit the same id space.

use crate::phoneme::Phoneme;

/// Default mouth-shape duration when the source gives no timing.
pub const DEFAULT_VISEME_DURATION_MS: f64 = 100.0;

/// A viseme id with its estimated duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedViseme {
    pub viseme: u32,
    pub duration_ms: f64,
}

/// Viseme id for a phonetic code. Unknown codes map to 0 (rest).
pub fn viseme_for(sound: &str) -> u32 {
    match sound {
        "AE" | "AX" | "AH" => 0,
        "AA" => 1,
        "AO" => 2,
        "EY" | "EH" | "UH" => 3,
        "ER" => 4,
        "Y" | "IY" | "IH" | "IX" => 5,
        "W" | "UW" => 6,
        "OW" => 7,
        "AW" => 8,
        "OY" => 9,
        "AY" => 10,
        "H" => 11,
        "R" => 12,
        "L" => 13,
        "S" | "Z" => 14,
        "SH" | "CH" | "JH" | "ZH" => 15,
        "TH" | "DH" => 16,
        "F" | "V" => 17,
        "D" | "T" | "N" => 18,
        "K" | "G" | "NG" => 19,
        "P" | "B" | "M" => 20,
        _ => 0,
    }
}

/// Map one phoneme to a timed viseme. Pauses become the rest shape for
/// their own duration.
pub fn map_phoneme(p: &Phoneme) -> TimedViseme {
    match p {
        Phoneme::Sound(s) => TimedViseme {
            viseme: viseme_for(s),
            duration_ms: DEFAULT_VISEME_DURATION_MS,
        },
        Phoneme::Pause { ms } => TimedViseme {
            viseme: 0,
            duration_ms: *ms as f64,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilabials_share_a_shape() {
        assert_eq!(viseme_for("P"), 20);
        assert_eq!(viseme_for("B"), 20);
        assert_eq!(viseme_for("M"), 20);
    }

    #[test]
    fn unknown_code_is_rest() {
        assert_eq!(viseme_for("XYZ"), 0);
    }

    #[test]
    fn pause_keeps_its_duration() {
        let tv = map_phoneme(&Phoneme::Pause { ms: 700 });
        assert_eq!(tv.viseme, 0);
        assert_eq!(tv.duration_ms, 700.0);
    }
}
