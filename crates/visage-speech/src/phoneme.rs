//! Heuristic grapheme-to-phoneme pass for the local timeline builder.
//!
//! This is lip-sync-grade phonetics, not linguistics: each word is reduced to
//! a rough consonant/vowel code sequence good enough to pick mouth shapes.
//! Punctuation and whitespace become explicit pauses with their own
//! durations so sentence rhythm survives into the viseme stream.

/// One unit of the estimated speech stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phoneme {
    /// A rough phonetic code, uppercase ("SH", "AA", "K", ...).
    Sound(&'static str),
    /// Silence, in milliseconds.
    Pause { ms: u32 },
}

/// Pause length for a non-letter character.
pub fn pause_for_char(c: char) -> u32 {
    match c {
        ' ' => 500,
        ',' => 300,
        '.' | '!' | '?' => 700,
        _ => 100,
    }
}

/// Reduce text to a phoneme/pause sequence. Whitespace runs collapse to a
/// single word-boundary pause; punctuation keeps its own pause length.
pub fn extract_phonemes(text: &str) -> Vec<Phoneme> {
    let mut out = Vec::new();
    let mut word = String::new();
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if pending_space {
                if !out.is_empty() {
                    out.push(Phoneme::Pause {
                        ms: pause_for_char(' '),
                    });
                }
                pending_space = false;
            }
            word.push(c);
            continue;
        }

        flush_word(&mut word, &mut out);
        if c.is_whitespace() {
            pending_space = true;
        } else {
            out.push(Phoneme::Pause {
                ms: pause_for_char(c),
            });
        }
    }
    flush_word(&mut word, &mut out);
    out
}

fn flush_word(word: &mut String, out: &mut Vec<Phoneme>) {
    if !word.is_empty() {
        out.extend(word_sounds(word).into_iter().map(Phoneme::Sound));
        word.clear();
    }
}

/// Rough phonetic codes for one word. Digraphs are consumed before single
/// letters; doubled letters collapse.
pub fn word_sounds(word: &str) -> Vec<&'static str> {
    let chars: Vec<char> = word.chars().flat_map(|c| c.to_lowercase()).collect();
    let mut sounds = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if next == Some(c) {
            // "ll", "ss": one sound.
            i += 1;
            continue;
        }

        if let Some(n) = next {
            if let Some(codes) = digraph(c, n) {
                sounds.extend_from_slice(codes);
                i += 2;
                continue;
            }
        }

        if let Some(codes) = single(c, next) {
            sounds.extend_from_slice(codes);
        }
        i += 1;
    }
    sounds
}

fn digraph(a: char, b: char) -> Option<&'static [&'static str]> {
    Some(match (a, b) {
        ('s', 'h') => &["SH"],
        ('c', 'h') => &["CH"],
        ('t', 'h') => &["TH"],
        ('p', 'h') => &["F"],
        ('n', 'g') => &["NG"],
        ('w', 'h') => &["W"],
        ('c', 'k') => &["K"],
        ('q', 'u') => &["K", "W"],
        _ => return None,
    })
}

fn single(c: char, next: Option<char>) -> Option<&'static [&'static str]> {
    let soft = matches!(next, Some('e' | 'i' | 'y'));
    Some(match c {
        'a' => &["AA"],
        'e' => &["EH"],
        'i' => &["IH"],
        'o' => &["OW"],
        'u' => &["UW"],
        'y' => &["IY"],
        'b' => &["B"],
        'c' if soft => &["S"],
        'c' | 'k' | 'q' => &["K"],
        'd' => &["D"],
        'f' => &["F"],
        'g' if soft => &["JH"],
        'g' => &["G"],
        'h' => &["H"],
        'j' => &["JH"],
        'l' => &["L"],
        'm' => &["M"],
        'n' => &["N"],
        'p' => &["P"],
        'r' => &["R"],
        's' => &["S"],
        't' => &["T"],
        'v' => &["V"],
        'w' => &["W"],
        'x' => &["K", "S"],
        'z' => &["Z"],
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digraphs_take_precedence() {
        assert_eq!(word_sounds("ship"), vec!["SH", "IH", "P"]);
        assert_eq!(word_sounds("thing"), vec!["TH", "IH", "NG"]);
        assert_eq!(word_sounds("phone"), vec!["F", "OW", "N", "EH"]);
    }

    #[test]
    fn doubled_letters_collapse() {
        assert_eq!(word_sounds("hello"), vec!["H", "EH", "L", "OW"]);
    }

    #[test]
    fn soft_c_and_g() {
        assert_eq!(word_sounds("cell"), vec!["S", "EH", "L"]);
        assert_eq!(word_sounds("cat"), vec!["K", "AA", "T"]);
        assert_eq!(word_sounds("gem"), vec!["JH", "EH", "M"]);
    }

    #[test]
    fn punctuation_becomes_pauses() {
        let ph = extract_phonemes("hi, yes.");
        assert!(ph.contains(&Phoneme::Pause { ms: 300 }));
        assert!(ph.contains(&Phoneme::Pause { ms: 700 }));
        assert!(ph.contains(&Phoneme::Pause { ms: 500 }));
    }

    #[test]
    fn no_leading_pause() {
        let ph = extract_phonemes("  hi");
        assert!(matches!(ph.first(), Some(Phoneme::Sound(_))));
    }
}
