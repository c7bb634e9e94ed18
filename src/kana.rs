//! Kana canonicalization used for rule comparison.
//!
//! Display always uses the raw text; only matching goes through [`normalize`].

/// Long-vowel mark
pub const LONG_VOWEL: char = 'ー';

/// Moraic nasal, forbidden as a final character
pub const MORAIC_N: char = 'ん';

/// Hiragana syllables that get a char card (あ..ろ plus わ, を)
pub const HIRAGANA: &str =
    "あいうえおかきくけこさしすせそたちつてとなにぬねのはひふへほまみむめもやゆよらりるれろわを";

/// Candidate opening targets at game start
pub const OPENING_KANA: &str =
    "あいうえおかきくけこさしすせそたちつてとなにぬねのはひふへほまみむめもやゆよらりるれろ";

/// Row cards as (label, members)
pub const ROWS: [(&str, &str); 10] = [
    ("あ行", "あいうえお"),
    ("か行", "かきくけこ"),
    ("さ行", "さしすせそ"),
    ("た行", "たちつてと"),
    ("な行", "なにぬねの"),
    ("は行", "はひふへほ"),
    ("ま行", "まみむめも"),
    ("や行", "やゆよ"),
    ("ら行", "らりるれろ"),
    ("わ行", "わを"),
];

/// Map a character to its canonical comparison form.
///
/// Katakana becomes hiragana, voiced and semi-voiced marks are dropped and
/// small ゃゅょ become full size. Anything else passes through unchanged.
pub fn normalize(c: char) -> char {
    let c = match c {
        'ァ'..='ン' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
        'ヵ' => 'か',
        'ヶ' => 'け',
        'ヴ' => 'う',
        _ => c,
    };

    match c {
        'が' => 'か',
        'ぎ' => 'き',
        'ぐ' => 'く',
        'げ' => 'け',
        'ご' => 'こ',
        'ざ' => 'さ',
        'じ' => 'し',
        'ず' => 'す',
        'ぜ' => 'せ',
        'ぞ' => 'そ',
        'だ' => 'た',
        'ぢ' => 'ち',
        'づ' => 'つ',
        'で' => 'て',
        'ど' => 'と',
        'ば' | 'ぱ' => 'は',
        'び' | 'ぴ' => 'ひ',
        'ぶ' | 'ぷ' => 'ふ',
        'べ' | 'ぺ' => 'へ',
        'ぼ' | 'ぽ' => 'ほ',
        'ゃ' => 'や',
        'ゅ' => 'ゆ',
        'ょ' => 'よ',
        other => other,
    }
}

/// Character a word is matched by at its end.
///
/// A trailing long-vowel mark defers to the character before it, taken as-is
/// (たー resolves to た, not to its vowel).
pub fn effective_last_char(word: &str) -> Option<char> {
    let mut chars = word.chars().rev();
    let last = chars.next()?;
    if last == LONG_VOWEL {
        Some(chars.next().unwrap_or(last))
    } else {
        Some(last)
    }
}

/// Normalized equality of two characters
pub fn same_kana(a: char, b: char) -> bool {
    normalize(a) == normalize(b)
}
