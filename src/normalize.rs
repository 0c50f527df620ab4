//! Filename normalization.
//!
//! Turns an arbitrary file stem into a lowercase ASCII token: Cyrillic letters
//! are transliterated to Latin and everything else outside `[a-z0-9_]`
//! becomes an underscore.
//!
//! # Examples
//!
//! ```
//! use clean_folder::normalize::normalize;
//!
//! assert_eq!(normalize("Фото"), "foto");
//! assert_eq!(normalize("My Song (live)"), "my_song__live_");
//! ```

use regex::Regex;
use std::sync::LazyLock;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_]").expect("Invalid normalization pattern"));

/// Latin replacement for a lowercase Cyrillic letter.
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "h",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'є' => "ie",
        'ж' => "zh",
        'з' => "z",
        'и' => "y",
        'і' => "i",
        'ї' => "i",
        'й' => "i",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ь' => "",
        'ю' => "iu",
        'я' => "ia",
        // Russian-only letters
        'ё' => "io",
        'ъ' => "",
        'ы' => "y",
        'э' => "e",
        _ => return None,
    };
    Some(latin)
}

/// Normalizes a file stem into a safe ASCII token.
///
/// The input is lowercased, then transliterated one character at a time, so
/// the Latin output of one letter is never fed back into the table. Every
/// remaining character that is not an ASCII letter, digit or underscore is
/// replaced by a single `_`.
pub fn normalize(stem: &str) -> String {
    let mut transliterated = String::with_capacity(stem.len());
    for c in stem.to_lowercase().chars() {
        match transliterate(c) {
            Some(latin) => transliterated.push_str(latin),
            None => transliterated.push(c),
        }
    }

    NON_WORD.replace_all(&transliterated, "_").into_owned()
}
