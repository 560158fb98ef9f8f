/// Up to two uppercase initials from a display name, `"?"` when empty.
pub fn initials(name: &str) -> String {
    let letters = name
        .split_whitespace()
        .filter_map(|word| word.chars().find(|ch| ch.is_alphanumeric()))
        .flat_map(char::to_uppercase)
        .take(2)
        .collect::<String>();

    if letters.is_empty() {
        "?".to_owned()
    } else {
        letters
    }
}

/// Shortens `text` to at most `max_chars` characters, ending in an ellipsis
/// when anything was cut.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut shortened = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    shortened.push('…');
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_take_the_first_two_words() {
        assert_eq!(initials("ada lovelace byron"), "AL");
        assert_eq!(initials("  Mo "), "M");
        assert_eq!(initials(""), "?");
        assert_eq!(initials("(Sam) Okoro"), "SO");
    }

    #[test]
    fn ellipsize_counts_characters() {
        assert_eq!(ellipsize("Lagos", 8), "Lagos");
        assert_eq!(ellipsize("Port Harcourt", 6), "Port …");
    }
}
