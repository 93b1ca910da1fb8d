//! Track descriptors: the `"<name> by <artist>"` strings used as track keys.
//!
//! Search results are shown with a 1-based ordinal (`"3. Song by Artist"`);
//! the ordinal is display-only and must be stripped with [`clean`] before a
//! descriptor is played, queued or persisted.

/// Separator between the track name and the artist list.
pub const SEPARATOR: &str = " by ";

/// Strip leading `"<digits>. "` ordinals. Already-clean input is returned as is.
pub fn clean(mut text: &str) -> &str {
    loop {
        let digits = text.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return text;
        }
        match text[digits..].strip_prefix(". ") {
            Some(rest) => text = rest,
            None => return text,
        }
    }
}

/// Split a descriptor into `(name, artist)` on the last `" by "`.
///
/// Names may contain the separator themselves ("Stand by Me"); artist lists
/// built by [`format`] never do in practice. Returns `None` when either side is empty or the separator is missing.
pub fn split(descriptor: &str) -> Option<(&str, &str)> {
    let (name, artist) = clean(descriptor).rsplit_once(SEPARATOR)?;
    let (name, artist) = (name.trim(), artist.trim());
    if name.is_empty() || artist.is_empty() {
        return None;
    }
    Some((name, artist))
}

/// Build a descriptor from a track name and its artists.
pub fn format<S: AsRef<str>>(name: &str, artists: &[S]) -> String {
    let artists: Vec<&str> = artists
        .iter()
        .map(|a| a.as_ref().trim())
        .filter(|a| !a.is_empty())
        .collect();
    if artists.is_empty() {
        name.trim().to_string()
    } else {
        format!("{}{}{}", name.trim(), SEPARATOR, artists.join(", "))
    }
}

/// Prefix each entry with its 1-based ordinal.
pub fn numbered<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_leading_ordinal() {
        assert_eq!(clean("3. Song by Artist"), "Song by Artist");
        assert_eq!(clean("12. Song by Artist"), "Song by Artist");
    }

    #[test]
    fn clean_is_idempotent() {
        for s in [
            "3. Song by Artist",
            "Song by Artist",
            "1999 by Prince",
            "7.Song",
            "1. 2. Song by Artist",
            "",
        ] {
            assert_eq!(clean(clean(s)), clean(s));
        }
        assert_eq!(clean("Song by Artist"), "Song by Artist");
    }

    #[test]
    fn clean_leaves_numeric_titles_alone() {
        assert_eq!(clean("1999 by Prince"), "1999 by Prince");
        assert_eq!(clean("7.Song"), "7.Song");
        assert_eq!(clean("1. 1999 by Prince"), "1999 by Prince");
    }

    #[test]
    fn split_uses_last_separator_and_cleans() {
        assert_eq!(split("2. Hello by Adele"), Some(("Hello", "Adele")));
        assert_eq!(
            split("Stand by Me by Ben E. King"),
            Some(("Stand by Me", "Ben E. King"))
        );
        assert_eq!(split("No artist here"), None);
        assert_eq!(split(" by Someone"), None);
    }

    #[test]
    fn format_joins_artists() {
        assert_eq!(format("Song", &["A", "B"]), "Song by A, B");
        assert_eq!(format("Song", &[" A "]), "Song by A");
        assert_eq!(format::<&str>("Song", &[]), "Song");
    }

    #[test]
    fn numbered_is_one_based() {
        assert_eq!(numbered(&["a", "b"]), vec!["1. a", "2. b"]);
    }
}
