//! Text normalization shared by the parser and the alias resolver.

/// Title-case a phrase: the first letter of every alphabetic run is upper
/// case, the rest lower case. Non-letters (spaces, digits, brackets, `&`)
/// start a new run, so `"cotton(lint)"` becomes `"Cotton(Lint)"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Trim and collapse internal whitespace runs to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical display form for a state or crop phrase.
pub fn normalize_name(text: &str) -> String {
    title_case(&collapse_whitespace(text))
}
