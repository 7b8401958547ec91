//! English pluralization for XML tag names
//!
//! Collection tags in CheddarGetter responses are the plural of the tag of
//! the entities they contain (`<items><item/>...</items>`), so resolving a
//! collection to an entity type means singularizing its tag.

/// Irregular forms as (singular, plural), lowercase
const IRREGULAR: &[(&str, &str)] = &[
    ("datum", "data"),
    ("person", "people"),
    ("child", "children"),
];

/// Words that are the same in both forms or already end in `s` when singular
const UNCOUNTABLE: &[&str] = &["status", "address", "series", "news"];

fn is_vowel(c: char) -> bool {
    "aeiou".contains(c)
}

/// Replace the last `suffix_len` bytes of `word` with `replacement`, keeping
/// the case of the first replaced character (`metaData` -> `metaDatum`)
fn replace_suffix(word: &str, suffix_len: usize, replacement: &str) -> String {
    let stem = &word[..word.len() - suffix_len];
    let uppercase = word[word.len() - suffix_len..]
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase());

    let mut replaced = replacement.to_string();
    if uppercase {
        if let Some(first) = replaced.get(..1) {
            replaced = format!("{}{}", first.to_uppercase(), &replaced[1..]);
        }
    }
    format!("{}{}", stem, replaced)
}

fn char_before(lower: &str, suffix_len: usize) -> Option<char> {
    lower[..lower.len() - suffix_len].chars().last()
}

/// Convert a name to its plural form using English grammar rules
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return word.to_string();
    }

    let lower = word.to_lowercase();

    for (singular, plural) in IRREGULAR {
        if lower.ends_with(singular) {
            return replace_suffix(word, singular.len(), plural);
        }
    }

    // 's', 'ss', 'sh', 'ch', 'x' -> add 'es'
    if lower.ends_with('s') || lower.ends_with("sh") || lower.ends_with("ch") || lower.ends_with('x')
    {
        return format!("{}es", word);
    }

    // consonant + 'y' -> 'ies'
    if lower.ends_with('y') && char_before(&lower, 1).is_some_and(|c| !is_vowel(c)) {
        return format!("{}ies", &word[..word.len() - 1]);
    }

    if lower.ends_with("fe") {
        return format!("{}ves", &word[..word.len() - 2]);
    }
    if lower.ends_with('f') {
        return format!("{}ves", &word[..word.len() - 1]);
    }

    // consonant + 'o' -> add 'es'
    if lower.ends_with('o') && char_before(&lower, 1).is_some_and(|c| !is_vowel(c)) {
        return format!("{}es", word);
    }

    format!("{}s", word)
}

/// Convert a plural name back to its singular form
///
/// Words that do not look plural are returned unchanged, so singularizing a
/// tag that already names a single entity (`gatewayAccount`) is harmless.
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return word.to_string();
    }

    let lower = word.to_lowercase();

    for (singular, plural) in IRREGULAR {
        if lower.ends_with(plural) {
            return replace_suffix(word, plural.len(), singular);
        }
        if lower.ends_with(singular) {
            return word.to_string();
        }
    }

    if UNCOUNTABLE.iter().any(|u| lower.ends_with(u)) {
        return word.to_string();
    }

    if lower.ends_with("ies") && lower.len() > 3 {
        return replace_suffix(word, 3, "y");
    }

    if lower.ends_with("ives") {
        return replace_suffix(word, 3, "fe");
    }
    if lower.ends_with("ves") && lower.len() > 3 {
        return replace_suffix(word, 3, "f");
    }

    if lower.ends_with("sses")
        || lower.ends_with("shes")
        || lower.ends_with("ches")
        || lower.ends_with("xes")
    {
        return word[..word.len() - 2].to_string();
    }

    // consonant + 'oes' -> 'o'
    if lower.ends_with("oes") && char_before(&lower, 3).is_some_and(|c| !is_vowel(c)) {
        return word[..word.len() - 2].to_string();
    }

    if lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") {
        return word[..word.len() - 1].to_string();
    }

    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(pluralize("customer"), "customers");
        assert_eq!(pluralize("plan"), "plans");
        assert_eq!(pluralize("subscription"), "subscriptions");
    }

    #[test]
    fn test_s_sh_ch_x_endings() {
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("batch"), "batches");
        assert_eq!(pluralize("tax"), "taxes");
    }

    #[test]
    fn test_y_f_o_endings() {
        assert_eq!(pluralize("company"), "companies");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("leaf"), "leaves");
        assert_eq!(pluralize("knife"), "knives");
        assert_eq!(pluralize("hero"), "heroes");
        assert_eq!(pluralize("video"), "videos");
    }

    #[test]
    fn test_irregular_keeps_camel_case() {
        assert_eq!(pluralize("metaDatum"), "metaData");
        assert_eq!(singularize("metaData"), "metaDatum");
        assert_eq!(singularize("people"), "person");
    }

    #[test]
    fn test_singularize_collection_tags() {
        assert_eq!(singularize("items"), "item");
        assert_eq!(singularize("plans"), "plan");
        assert_eq!(singularize("invoices"), "invoice");
        assert_eq!(singularize("charges"), "charge");
        assert_eq!(singularize("companies"), "company");
        assert_eq!(singularize("batches"), "batch");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("knives"), "knife");
        assert_eq!(singularize("leaves"), "leaf");
        assert_eq!(singularize("heroes"), "hero");
    }

    #[test]
    fn test_singularize_leaves_singular_words_alone() {
        assert_eq!(singularize("gatewayAccount"), "gatewayAccount");
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("address"), "address");
        assert_eq!(singularize("metaDatum"), "metaDatum");
        assert_eq!(singularize(""), "");
    }
}
