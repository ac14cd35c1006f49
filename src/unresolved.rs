//! Does a code body still need user input?
//!
//! Only two things block: a four-field `Amount:` tag and a tag naming a
//! declared mod. Any other bracketed text is left alone and never blocks.

use crate::mods::ModStore;
use crate::tags;

/// True when any `[...]` span still needs resolving.
pub fn has_unresolved(code_text: &str, mods: &ModStore) -> bool {
    tags::find_tags(code_text)
        .iter()
        .any(|span| is_blocking(&span.inner, mods))
}

/// Whether one tag's inner text blocks resolution.
pub fn is_blocking(inner: &str, mods: &ModStore) -> bool {
    let (core, _) = tags::split_label(inner);
    let core = core.trim();
    if tags::is_amount_pattern(core) {
        return true;
    }
    let name = tags::base_name(inner);
    [inner, core, name].into_iter().any(|n| mods.contains(n))
}

/// Inner text of every blocking tag, in order.
pub fn blocking_tags(code_text: &str, mods: &ModStore) -> Vec<String> {
    tags::find_tags(code_text)
        .into_iter()
        .filter(|span| is_blocking(&span.inner, mods))
        .map(|span| span.inner)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mods::ModDefinition;

    #[test]
    fn amount_pattern_needs_exactly_four_fields() {
        let mods = ModStore::default();
        assert!(has_unresolved("20000000 [Amount:05F5E0FF:HEX:BIG]", &mods));
        assert!(has_unresolved("[Amount:05F5E0FF:HEX:BIG<Gold>]", &mods));
        assert!(!has_unresolved("[Amount:05F5E0FF:HEX]", &mods));
        assert!(!has_unresolved("20000000 05F5E0FF", &mods));
    }

    #[test]
    fn declared_names_block_and_bare_tokens_do_not() {
        let mut mods = ModStore::default();
        mods.insert_list("ITEM", ModDefinition::default());

        assert!(has_unresolved("[ITEM<Slot 1>]", &mods));
        assert!(!has_unresolved("[NOTDECLARED]", &mods));
        // Joker/STAR are resolvable but never gate copying.
        assert!(!has_unresolved("[Joker:PS2]", &mods));
        assert_eq!(
            blocking_tags("[ITEM] [X] [Amount:00:DEC:LE]", &mods),
            vec!["ITEM".to_string(), "Amount:00:DEC:LE".to_string()]
        );
    }
}
