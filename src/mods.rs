//! Lookup tables declared in a file's MODS region.

use indexmap::IndexMap;
use serde::Serialize;

/// Plain `value=name` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModDefinition {
    pub entries: Vec<(String, String)>,
}

/// Headered multi-column table. The first column of every row is the value
/// that gets substituted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ModTable {
    /// Label shown for a chosen row: its second cell, falling back to the value.
    pub fn row_label(&self, row: usize) -> Option<&str> {
        let cells = self.rows.get(row)?;
        cells.get(1).or_else(|| cells.first()).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ModEntry {
    List(ModDefinition),
    Grid(ModTable),
}

/// Tag name -> definition. Re-declaring a name replaces the earlier definition.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModStore {
    entries: IndexMap<String, ModEntry>,
}

impl ModStore {
    pub fn insert_list(&mut self, name: &str, def: ModDefinition) {
        self.entries.insert(name.to_string(), ModEntry::List(def));
    }

    pub fn insert_grid(&mut self, name: &str, table: ModTable) {
        self.entries.insert(name.to_string(), ModEntry::Grid(table));
    }

    pub fn get(&self, name: &str) -> Option<&ModEntry> {
        self.entries.get(name)
    }

    pub fn list(&self, name: &str) -> Option<&ModDefinition> {
        match self.entries.get(name)? {
            ModEntry::List(def) => Some(def),
            ModEntry::Grid(_) => None,
        }
    }

    pub fn grid(&self, name: &str) -> Option<&ModTable> {
        match self.entries.get(name)? {
            ModEntry::Grid(table) => Some(table),
            ModEntry::List(_) => None,
        }
    }

    pub fn is_list(&self, name: &str) -> bool {
        self.list(name).is_some()
    }

    pub fn is_grid(&self, name: &str) -> bool {
        self.grid(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaring_a_name_replaces_it() {
        let mut store = ModStore::default();
        store.insert_list(
            "ITEM",
            ModDefinition {
                entries: vec![("01".into(), "Potion".into())],
            },
        );
        store.insert_grid(
            "ITEM",
            ModTable {
                headers: vec!["Value".into(), "Name".into(), "Price".into()],
                rows: vec![vec!["02".into(), "Ether".into(), "50".into()]],
            },
        );

        assert_eq!(store.len(), 1);
        assert!(!store.is_list("ITEM"));
        assert_eq!(store.grid("ITEM").and_then(|t| t.row_label(0)), Some("Ether"));
    }

    #[test]
    fn names_keep_declaration_order() {
        let mut store = ModStore::default();
        store.insert_list("B", ModDefinition::default());
        store.insert_list("A", ModDefinition::default());
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["B", "A"]);
    }
}
