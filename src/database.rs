use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::mods::ModStore;
use crate::parser::{self, GameInfo};
use crate::resolver::{Prompter, ResolveReport, Resolver};
use crate::settings::Settings;
use crate::statics;
use crate::tree::{CodeNode, CodeTree, NodeId};
use crate::unresolved;

/// A parsed code file: the tree, its mod tables and game metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CodeDatabase {
    pub source_path: Option<PathBuf>,
    pub tree: CodeTree,
    pub mods: ModStore,
    pub info: GameInfo,
}

impl CodeDatabase {
    pub fn load_path(path: &Path, settings: &Settings) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| Error::NotUtf8 {
            path: path.to_path_buf(),
        })?;
        let mut db = Self::parse_str(&text, settings);
        db.source_path = Some(path.to_path_buf());
        debug!("loaded {path:?}: {} nodes", db.tree.len());
        Ok(db)
    }

    pub fn parse_str(text: &str, settings: &Settings) -> Self {
        let text = text.strip_prefix(statics::UTF8_BOM).unwrap_or(text);
        let parsed = parser::parse_str(text, settings);
        Self {
            source_path: None,
            tree: parsed.tree,
            mods: parsed.mods,
            info: parsed.info,
        }
    }

    pub fn code(&self, id: NodeId) -> Result<&CodeNode> {
        self.tree.code(id).ok_or(Error::NotACode(id.0))
    }

    /// Look up a code by its `Group/Sub/Code` path.
    pub fn find_code(&self, path: &str) -> Result<NodeId> {
        self.tree
            .find_by_path(path)
            .filter(|id| self.tree.code(*id).is_some())
            .ok_or_else(|| Error::CodeNotFound(path.to_string()))
    }

    /// Codes that still carry a blocking placeholder, in document order.
    pub fn unresolved_codes(&self) -> Vec<NodeId> {
        self.tree
            .codes()
            .filter(|id| {
                self.tree
                    .code(*id)
                    .is_some_and(|code| code.has_unresolved(&self.mods))
            })
            .collect()
    }

    /// Run the resolver on one code, then refresh its badges.
    pub fn resolve<P: Prompter>(
        &mut self,
        id: NodeId,
        cursor: usize,
        settings: &Settings,
        prompter: &mut P,
    ) -> Result<ResolveReport> {
        let code = self.tree.code_mut(id).ok_or(Error::NotACode(id.0))?;
        let report = Resolver::new(&self.mods, settings, prompter).resolve(code, cursor);
        self.tree.refresh_badge(id, &self.mods);
        Ok(report)
    }

    pub fn reset(&mut self, id: NodeId) -> Result<()> {
        let code = self.tree.code_mut(id).ok_or(Error::NotACode(id.0))?;
        code.reset();
        self.tree.refresh_badge(id, &self.mods);
        Ok(())
    }
}

/// Hands out each node's popup notes the first time it is expanded.
#[derive(Debug, Clone, Default)]
pub struct PopupSession {
    shown: HashSet<NodeId>,
}

impl PopupSession {
    /// Popups to show for `id`. Empty on every call after the first.
    pub fn on_expand(&mut self, tree: &CodeTree, id: NodeId, settings: &Settings) -> Vec<String> {
        if !self.shown.insert(id) {
            return Vec::new();
        }
        tree.get(id)
            .map(|node| {
                node.popup_notes()
                    .iter()
                    .filter(|p| !settings.is_dismissed(p))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn was_shown(&self, id: NodeId) -> bool {
        self.shown.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedCode {
    pub name: String,
    pub text: String,
}

/// Resolved codes picked for export.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    entries: Vec<CollectedCode>,
}

impl Collector {
    /// Add a code's current text. Codes that still need input are refused.
    pub fn add(&mut self, code: &CodeNode, mods: &ModStore) -> Result<()> {
        if unresolved::has_unresolved(&code.working_text, mods) {
            return Err(Error::Unresolved {
                name: code.base_name.clone(),
            });
        }
        self.entries.push(CollectedCode {
            name: code.display_name(),
            text: code.working_text.clone(),
        });
        Ok(())
    }

    pub fn entries(&self) -> &[CollectedCode] {
        &self.entries
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

    /// Name line then code lines, one blank line between codes.
    pub fn export_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}{}{}", e.name, statics::NL_LF, e.text))
            .collect::<Vec<_>>()
            .join(&statics::NL_LF.repeat(2))
    }
}
