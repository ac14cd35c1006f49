//! Line-oriented parser for CMP code text.
//!
//! Builds a `CodeTree` plus the file's `ModStore` in one pass. Input is never
//! rejected: lines that do not fit the grammar are skipped.

use serde::Serialize;
use tracing::{debug, trace};

use crate::mods::{ModDefinition, ModStore, ModTable};
use crate::settings::Settings;
use crate::statics;
use crate::tree::{CodeNode, CodeTree, GroupNode, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credit {
    pub name: String,
    pub role: Option<String>,
}

/// Metadata directives that do not become tree nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameInfo {
    pub name: Option<String>,
    pub hashes: Vec<String>,
    pub game_ids: Vec<String>,
    pub credits: Vec<Credit>,
}

#[derive(Debug, Clone)]
pub struct ParsedCodes {
    pub tree: CodeTree,
    pub mods: ModStore,
    pub info: GameInfo,
}

pub fn parse_str(text: &str, settings: &Settings) -> ParsedCodes {
    parse_lines(text.lines(), settings)
}

pub fn parse_lines<I, S>(lines: I, settings: &Settings) -> ParsedCodes
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = TreeBuilder::new(settings);
    for line in lines {
        builder.feed(line.as_ref());
    }
    builder.finish()
}

#[derive(Debug, Default)]
struct PendingMod {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

struct TreeBuilder<'s> {
    settings: &'s Settings,
    tree: CodeTree,
    mods: ModStore,
    info: GameInfo,
    in_mods: bool,
    file_group: Option<NodeId>,
    group: Option<NodeId>,
    code: Option<NodeId>,
    open_mod: Option<PendingMod>,
}

impl<'s> TreeBuilder<'s> {
    fn new(settings: &'s Settings) -> Self {
        Self {
            settings,
            tree: CodeTree::new(statics::EN_UNNAMED_GAME),
            mods: ModStore::default(),
            info: GameInfo::default(),
            in_mods: false,
            file_group: None,
            group: None,
            code: None,
            open_mod: None,
        }
    }

    /// Where new groups/codes go: innermost open group, then file group, then root.
    fn insertion_point(&self) -> NodeId {
        self.group
            .or(self.file_group)
            .unwrap_or_else(|| self.tree.root())
    }

    fn feed(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        if line.starts_with(statics::CMP_PREFIX_DIRECTIVE) {
            self.directive(line);
            return;
        }
        if !self.in_mods && is_note_line(line) {
            self.group_note(line);
            return;
        }
        if let Some(rest) = line.strip_prefix(statics::CMP_PREFIX_CODE) {
            self.code_entry(rest);
            return;
        }
        if line == statics::CMP_GROUP_CLOSE {
            self.close_group();
            return;
        }
        if let Some(rest) = line.strip_prefix(statics::CMP_PREFIX_GROUP) {
            self.open_group(rest);
            return;
        }
        if let Some(inner) = mod_marker(line) {
            match inner.strip_prefix('/') {
                Some(name) => self.close_mod(name.trim()),
                None => self.open_mod(inner.trim()),
            }
            return;
        }
        if let Some(rest) = line.strip_prefix(statics::CMP_PREFIX_CODE_LINE) {
            self.code_line(rest.trim());
            return;
        }
        if self.open_mod.is_some() {
            self.mod_line(line);
            return;
        }
        if let Some(rest) = line.strip_prefix(statics::CMP_PREFIX_CREDITS) {
            self.info.credits.extend(parse_credits(rest));
            return;
        }
        trace!("ignoring line: {line}");
    }

    fn directive(&mut self, line: &str) {
        let Some((number, key, value)) = split_directive(line) else {
            self.in_mods = false;
            trace!("ignoring directive: {line}");
            return;
        };

        // Hash and game id lines never touch the MODS state.
        match number.as_str() {
            "1" => {
                self.info.hashes.extend(split_list(value));
                return;
            }
            "2" => {
                self.info.game_ids.extend(split_list(value));
                return;
            }
            _ => {}
        }

        if key == statics::CMP_KEY_MODS {
            self.in_mods = true;
            return;
        }
        self.in_mods = false;

        match key.as_str() {
            statics::CMP_KEY_NAME => {
                if !value.is_empty() {
                    self.info.name = Some(value.to_string());
                }
            }
            statics::CMP_KEY_FILE => {
                let group = GroupNode {
                    name: value.to_string(),
                    is_file: true,
                    ..Default::default()
                };
                let root = self.tree.root();
                self.file_group = Some(self.tree.add_group(root, group));
                self.group = None;
                self.code = None;
            }
            statics::CMP_KEY_HASH => self.info.hashes.extend(split_list(value)),
            statics::CMP_KEY_GAME_ID => self.info.game_ids.extend(split_list(value)),
            _ => trace!("ignoring directive: {line}"),
        }
    }

    fn group_note(&mut self, line: &str) {
        let target = self.insertion_point();
        let separator = self.settings.note_separator.clone();
        let Some(group) = self.tree.group_mut(target) else {
            return;
        };
        if let Some(popup) = line
            .strip_prefix(statics::CMP_POPUP_OPEN)
            .and_then(|s| s.strip_suffix(statics::CMP_POPUP_CLOSE))
        {
            group.popup_notes.push(unescape_html(popup.trim()));
            return;
        }
        let inner = &line[1..line.len() - 1];
        group.append_note(&unescape_html(inner.trim()), &separator);
    }

    fn code_entry(&mut self, rest: &str) {
        let (rest, popups) = extract_popups(rest);
        let (name, note) = extract_note(&rest);

        let mut code = CodeNode::new(name);
        code.note = note;
        code.popup_notes = popups;

        let parent = self.insertion_point();
        self.code = Some(self.tree.add_code(parent, code));
    }

    fn open_group(&mut self, rest: &str) {
        let group = match rest.find(statics::CMP_GROUP_NOTE_MARKER) {
            Some(at) => {
                let notes = &rest[at + 1..];
                let mut group = GroupNode::new(rest[..at].trim());
                if notes.starts_with(statics::CMP_POPUP_OPEN) {
                    let (_, popups) = extract_popups(notes);
                    group.popup_notes = popups;
                } else {
                    let (_, note) = extract_note(notes);
                    group.note = note;
                }
                group
            }
            None => GroupNode::new(rest.trim()),
        };

        let parent = self.insertion_point();
        self.group = Some(self.tree.add_group(parent, group));
        self.code = None;
    }

    fn close_group(&mut self) {
        self.code = None;
        let Some(current) = self.group else {
            return;
        };
        self.group = self.tree.parent(current).filter(|p| {
            *p != self.tree.root() && self.tree.group(*p).is_some_and(|g| !g.is_file)
        });
    }

    fn code_line(&mut self, text: &str) {
        let Some(id) = self.code else {
            trace!("code line outside a code entry: {text}");
            return;
        };
        if let Some(code) = self.tree.code_mut(id) {
            code.push_line(text);
        }
    }

    fn open_mod(&mut self, name: &str) {
        if let Some(pending) = self.open_mod.take() {
            trace!("[{}] was not closed before [{name}]", pending.name);
            self.commit_mod(pending);
        }
        self.open_mod = Some(PendingMod {
            name: name.to_string(),
            ..Default::default()
        });
    }

    fn close_mod(&mut self, name: &str) {
        match self.open_mod.take() {
            Some(pending) => {
                if pending.name != name {
                    trace!("[/{name}] closes [{}]", pending.name);
                }
                self.commit_mod(pending);
            }
            None => trace!("[/{name}] without an open table"),
        }
    }

    fn mod_line(&mut self, line: &str) {
        let Some(pending) = self.open_mod.as_mut() else {
            return;
        };
        if pending.headers.is_empty()
            && pending.rows.is_empty()
            && line.contains('>')
            && !line.contains('=')
        {
            pending.headers = line
                .split('>')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .collect();
            return;
        }
        match split_row(line) {
            Some(cells) => pending.rows.push(cells),
            None => trace!("ignoring row in [{}]: {line}", pending.name),
        }
    }

    fn commit_mod(&mut self, pending: PendingMod) {
        let PendingMod {
            name,
            headers,
            rows,
        } = pending;
        if headers.is_empty() {
            let entries = rows
                .into_iter()
                .map(|mut cells| {
                    cells.truncate(2);
                    let label = cells.pop().unwrap_or_default();
                    let value = cells.pop().unwrap_or_default();
                    (value, label)
                })
                .collect();
            self.mods.insert_list(&name, ModDefinition { entries });
        } else {
            self.mods.insert_grid(&name, ModTable { headers, rows });
        }
    }

    fn finish(mut self) -> ParsedCodes {
        if let Some(pending) = self.open_mod.take() {
            self.commit_mod(pending);
        }
        if let Some(name) = self.info.name.clone() {
            let root = self.tree.root();
            if let Some(group) = self.tree.group_mut(root) {
                group.name = name;
            }
        }
        self.tree.refresh_badges(&self.mods);
        debug!(
            "parsed {} nodes, {} mod tables",
            self.tree.len() - 1,
            self.mods.len()
        );
        ParsedCodes {
            tree: self.tree,
            mods: self.mods,
            info: self.info,
        }
    }
}

fn is_note_line(line: &str) -> bool {
    line.len() >= 2
        && line.starts_with(statics::CMP_NOTE_OPEN)
        && line.ends_with(statics::CMP_NOTE_CLOSE)
}

/// `[Name]` or `[/Name]` on a line of its own.
fn mod_marker(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    if inner.is_empty() || inner.contains(['[', ']']) {
        return None;
    }
    Some(inner)
}

/// `^6 = MODS:` -> `("6", "MODS", "")`. Key is uppercased.
fn split_directive(line: &str) -> Option<(String, String, &str)> {
    let body = line.strip_prefix(statics::CMP_PREFIX_DIRECTIVE)?;
    let (number, rest) = body.split_once('=')?;
    let (key, value) = match rest.split_once(':') {
        Some((key, value)) => (key, value.trim()),
        None => (rest, ""),
    };
    Some((
        number.trim().to_string(),
        key.trim().to_ascii_uppercase(),
        value,
    ))
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Split a table row on tab, `>` or `=` (first one present wins).
/// `=` only ever splits once so names may contain it.
fn split_row(line: &str) -> Option<Vec<String>> {
    let mut cells: Vec<String> = if line.contains('\t') {
        line.split('\t').map(|c| c.trim().to_string()).collect()
    } else if line.contains('>') {
        line.split('>').map(|c| c.trim().to_string()).collect()
    } else if line.contains('=') {
        line.splitn(2, '=').map(|c| c.trim().to_string()).collect()
    } else {
        return None;
    };
    while cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }
    (cells.len() >= 2 && !cells[0].is_empty()).then_some(cells)
}

/// Pull every `{{...}}` out of `text`, returning the remainder and the popups.
fn extract_popups(text: &str) -> (String, Vec<String>) {
    let mut rest = text.to_string();
    let mut popups = Vec::new();
    while let Some(open) = rest.find(statics::CMP_POPUP_OPEN) {
        let Some(len) = rest[open + 2..].find(statics::CMP_POPUP_CLOSE) else {
            break;
        };
        let close = open + 2 + len;
        popups.push(unescape_html(rest[open + 2..close].trim()));
        rest.replace_range(open..close + 2, "");
    }
    (rest, popups)
}

/// `Name{note}` -> `("Name", Some("note"))`.
fn extract_note(text: &str) -> (String, Option<String>) {
    if let Some(open) = text.find('{') {
        if let Some(close) = text.rfind('}').filter(|c| *c > open) {
            let name = format!("{}{}", &text[..open], &text[close + 1..]);
            let note = unescape_html(text[open + 1..close].trim());
            return (name.trim().to_string(), Some(note).filter(|n| !n.is_empty()));
        }
    }
    (text.trim().to_string(), None)
}

/// `Name(Role), Name2:Role2, Name3`
fn parse_credits(text: &str) -> Vec<Credit> {
    text.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|entry| {
            if let Some((name, role)) = entry
                .strip_suffix(')')
                .and_then(|e| e.split_once('('))
            {
                return Credit {
                    name: name.trim().to_string(),
                    role: Some(role.trim().to_string()),
                };
            }
            match entry.split_once(':') {
                Some((name, role)) => Credit {
                    name: name.trim().to_string(),
                    role: Some(role.trim().to_string()),
                },
                None => Credit {
                    name: entry.to_string(),
                    role: None,
                },
            }
        })
        .collect()
}

/// Decode the handful of entities that show up in notes.
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|semi| *semi <= 10).and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
