//! Bracket-tag grammar: finding `[...]` spans in a code template and
//! classifying them into the placeholder kinds the resolver understands.

use std::sync::LazyLock;

use regex::Regex;

use crate::encoder::{Endian, TextEncoding, ValueType};
use crate::joker::JokerPlatform;
use crate::mods::ModStore;
use crate::statics;

static TAG_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]\r\n]+)\]").expect("static tag regex"));

/// One `[...]` occurrence inside a template. `start..end` covers the brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    pub start: usize,
    pub end: usize,
    pub inner: String,
}

/// Every `[...]` span in `text`, left to right.
pub fn find_tags(text: &str) -> Vec<TagSpan> {
    TAG_SPAN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?;
            Some(TagSpan {
                start: whole.start(),
                end: whole.end(),
                inner: inner.as_str().to_string(),
            })
        })
        .collect()
}

/// Split `Name<Label>` into `("Name", Some("Label"))`.
/// A `<` without a closing `>` at the very end is kept as part of the name.
pub fn split_label(inner: &str) -> (&str, Option<&str>) {
    if !inner.ends_with('>') {
        return (inner, None);
    }
    match inner.find('<') {
        Some(open) => {
            let label = &inner[open + 1..inner.len() - 1];
            (&inner[..open], Some(label))
        }
        None => (inner, None),
    }
}

/// The part before the first `:` with any `<Label>` removed.
pub fn base_name(inner: &str) -> &str {
    let (core, _) = split_label(inner);
    core.split(':').next().unwrap_or(core).trim()
}

/// `Amount:a:b:c` with exactly four colon-delimited fields.
pub fn is_amount_pattern(core: &str) -> bool {
    let fields: Vec<&str> = core.split(':').collect();
    fields.len() == 4 && fields[0].trim() == statics::TAG_AMOUNT
}

/// Title used as the key in a node's applied labels: the text before `:`,
/// or the whole label uppercased when there is no `:`.
pub fn label_key(display_label: &str) -> String {
    match display_label.split_once(':') {
        Some((title, _)) => title.trim().to_string(),
        None => display_label.trim().to_uppercase(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountTag {
    pub title: String,
    pub default_hex: String,
    pub value_type: ValueType,
    pub endian: Endian,
    pub label: Option<String>,
}

/// A classified placeholder. Created fresh on every scan of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKind {
    /// Multi-column table declared with a header line.
    Grid {
        name: String,
        label: Option<String>,
        swap_hint: bool,
    },
    /// `[Amount:<base>:ASCII:(BIG|LITTLE)]`
    AsciiHexAmount {
        base_text: String,
        endian: Endian,
        label: Option<String>,
    },
    /// Plain `value=name` list.
    List { name: String, label: Option<String> },
    /// `[Amount:<base>:<enc>:TXT]`
    TextAmount {
        base_text: String,
        encoding: TextEncoding,
        label: Option<String>,
    },
    /// `[Amount:<default>:<TYPE>:<ENDIAN>]`
    Amount(AmountTag),
    /// `[Joker:<platform>[:<mods>]]`
    Joker {
        platform: JokerPlatform,
        mods: Vec<String>,
    },
    /// `[STAR[:<subtype>]]`
    Star { subtype: String },
}

/// Classify the inside of one `[...]` span. Variants are tried in a fixed
/// precedence order; `None` means the tag is unknown.
pub fn classify(inner: &str, mods: &ModStore) -> Option<TagKind> {
    let (core, raw_label) = split_label(inner);
    let core = core.trim();
    let swap_hint = raw_label.is_some_and(|l| l.starts_with(statics::TAG_SWAP_HINT));
    let label = raw_label
        .map(|l| l.trim_start_matches(statics::TAG_SWAP_HINT).trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    let fields: Vec<&str> = core.split(':').map(str::trim).collect();
    let amount = is_amount_pattern(core);

    if let Some(name) = [inner, core].into_iter().find(|n| mods.is_grid(n)) {
        return Some(TagKind::Grid {
            name: name.to_string(),
            label,
            swap_hint,
        });
    }

    if amount && fields[2].eq_ignore_ascii_case(statics::TAG_TOKEN_ASCII) {
        if let Some(endian) = Endian::parse(fields[3]) {
            return Some(TagKind::AsciiHexAmount {
                base_text: fields[1].to_string(),
                endian,
                label,
            });
        }
    }

    if let Some(name) = [inner, core].into_iter().find(|n| mods.is_list(n)) {
        return Some(TagKind::List {
            name: name.to_string(),
            label,
        });
    }

    if amount && fields[3].eq_ignore_ascii_case(statics::TAG_TOKEN_TXT) {
        return TextEncoding::parse(fields[2]).map(|encoding| TagKind::TextAmount {
            base_text: fields[1].to_string(),
            encoding,
            label,
        });
    }

    if amount {
        let value_type = ValueType::parse(fields[2])?;
        let endian = Endian::parse(fields[3])?;
        return Some(TagKind::Amount(AmountTag {
            title: label
                .clone()
                .unwrap_or_else(|| statics::EN_DEFAULT_AMOUNT_TITLE.to_string()),
            default_hex: fields[1].to_string(),
            value_type,
            endian,
            label,
        }));
    }

    if fields[0].eq_ignore_ascii_case(statics::TAG_JOKER) && fields.len() >= 2 {
        let platform = JokerPlatform::parse(fields[1])?;
        let mods = fields[2..]
            .iter()
            .flat_map(|f| f.split(','))
            .map(|m| m.trim().to_uppercase())
            .filter(|m| !m.is_empty())
            .collect();
        return Some(TagKind::Joker { platform, mods });
    }

    if fields[0].eq_ignore_ascii_case(statics::TAG_STAR) {
        let subtype = fields
            .get(1)
            .filter(|s| !s.is_empty())
            .map_or(statics::STAR_DEFAULT_SUBTYPE, |s| s)
            .to_uppercase();
        return Some(TagKind::Star { subtype });
    }

    None
}
