//! Fills `[...]` placeholders in a code's working text, one tag at a time.
//!
//! Every substitution shifts the positions of the tags after it, so the loop
//! re-scans the text before picking the next tag instead of walking a span
//! list collected up front.

use tracing::{debug, warn};

use crate::encoder::{
    AmountField, FieldEncoder, NumericFormat, StarFormat, swap_hex_bytes, text_budget,
};
use crate::error::EncodeError;
use crate::joker::{Controller, JokerOptions, JokerPlatform, WiiLayout, joker_value};
use crate::mods::{ModDefinition, ModStore, ModTable};
use crate::settings::Settings;
use crate::statics;
use crate::tags::{self, TagKind, TagSpan};
use crate::tree::CodeNode;

/// Upper bound on substitutions in one pass, in case a chosen value itself
/// contains a tag that resolves back to itself.
const MAX_SUBSTITUTIONS: usize = 1024;

/// A row picked from a grid table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridChoice {
    pub row: usize,
    pub swap_bytes: bool,
}

#[derive(Debug)]
pub struct GridRequest<'a> {
    pub tag: &'a str,
    pub label: Option<&'a str>,
    pub table: &'a ModTable,
    /// Initial state of the "swap bytes" toggle.
    pub swap_default: bool,
}

#[derive(Debug)]
pub struct ListRequest<'a> {
    pub tag: &'a str,
    pub label: Option<&'a str>,
    pub definition: &'a ModDefinition,
}

/// A typed-value prompt. `current` is what the field shows right now (after a
/// range error it is the reverted text).
#[derive(Debug)]
pub struct ValueRequest<'a> {
    pub title: &'a str,
    pub description: String,
    pub current: &'a str,
    pub error: Option<&'a EncodeError>,
}

#[derive(Debug)]
pub struct JokerRequest<'a> {
    pub controller: Controller,
    pub error: Option<&'a EncodeError>,
}

/// The UI side of resolution. Returning `None` from any prompt cancels the
/// whole pass; substitutions already made stay.
pub trait Prompter {
    fn pick_row(&mut self, request: &GridRequest<'_>) -> Option<GridChoice>;
    fn pick_item(&mut self, request: &ListRequest<'_>) -> Option<usize>;
    fn enter_value(&mut self, request: &ValueRequest<'_>) -> Option<String>;
    fn pick_platform(&mut self) -> Option<JokerPlatform>;
    fn pick_buttons(&mut self, request: &JokerRequest<'_>) -> Option<Vec<String>>;
    fn notify(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No `[...]` spans remain.
    Completed,
    Cancelled,
    /// The pass stopped at a tag nothing knows how to fill.
    UnknownTag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveReport {
    pub substitutions: usize,
    pub outcome: Outcome,
    /// Byte offset just past the last inserted literal.
    pub cursor: usize,
}

/// One successful dialog: what to splice in and what to show for it.
struct Substitution {
    literal: String,
    label: String,
}

pub struct Resolver<'a, P: Prompter> {
    mods: &'a ModStore,
    settings: &'a Settings,
    prompter: &'a mut P,
}

impl<'a, P: Prompter> Resolver<'a, P> {
    pub fn new(mods: &'a ModStore, settings: &'a Settings, prompter: &'a mut P) -> Self {
        Self {
            mods,
            settings,
            prompter,
        }
    }

    /// Resolve every tag starting at the first one.
    pub fn resolve_all(&mut self, code: &mut CodeNode) -> ResolveReport {
        self.resolve(code, 0)
    }

    /// Resolve tags starting at the one under/after `cursor`, wrapping around
    /// to earlier tags once the end of the text is reached.
    pub fn resolve(&mut self, code: &mut CodeNode, cursor: usize) -> ResolveReport {
        let mut cursor = cursor;
        let mut substitutions = 0;

        let outcome = loop {
            let spans = tags::find_tags(&code.working_text);
            let Some(span) = next_span(&spans, cursor) else {
                break Outcome::Completed;
            };
            if substitutions >= MAX_SUBSTITUTIONS {
                warn!("stopping after {substitutions} substitutions in '{}'", code.base_name);
                break Outcome::Completed;
            }

            let kind = tags::classify(&span.inner, self.mods).filter(|kind| match kind {
                TagKind::Star { subtype } => StarFormat::parse(subtype).is_some(),
                _ => true,
            });
            let Some(kind) = kind else {
                warn!("unknown tag [{}] in '{}'", span.inner, code.base_name);
                self.prompter
                    .notify(&format!("{}: [{}]", statics::EN_UNKNOWN_TAG, span.inner));
                break Outcome::UnknownTag(span.inner.clone());
            };

            let Some(sub) = self.dispatch(&span.inner, kind) else {
                break Outcome::Cancelled;
            };

            code.working_text
                .replace_range(span.start..span.end, &sub.literal);
            cursor = span.start + sub.literal.len();
            code.apply_label(&sub.label);
            substitutions += 1;
            debug!("[{}] -> {} ({})", span.inner, sub.literal, sub.label);
        };

        ResolveReport {
            substitutions,
            outcome,
            cursor,
        }
    }

    fn dispatch(&mut self, tag: &str, kind: TagKind) -> Option<Substitution> {
        match kind {
            TagKind::Grid {
                name,
                label,
                swap_hint,
            } => self.grid(tag, &name, label.as_deref(), swap_hint),
            TagKind::AsciiHexAmount {
                base_text,
                endian,
                label,
            } => {
                let title = label.as_deref().unwrap_or(statics::EN_TEXT_TITLE);
                self.field(title, FieldEncoder::ascii_hex(&base_text, endian), &base_text)
            }
            TagKind::List { name, label } => self.list(tag, &name, label.as_deref()),
            TagKind::TextAmount {
                base_text,
                encoding,
                label,
            } => {
                let title = label.as_deref().unwrap_or(statics::EN_TEXT_TITLE);
                let encoder = FieldEncoder::Text {
                    encoding,
                    budget: text_budget(&base_text),
                };
                self.field(title, encoder, &base_text)
            }
            TagKind::Amount(amount) => {
                let format =
                    NumericFormat::new(amount.value_type, amount.endian, &amount.default_hex);
                self.field(
                    &amount.title,
                    FieldEncoder::Numeric(format),
                    &amount.default_hex,
                )
            }
            TagKind::Joker { platform, mods } => self.joker(platform, &mods),
            TagKind::Star { subtype } => {
                let star = StarFormat::parse(&subtype)?;
                self.field(statics::EN_STAR_TITLE, FieldEncoder::Star(star), "")
            }
        }
    }

    fn grid(
        &mut self,
        tag: &str,
        name: &str,
        label: Option<&str>,
        swap_hint: bool,
    ) -> Option<Substitution> {
        let table = self.mods.grid(name)?;
        let request = GridRequest {
            tag,
            label,
            table,
            swap_default: swap_hint,
        };
        let choice = self.prompter.pick_row(&request)?;
        let value = table.rows.get(choice.row)?.first()?;
        let literal = if choice.swap_bytes {
            swap_hex_bytes(value)
        } else {
            value.clone()
        };
        let row_label = table.row_label(choice.row).unwrap_or(value.as_str());
        Some(Substitution {
            literal,
            label: titled(label, row_label),
        })
    }

    fn list(&mut self, tag: &str, name: &str, label: Option<&str>) -> Option<Substitution> {
        let definition = self.mods.list(name)?;
        let request = ListRequest {
            tag,
            label,
            definition,
        };
        let index = self.prompter.pick_item(&request)?;
        let (value, item) = definition.entries.get(index)?;
        Some(Substitution {
            literal: value.clone(),
            label: titled(label, item),
        })
    }

    /// Prompt until the field accepts a value or the user cancels.
    fn field(&mut self, title: &str, encoder: FieldEncoder, base: &str) -> Option<Substitution> {
        let initial = encoder.default_display(base);
        let mut field = AmountField::new(encoder, initial);
        let mut error: Option<EncodeError> = None;
        loop {
            let request = ValueRequest {
                title,
                description: field.encoder().describe(),
                current: field.text(),
                error: error.as_ref(),
            };
            let input = self.prompter.enter_value(&request)?;
            match field.input(&input) {
                Ok(literal) => {
                    return Some(Substitution {
                        literal,
                        label: format!("{title}: {}", input.trim()),
                    });
                }
                Err(err) => error = Some(err),
            }
        }
    }

    fn joker(&mut self, platform: JokerPlatform, mods: &[String]) -> Option<Substitution> {
        let platform = match platform {
            JokerPlatform::All => self.prompter.pick_platform()?,
            other => other,
        };
        let has = |m: &str| mods.iter().any(|x| x == m);
        let layout = if has(statics::JOKER_MOD_CLASSIC) {
            WiiLayout::Classic
        } else if has(statics::JOKER_MOD_GAMECUBE) {
            WiiLayout::GameCube
        } else if has(statics::JOKER_MOD_WIIMOTE) {
            WiiLayout::Wiimote
        } else {
            self.settings.wii_layout
        };
        // `All` was replaced above, so a controller always exists.
        let controller = Controller::for_platform(platform, layout)?;
        let options = JokerOptions {
            little_endian: has(statics::JOKER_MOD_LE),
            reverse: has(statics::JOKER_MOD_REVERSE) || self.settings.reverse_joker,
        };

        let mut error: Option<EncodeError> = None;
        loop {
            let request = JokerRequest {
                controller,
                error: error.as_ref(),
            };
            let pressed = self.prompter.pick_buttons(&request)?;
            match joker_value(controller, &pressed, options) {
                Ok(literal) => {
                    return Some(Substitution {
                        literal,
                        label: format!(
                            "{}: {}",
                            statics::EN_JOKER_TITLE,
                            controller.press_label(&pressed)
                        ),
                    });
                }
                Err(err) => error = Some(err),
            }
        }
    }
}

/// First span ending at or after `cursor`, else the first span overall.
fn next_span(spans: &[TagSpan], cursor: usize) -> Option<&TagSpan> {
    spans
        .iter()
        .find(|s| s.end >= cursor)
        .or_else(|| spans.first())
}

fn titled(label: Option<&str>, value: &str) -> String {
    match label {
        Some(label) => format!("{label}: {value}"),
        None => value.to_string(),
    }
}
