//! Core library for CMP Codes.
//! Parses CMP code text into a group/code tree with its mod tables, and fills in
//! `[...]` placeholders (amounts, text, table picks, joker masks) through a
//! pluggable `Prompter`.

mod cli;
pub mod database;
pub mod encoder;
pub mod error;
pub mod joker;
pub mod mods;
pub mod parser;
pub mod resolver;
pub mod settings;
pub mod statics;
pub mod tags;
pub mod tree;
pub mod unresolved;

pub use cli::{LinePrompter, run_cli};
pub use database::{CodeDatabase, Collector, PopupSession};
pub use encoder::{AmountField, Endian, FieldEncoder, NumericFormat, TextEncoding, ValueType};
pub use error::{EncodeError, Error, Result};
pub use joker::{Controller, JokerPlatform, WiiLayout};
pub use mods::{ModDefinition, ModStore, ModTable};
pub use parser::{GameInfo, ParsedCodes};
pub use resolver::{Outcome, Prompter, ResolveReport, Resolver};
pub use settings::Settings;
pub use tree::{CodeNode, CodeTree, GroupNode, NodeId};
