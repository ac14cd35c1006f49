// Central place for grammar tokens, UI strings and other non-localized constants.
// Keep these out of parser.rs/resolver.rs to reduce duplication and make tweaks safer.

// Line prefixes of the CMP code text format.
pub const CMP_PREFIX_DIRECTIVE: char = '^';
pub const CMP_PREFIX_CODE: char = '+';
pub const CMP_PREFIX_GROUP: char = '!';
pub const CMP_PREFIX_CODE_LINE: char = '$';
pub const CMP_PREFIX_CREDITS: &str = "%Credits:";
pub const CMP_GROUP_CLOSE: &str = "!!";

// `^<n> = KEY: value` directive keys.
pub const CMP_KEY_HASH: &str = "HASH";
pub const CMP_KEY_GAME_ID: &str = "GAMEID";
pub const CMP_KEY_NAME: &str = "NAME";
pub const CMP_KEY_FILE: &str = "FILE";
pub const CMP_KEY_MODS: &str = "MODS";

// Note markers.
pub const CMP_NOTE_OPEN: &str = "{";
pub const CMP_NOTE_CLOSE: &str = "}";
pub const CMP_POPUP_OPEN: &str = "{{";
pub const CMP_POPUP_CLOSE: &str = "}}";
pub const CMP_GROUP_NOTE_MARKER: &str = ":{";
pub const NOTE_SEPARATOR_HTML: &str = "<hr/>";

// Tag names and tokens used inside `[...]` placeholders.
pub const TAG_AMOUNT: &str = "Amount";
pub const TAG_JOKER: &str = "Joker";
pub const TAG_STAR: &str = "STAR";
pub const TAG_TOKEN_TXT: &str = "TXT";
pub const TAG_TOKEN_ASCII: &str = "ASCII";
pub const TAG_SWAP_HINT: char = '*';
pub const STAR_DEFAULT_SUBTYPE: &str = "H4V";

// Joker mods.
pub const JOKER_MOD_LE: &str = "LE";
pub const JOKER_MOD_REVERSE: &str = "REV";
pub const JOKER_MOD_WIIMOTE: &str = "WM";
pub const JOKER_MOD_CLASSIC: &str = "CC";
pub const JOKER_MOD_GAMECUBE: &str = "GC";

// Badges shown next to tree nodes.
pub const BADGE_MOD: &str = "-M-";
pub const BADGE_NOTE: &str = "-N-";

// English UI strings (EN_ prefix to make future localization easier)
pub const EN_DEFAULT_AMOUNT_TITLE: &str = "Amount";
pub const EN_TEXT_TITLE: &str = "Text";
pub const EN_JOKER_TITLE: &str = "Joker";
pub const EN_STAR_TITLE: &str = "Star";
pub const EN_PRESS_PREFIX: &str = "Press ";
pub const EN_NO_BUTTONS: &str = "No buttons";
pub const EN_UNKNOWN_TAG: &str = "Unknown tag";
pub const EN_ERR_RANGE: &str = "Value out of range";
pub const EN_ERR_FORMAT: &str = "Invalid value";
pub const EN_PROMPT_PLATFORM: &str = "Pick a platform:";
pub const EN_PROMPT_BUTTONS: &str = "Buttons (separated by '+' or spaces):";
pub const EN_PROMPT_CHOICE: &str = "Choice #:";
pub const EN_LABEL_DEFAULT: &str = "Default:";
pub const EN_LABEL_SWAP_BYTES: &str = "Swap bytes";
pub const EN_UNNAMED_GAME: &str = "Untitled";

// Joiner for multi-line code text.
pub const NL_LF: &str = "\n";

// Byte order mark some editors put at the start of code files.
pub const UTF8_BOM: char = '\u{feff}';
