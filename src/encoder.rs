//! Fixed-width value encoding for `Amount` placeholders.
//!
//! Everything here works on byte strings in their final (substituted) order and
//! renders them as uppercase hex. Whole numbers are parsed as big integers and
//! bounded only by the field width.

use std::num::IntErrorKind;

use num_bigint::{BigInt, BigUint, Sign};

use crate::error::EncodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "BIG" | "BE" => Some(Endian::Big),
            "LITTLE" | "LE" => Some(Endian::Little),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Endian::Big => "BIG",
            Endian::Little => "LITTLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Hex,
    /// `DEC` and `UINT`.
    Dec,
    Int,
    Float,
    Double,
}

impl ValueType {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "HEX" => Some(ValueType::Hex),
            "DEC" | "UINT" => Some(ValueType::Dec),
            "INT" => Some(ValueType::Int),
            "FLOAT" | "FLOAT32" => Some(ValueType::Float),
            "DOUBLE" | "FLOAT64" => Some(ValueType::Double),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Hex => "HEX",
            ValueType::Dec => "DEC",
            ValueType::Int => "INT",
            ValueType::Float => "FLOAT",
            ValueType::Double => "DOUBLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Ascii,
}

impl TextEncoding {
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_uppercase().replace(['-', '_'], "");
        match token.as_str() {
            "UTF8" => Some(TextEncoding::Utf8),
            "UTF16" | "UTF16LE" | "UNICODE" => Some(TextEncoding::Utf16Le),
            "UTF16BE" | "BIGENDIANUNICODE" => Some(TextEncoding::Utf16Be),
            "ASCII" => Some(TextEncoding::Ascii),
            _ => None,
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, EncodeError> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            TextEncoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            TextEncoding::Ascii => {
                if text.is_ascii() {
                    Ok(text.as_bytes().to_vec())
                } else {
                    Err(EncodeError::Format(format!("'{text}' is not ASCII")))
                }
            }
        }
    }
}

/// Uppercase hex, two digits per byte, no separators.
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{b:02X}").ok();
    }
    out
}

/// Parse a run of hex digits (whitespace ignored, odd length left-padded).
pub fn parse_hex_bytes(text: &str) -> Option<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digits = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits
    };
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
        .collect()
}

/// Reverse the order of hex byte pairs: `12345678` -> `78563412`.
///
/// Odd-length input is left-padded first, so `123` swaps as `0123`.
pub fn swap_hex_bytes(hex: &str) -> String {
    let mut digits: Vec<char> = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 == 1 {
        digits.insert(0, '0');
    }
    digits
        .chunks(2)
        .rev()
        .flat_map(|pair| pair.iter())
        .collect()
}

/// Pad or truncate a big-endian byte string at its most-significant end.
fn fit_be(mut bytes: Vec<u8>, width: usize, fill: u8) -> Vec<u8> {
    if bytes.len() > width {
        bytes.drain(..bytes.len() - width);
    } else {
        let mut padded = vec![fill; width - bytes.len()];
        padded.extend(bytes);
        bytes = padded;
    }
    bytes
}

fn order(mut be_bytes: Vec<u8>, endian: Endian) -> Vec<u8> {
    if endian == Endian::Little {
        be_bytes.reverse();
    }
    be_bytes
}

fn looks_hex(text: &str) -> bool {
    text.starts_with("0x")
        || text.starts_with("0X")
        || text.chars().any(|c| matches!(c, 'a'..='f' | 'A'..='F'))
}

fn unsigned_max(width: usize) -> BigUint {
    (BigUint::from(1u8) << (8 * width)) - 1u8
}

fn signed_bounds(width: usize) -> (BigInt, BigInt) {
    let half = BigInt::from(1u8) << (8 * width.max(1) - 1);
    (-&half, half - 1u8)
}

/// Optional sign and at least one ASCII digit.
fn split_sign(text: &str) -> Option<(bool, &str)> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some((negative, digits))
}

fn parse_magnitude(text: &str) -> Result<(bool, BigUint), EncodeError> {
    split_sign(text)
        .and_then(|(negative, digits)| {
            BigUint::parse_bytes(digits.as_bytes(), 10).map(|value| (negative, value))
        })
        .ok_or_else(|| EncodeError::Format(format!("'{text}' is not a whole number")))
}

/// How many bytes an `Amount` field occupies, derived from its default value.
pub fn width_for(value_type: ValueType, default_hex: &str) -> usize {
    match value_type {
        ValueType::Float => 4,
        ValueType::Double => 8,
        _ => default_hex.trim().len().div_ceil(2).max(1),
    }
}

/// Type, byte order and width of one numeric `Amount` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericFormat {
    pub value_type: ValueType,
    pub endian: Endian,
    pub width: usize,
}

impl NumericFormat {
    pub fn new(value_type: ValueType, endian: Endian, default_hex: &str) -> Self {
        Self {
            value_type,
            endian,
            width: width_for(value_type, default_hex),
        }
    }

    /// Encode user input into exactly `width` bytes.
    pub fn encode(&self, input: &str) -> Result<Vec<u8>, EncodeError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(EncodeError::Format("empty value".to_string()));
        }
        match self.value_type {
            ValueType::Hex if looks_hex(text) => self.encode_hex_digits(text),
            ValueType::Hex | ValueType::Dec => self.encode_unsigned(text),
            ValueType::Int => self.encode_signed(text),
            ValueType::Float => encode_float32(text, self.endian),
            ValueType::Double => encode_float64(text, self.endian),
        }
    }

    fn encode_hex_digits(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        let mut bytes = parse_hex_bytes(digits)
            .ok_or_else(|| EncodeError::Format(format!("'{text}' is not hexadecimal")))?;
        while bytes.len() > self.width && bytes.first() == Some(&0) {
            bytes.remove(0);
        }
        if bytes.len() > self.width {
            return Err(EncodeError::Range(format!(
                "0x{} does not fit in {} bytes",
                to_hex(&bytes),
                self.width
            )));
        }
        Ok(order(fit_be(bytes, self.width, 0), self.endian))
    }

    fn encode_unsigned(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        let (negative, value) = parse_magnitude(text)?;
        if negative && value.bits() != 0 {
            return Err(EncodeError::Range(format!("{text} is below 0")));
        }
        let max = unsigned_max(self.width);
        if value > max {
            return Err(EncodeError::Range(format!("{text} exceeds {max}")));
        }
        Ok(order(fit_be(value.to_bytes_be(), self.width, 0), self.endian))
    }

    fn encode_signed(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        let (negative, magnitude) = parse_magnitude(text)?;
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        let value = BigInt::from_biguint(sign, magnitude);
        let (min, max) = signed_bounds(self.width);
        if value < min || value > max {
            return Err(EncodeError::Range(format!("{text} is outside {min}..={max}")));
        }
        let fill = if value.sign() == Sign::Minus { 0xFF } else { 0x00 };
        Ok(order(
            fit_be(value.to_signed_bytes_be(), self.width, fill),
            self.endian,
        ))
    }

    /// Render bytes (in final order) back into the text a user would type.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let mut be = bytes.to_vec();
        if self.endian == Endian::Little {
            be.reverse();
        }
        let be = fit_be(be, self.width, 0);
        match self.value_type {
            ValueType::Hex | ValueType::Dec => BigUint::from_bytes_be(&be).to_string(),
            ValueType::Int => BigInt::from_signed_bytes_be(&be).to_string(),
            ValueType::Float => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(&be[..4]);
                format_float(f64::from(f32::from_be_bytes(buf)), true)
            }
            ValueType::Double => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&be[..8]);
                format_float(f64::from_be_bytes(buf), false)
            }
        }
    }

    /// Human-readable rendering of a tag's default value. Never raw hex.
    ///
    /// Decimal-typed defaults written with decimal digits and no leading `0`
    /// are taken at face value (`[Amount:9999:DEC:BIG]` shows `9999`). Padded
    /// defaults such as `00000064` are hex and show `100`.
    pub fn default_display(&self, default_hex: &str) -> String {
        let default = default_hex.trim();
        if matches!(self.value_type, ValueType::Dec | ValueType::Int)
            && !default.starts_with('0')
            && self.encode(default).is_ok()
            && default.bytes().all(|b| b.is_ascii_digit())
        {
            return default.to_string();
        }
        match parse_hex_bytes(default) {
            Some(bytes) => self.decode(&bytes),
            None => default.to_string(),
        }
    }

    pub fn describe(&self) -> String {
        match self.value_type {
            ValueType::Hex | ValueType::Dec => format!(
                "{} {} bytes {} (0..={})",
                self.value_type.as_str(),
                self.width,
                self.endian.as_str(),
                unsigned_max(self.width)
            ),
            ValueType::Int => {
                let (min, max) = signed_bounds(self.width);
                format!(
                    "INT {} bytes {} ({min}..={max})",
                    self.width,
                    self.endian.as_str()
                )
            }
            ValueType::Float | ValueType::Double => format!(
                "{} {} bytes {}",
                self.value_type.as_str(),
                self.width,
                self.endian.as_str()
            ),
        }
    }
}

fn parse_real(text: &str) -> Result<f64, EncodeError> {
    let value = text
        .parse::<f64>()
        .map_err(|_| EncodeError::Format(format!("'{text}' is not a number")))?;
    if value.is_nan() {
        return Err(EncodeError::Format(format!("'{text}' is not a number")));
    }
    if value.is_infinite() {
        return Err(EncodeError::Range(format!("{text} overflows")));
    }
    Ok(value)
}

fn encode_float32(text: &str, endian: Endian) -> Result<Vec<u8>, EncodeError> {
    let value = parse_real(text)?;
    #[allow(clippy::cast_possible_truncation)]
    let narrow = value as f32;
    if narrow.is_infinite() {
        return Err(EncodeError::Range(format!("{text} overflows a 32-bit float")));
    }
    let mut bytes = narrow.to_le_bytes().to_vec();
    if endian == Endian::Big {
        bytes.reverse();
    }
    Ok(bytes)
}

fn encode_float64(text: &str, endian: Endian) -> Result<Vec<u8>, EncodeError> {
    let value = parse_real(text)?;
    let mut bytes = value.to_le_bytes().to_vec();
    if endian == Endian::Big {
        bytes.reverse();
    }
    Ok(bytes)
}

fn format_float(value: f64, single: bool) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let mut buf = ryu::Buffer::new();
    if single {
        #[allow(clippy::cast_possible_truncation)]
        let narrow = value as f32;
        buf.format(narrow).to_string()
    } else {
        buf.format(value).to_string()
    }
}

/// Byte budget for a text field: a default made only of `9`s reserves one
/// byte per character.
pub fn text_budget(base_text: &str) -> Option<usize> {
    let base = base_text.trim();
    (!base.is_empty() && base.chars().all(|c| c == '9')).then_some(base.len())
}

/// `STAR` subtype: `<H|D><digits><V|B>`, e.g. `H4V`.
///
/// `H` renders hex digits, `D` renders decimal (BCD) digits. `V` writes the
/// entered count as-is, `B` writes a mask with the low `count` bits set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarFormat {
    pub hex: bool,
    pub digits: usize,
    pub bitmask: bool,
}

impl StarFormat {
    pub fn parse(subtype: &str) -> Option<Self> {
        let subtype = subtype.trim().to_ascii_uppercase();
        let hex = match subtype.chars().next()? {
            'H' => true,
            'D' => false,
            _ => return None,
        };
        let bitmask = match subtype.chars().last()? {
            'V' => false,
            'B' => true,
            _ => return None,
        };
        let digits = subtype.get(1..subtype.len() - 1)?.parse::<usize>().ok()?;
        (1..=32).contains(&digits).then_some(Self {
            hex,
            digits,
            bitmask,
        })
    }

    fn max(&self) -> u128 {
        let base: u128 = if self.hex { 16 } else { 10 };
        base.checked_pow(u32::try_from(self.digits).unwrap_or(u32::MAX))
            .map_or(u128::MAX, |v| v - 1)
    }

    pub fn render(&self, input: &str) -> Result<String, EncodeError> {
        let text = input.trim();
        if let Some(rest) = text.strip_prefix('-') {
            if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
                return Err(EncodeError::Range(format!("{text} is below 0")));
            }
        }
        let count = text.parse::<u128>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow => EncodeError::Range(format!("{text} is too large")),
            _ => EncodeError::Format(format!("'{text}' is not a whole number")),
        })?;
        let value = if self.bitmask {
            if count > 127 {
                return Err(EncodeError::Range(format!("{count} bits do not fit")));
            }
            (1u128 << count) - 1
        } else {
            count
        };
        if value > self.max() {
            return Err(EncodeError::Range(format!("{text} exceeds {} digits", self.digits)));
        }
        let width = self.digits;
        Ok(if self.hex {
            format!("{value:0width$X}")
        } else {
            format!("{value:0width$}")
        })
    }
}

/// Any of the `Amount`/`STAR` encodings, behind one `render` entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEncoder {
    Numeric(NumericFormat),
    /// Free text; zero-padded up to `budget` when one applies.
    Text {
        encoding: TextEncoding,
        budget: Option<usize>,
    },
    /// ASCII text packed into `width` bytes, byte-reversed for little endian.
    AsciiHex { width: usize, endian: Endian },
    Star(StarFormat),
}

impl FieldEncoder {
    pub fn ascii_hex(base_text: &str, endian: Endian) -> Self {
        let base = base_text.trim();
        let width = match parse_hex_bytes(base) {
            Some(bytes) => bytes.len(),
            None => base.len().max(1),
        };
        FieldEncoder::AsciiHex { width, endian }
    }

    /// The literal that replaces the tag for this input.
    pub fn render(&self, input: &str) -> Result<String, EncodeError> {
        match self {
            FieldEncoder::Numeric(format) => format.encode(input).map(|b| to_hex(&b)),
            FieldEncoder::Text { encoding, budget } => {
                let mut bytes = encoding.encode(input)?;
                if let Some(budget) = *budget {
                    if bytes.len() > budget {
                        return Err(EncodeError::Range(format!(
                            "text needs {} bytes, only {budget} available",
                            bytes.len()
                        )));
                    }
                    bytes.resize(budget, 0);
                }
                Ok(to_hex(&bytes))
            }
            FieldEncoder::AsciiHex { width, endian } => {
                let mut bytes = TextEncoding::Ascii.encode(input)?;
                if bytes.len() > *width {
                    return Err(EncodeError::Range(format!(
                        "text needs {} bytes, only {width} available",
                        bytes.len()
                    )));
                }
                bytes.resize(*width, 0);
                if *endian == Endian::Little {
                    bytes.reverse();
                }
                Ok(to_hex(&bytes))
            }
            FieldEncoder::Star(star) => star.render(input),
        }
    }

    /// What to show in the input field before the user types anything.
    pub fn default_display(&self, base_text: &str) -> String {
        match self {
            FieldEncoder::Numeric(format) => format.default_display(base_text),
            FieldEncoder::Text { budget, .. } => {
                if budget.is_some() {
                    String::new()
                } else {
                    base_text.to_string()
                }
            }
            FieldEncoder::AsciiHex { endian, .. } => match parse_hex_bytes(base_text) {
                Some(mut bytes) => {
                    if *endian == Endian::Little {
                        bytes.reverse();
                    }
                    let text: String = bytes
                        .iter()
                        .take_while(|b| **b != 0)
                        .map(|b| char::from(*b))
                        .collect();
                    if text.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
                        text
                    } else {
                        String::new()
                    }
                }
                None => base_text.to_string(),
            },
            FieldEncoder::Star(_) => "0".to_string(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            FieldEncoder::Numeric(format) => format.describe(),
            FieldEncoder::Text { encoding, budget } => match budget {
                Some(b) => format!("{encoding:?} text, up to {b} bytes"),
                None => format!("{encoding:?} text"),
            },
            FieldEncoder::AsciiHex { width, endian } => {
                format!("ASCII text, up to {width} bytes {}", endian.as_str())
            }
            FieldEncoder::Star(star) => format!(
                "count, {} {} digits{}",
                star.digits,
                if star.hex { "hex" } else { "decimal" },
                if star.bitmask { " (bit mask)" } else { "" }
            ),
        }
    }
}

/// Live-validated input field.
///
/// A range error puts the text back to the last value that encoded; a format
/// error leaves the text as typed but still refuses it.
#[derive(Debug, Clone)]
pub struct AmountField {
    encoder: FieldEncoder,
    text: String,
    last_valid: String,
}

impl AmountField {
    pub fn new(encoder: FieldEncoder, initial: impl Into<String>) -> Self {
        let initial = initial.into();
        Self {
            encoder,
            text: initial.clone(),
            last_valid: initial,
        }
    }

    pub fn encoder(&self) -> &FieldEncoder {
        &self.encoder
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn last_valid(&self) -> &str {
        &self.last_valid
    }

    /// Offer new text; on success returns the literal to substitute.
    pub fn input(&mut self, text: &str) -> Result<String, EncodeError> {
        match self.encoder.render(text) {
            Ok(literal) => {
                self.text = text.to_string();
                self.last_valid = text.to_string();
                Ok(literal)
            }
            Err(err) => {
                self.text = if err.is_range() {
                    self.last_valid.clone()
                } else {
                    text.to_string()
                };
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(value_type: ValueType, endian: Endian, default_hex: &str) -> NumericFormat {
        NumericFormat::new(value_type, endian, default_hex)
    }

    #[test]
    fn hex_input_is_reversed_for_little_endian() {
        let f = fmt(ValueType::Hex, Endian::Little, "00000000");
        assert_eq!(to_hex(&f.encode("0x1234").unwrap()), "34120000");
        let f = fmt(ValueType::Hex, Endian::Big, "00000000");
        assert_eq!(to_hex(&f.encode("ABCD").unwrap()), "0000ABCD");
    }

    #[test]
    fn hex_type_accepts_plain_decimal() {
        let f = fmt(ValueType::Hex, Endian::Big, "05F5E0FF");
        assert_eq!(to_hex(&f.encode("99999999").unwrap()), "05F5E0FF");
        assert!(f.encode("4294967296").unwrap_err().is_range());
        assert!(f.encode("0x1FFFFFFFF").unwrap_err().is_range());
    }

    #[test]
    fn dec_rejects_negatives_and_overflow_as_range() {
        let f = fmt(ValueType::Dec, Endian::Big, "0000");
        assert_eq!(to_hex(&f.encode("65535").unwrap()), "FFFF");
        assert!(f.encode("65536").unwrap_err().is_range());
        assert!(f.encode("-1").unwrap_err().is_range());
        assert!(!f.encode("12a").unwrap_err().is_range());
    }

    #[test]
    fn int_uses_twos_complement_bounds() {
        let f = fmt(ValueType::Int, Endian::Big, "0000");
        assert_eq!(to_hex(&f.encode("-1").unwrap()), "FFFF");
        assert_eq!(to_hex(&f.encode("-32768").unwrap()), "8000");
        assert!(f.encode("32768").unwrap_err().is_range());
        assert!(f.encode("-32769").unwrap_err().is_range());
        let le = fmt(ValueType::Int, Endian::Little, "00000000");
        assert_eq!(to_hex(&le.encode("-2").unwrap()), "FEFFFFFF");
    }

    #[test]
    fn float_width_is_forced() {
        let f = fmt(ValueType::Float, Endian::Big, "00");
        assert_eq!(f.width, 4);
        assert_eq!(to_hex(&f.encode("1.0").unwrap()), "3F800000");
        let le = fmt(ValueType::Float, Endian::Little, "00");
        assert_eq!(to_hex(&le.encode("1.0").unwrap()), "0000803F");
        assert!(f.encode("1e39").unwrap_err().is_range());
        assert!(!f.encode("abc").unwrap_err().is_range());

        let d = fmt(ValueType::Double, Endian::Big, "0000");
        assert_eq!(d.width, 8);
        assert_eq!(to_hex(&d.encode("2").unwrap()), "4000000000000000");
        assert!(d.encode("1e400").unwrap_err().is_range());
    }

    #[test]
    fn decode_inverts_encode_within_bounds() {
        let cases = [
            (ValueType::Dec, Endian::Big, "00000000", "123456"),
            (ValueType::Dec, Endian::Little, "0000", "65535"),
            (ValueType::Int, Endian::Little, "00000000", "-123456"),
            (ValueType::Int, Endian::Big, "00", "-128"),
            (ValueType::Hex, Endian::Little, "000000", "70000"),
            (ValueType::Float, Endian::Big, "", "1.5"),
            (ValueType::Float, Endian::Little, "", "-0.25"),
            (ValueType::Double, Endian::Little, "", "3.141592653589793"),
        ];
        for (value_type, endian, default, value) in cases {
            let f = fmt(value_type, endian, default);
            let bytes = f.encode(value).unwrap();
            assert_eq!(bytes.len(), f.width);
            assert_eq!(f.decode(&bytes), value, "{value_type:?} {endian:?}");
        }
    }

    #[test]
    fn default_display_is_decimal() {
        assert_eq!(
            fmt(ValueType::Hex, Endian::Big, "05F5E0FF").default_display("05F5E0FF"),
            "99999999"
        );
        assert_eq!(
            fmt(ValueType::Dec, Endian::Big, "9999").default_display("9999"),
            "9999"
        );
        assert_eq!(
            fmt(ValueType::Float, Endian::Big, "3F800000").default_display("3F800000"),
            "1.0"
        );
    }

    #[test]
    fn wide_fields_use_the_full_width() {
        let wide = "00".repeat(20);

        let dec = fmt(ValueType::Dec, Endian::Big, &wide);
        assert_eq!(dec.width, 20);
        let past_u128 = "340282366920938463463374607431768211456";
        let bytes = dec.encode(past_u128).unwrap();
        assert_eq!(to_hex(&bytes), format!("00000001{}", "00".repeat(16)));
        assert_eq!(dec.decode(&bytes), past_u128);
        let max = "1461501637330902918203684832716283019655932542975";
        assert_eq!(to_hex(&dec.encode(max).unwrap()), "FF".repeat(20));
        let over = "1461501637330902918203684832716283019655932542976";
        assert!(dec.encode(over).unwrap_err().is_range());

        let int = fmt(ValueType::Int, Endian::Little, &wide);
        let below_i128 = "-170141183460469231731687303715884105729";
        let bytes = int.encode(below_i128).unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(int.decode(&bytes), below_i128);
        let min = "-730750818665451459101842416358141509827966271488";
        assert_eq!(int.decode(&int.encode(min).unwrap()), min);
        let under = "-730750818665451459101842416358141509827966271489";
        assert!(int.encode(under).unwrap_err().is_range());
    }

    #[test]
    fn padded_decimal_default_is_read_as_hex() {
        let f = fmt(ValueType::Dec, Endian::Big, "00000064");
        let shown = f.default_display("00000064");
        assert_eq!(shown, "100");
        assert_eq!(to_hex(&f.encode(&shown).unwrap()), "00000064");

        let i = fmt(ValueType::Int, Endian::Little, "FFFF");
        assert_eq!(i.default_display("FFFF"), "-1");
    }

    #[test]
    fn amount_field_reverts_only_on_range_errors() {
        let f = fmt(ValueType::Dec, Endian::Big, "9999");
        let mut field = AmountField::new(FieldEncoder::Numeric(f), f.default_display("9999"));
        assert_eq!(field.text(), "9999");

        assert!(field.input("70000").unwrap_err().is_range());
        assert_eq!(field.text(), "9999");

        assert!(!field.input("12x").unwrap_err().is_range());
        assert_eq!(field.text(), "12x");
        assert_eq!(field.last_valid(), "9999");

        assert_eq!(field.input("500").unwrap(), "01F4");
        assert_eq!(field.last_valid(), "500");
    }

    #[test]
    fn text_budget_pads_and_caps() {
        assert_eq!(text_budget("9999"), Some(4));
        assert_eq!(text_budget("Hero"), None);

        let enc = FieldEncoder::Text {
            encoding: TextEncoding::Utf16Le,
            budget: Some(6),
        };
        assert_eq!(enc.render("AB").unwrap(), "410042000000");
        assert!(enc.render("ABCD").unwrap_err().is_range());

        let ascii = FieldEncoder::Text {
            encoding: TextEncoding::Ascii,
            budget: None,
        };
        assert!(!ascii.render("é").unwrap_err().is_range());
    }

    #[test]
    fn ascii_hex_packs_and_reverses() {
        let big = FieldEncoder::ascii_hex("41424344", Endian::Big);
        assert_eq!(big.render("AB").unwrap(), "41420000");
        assert_eq!(big.default_display("41424344"), "ABCD");

        let little = FieldEncoder::ascii_hex("44434241", Endian::Little);
        assert_eq!(little.render("ABCD").unwrap(), "44434241");
        assert_eq!(little.default_display("44434241"), "ABCD");
        assert!(little.render("ABCDE").unwrap_err().is_range());
    }

    #[test]
    fn star_subtypes() {
        let h4v = StarFormat::parse("H4V").unwrap();
        assert_eq!(h4v.render("120").unwrap(), "0078");
        assert!(h4v.render("65536").unwrap_err().is_range());

        let d2v = StarFormat::parse("d2v").unwrap();
        assert_eq!(d2v.render("7").unwrap(), "07");
        assert!(d2v.render("100").unwrap_err().is_range());

        let h2b = StarFormat::parse("H2B").unwrap();
        assert_eq!(h2b.render("5").unwrap(), "1F");
        assert!(h2b.render("9").unwrap_err().is_range());

        assert_eq!(StarFormat::parse("X4V"), None);
        assert_eq!(StarFormat::parse("H0V"), None);
        assert_eq!(StarFormat::parse("HV"), None);
    }

    #[test]
    fn swap_hex_bytes_reverses_pairs() {
        assert_eq!(swap_hex_bytes("12345678"), "78563412");
        assert_eq!(swap_hex_bytes("ABCD"), "CDAB");
        assert_eq!(swap_hex_bytes("123"), "2301");
    }
}
