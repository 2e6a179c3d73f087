//! Input cursor and numeric prefix scanners.
//!
//! Whitespace is any byte `<= b' '`. The numeric scanners follow the C
//! library conventions the grammar notation was designed around: integers
//! accept an optional sign and a `0x` (hex) or leading `0` (octal) prefix,
//! floats are plain decimal with an optional exponent.

/// A cursor over one line of input.
#[derive(Debug, Clone, Copy)]
pub struct Input<'src> {
    text: &'src str,
    pos: usize,
}

impl<'src> Input<'src> {
    pub fn new(text: &'src str) -> Self {
        Self { text, pos: 0 }
    }

    /// The whole line.
    pub fn text(&self) -> &'src str {
        self.text
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Move the cursor. `pos` must be a char boundary inside the line.
    pub fn set_pos(&mut self, pos: usize) {
        debug_assert!(self.text.is_char_boundary(pos));
        self.pos = pos;
    }

    /// The unconsumed part of the line.
    pub fn rest(&self) -> &'src str {
        &self.text[self.pos..]
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    /// Consume `len` bytes.
    pub fn advance(&mut self, len: usize) {
        self.set_pos((self.pos + len).min(self.text.len()));
    }

    /// Skip whitespace; true if anything was skipped.
    pub fn skip_space(&mut self) -> bool {
        let skipped = self
            .rest()
            .bytes()
            .take_while(|&b| is_space(b))
            .count();
        self.pos += skipped;
        skipped > 0
    }

    /// Consume `lit` if the rest of the line starts with it.
    pub fn eat(&mut self, lit: &str) -> bool {
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            true
        } else {
            false
        }
    }
}

#[inline]
pub fn is_space(b: u8) -> bool {
    b <= b' '
}

fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Scan an integer prefix of `text`.
///
/// Leading whitespace is skipped. Returns the value and the number of bytes
/// consumed (whitespace included), or `None` when no digit was found. Values
/// outside the `i64` range saturate.
pub fn scan_integer(text: &str) -> Option<(i64, usize)> {
    let bytes = text.as_bytes();
    let mut i = bytes.iter().take_while(|&&b| is_c_space(b)).count();

    let negative = match bytes.get(i) {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let hex_prefix = bytes.get(i) == Some(&b'0')
        && matches!(bytes.get(i + 1), Some(b'x') | Some(b'X'))
        && bytes.get(i + 2).is_some_and(|b| b.is_ascii_hexdigit());
    let radix: u32 = if hex_prefix {
        i += 2;
        16
    } else if bytes.get(i) == Some(&b'0') {
        8
    } else {
        10
    };

    let start = i;
    let mut magnitude: i128 = 0;
    while let Some(d) = bytes.get(i).and_then(|&b| (b as char).to_digit(radix)) {
        magnitude = (magnitude * radix as i128 + d as i128).min(i64::MAX as i128 + 1);
        i += 1;
    }
    if i == start {
        return None;
    }

    let signed = if negative { -magnitude } else { magnitude };
    let value = signed.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
    Some((value, i))
}

/// Scan a decimal floating point prefix of `text`.
///
/// Leading whitespace is skipped. Accepts `[sign] digits [. digits] [e
/// [sign] digits]` with at least one mantissa digit on either side of the
/// point.
pub fn scan_float(text: &str) -> Option<(f64, usize)> {
    let bytes = text.as_bytes();
    let lead = bytes.iter().take_while(|&&b| is_c_space(b)).count();
    let mut i = lead;

    if matches!(bytes.get(i), Some(b'-') | Some(b'+')) {
        i += 1;
    }
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_digits = digits(i);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = digits(i + 1);
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e') | Some(b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'-') | Some(b'+')) {
            j += 1;
        }
        let exp_digits = digits(j);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    text[lead..i].parse::<f64>().ok().map(|v| (v, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_space_and_eat() {
        let mut input = Input::new("  ::= x");
        assert!(input.skip_space());
        assert!(!input.skip_space());
        assert!(input.eat("::="));
        assert_eq!(input.rest(), " x");
        assert!(!input.eat("y"));
    }

    #[test]
    fn test_scan_integer_bases() {
        assert_eq!(scan_integer("42"), Some((42, 2)));
        assert_eq!(scan_integer("  -17x"), Some((-17, 5)));
        assert_eq!(scan_integer("0x1F"), Some((31, 4)));
        assert_eq!(scan_integer("017"), Some((15, 3)));
        assert_eq!(scan_integer("08"), Some((0, 1)));
        assert_eq!(scan_integer("0x"), Some((0, 1)));
        assert_eq!(scan_integer("x"), None);
        assert_eq!(scan_integer("-"), None);
        assert_eq!(scan_integer(""), None);
    }

    #[test]
    fn test_scan_integer_saturates() {
        assert_eq!(scan_integer("99999999999999999999"), Some((i64::MAX, 20)));
        assert_eq!(scan_integer("-99999999999999999999"), Some((i64::MIN, 21)));
    }

    #[test]
    fn test_scan_float() {
        assert_eq!(scan_float("2.5"), Some((2.5, 3)));
        assert_eq!(scan_float(" .5 rest"), Some((0.5, 3)));
        assert_eq!(scan_float("1e3"), Some((1000.0, 3)));
        assert_eq!(scan_float("1e+"), Some((1.0, 1)));
        assert_eq!(scan_float("7."), Some((7.0, 2)));
        assert_eq!(scan_float("-1.25e-2"), Some((-0.0125, 8)));
        assert_eq!(scan_float("."), None);
        assert_eq!(scan_float("abc"), None);
    }
}
