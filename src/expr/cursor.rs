//! Forward-only character cursor over expression source text.

#[derive(Debug, Clone)]
/// Read position into an expression substring.
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned at the first byte of `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the next unread character.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Unread remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes and returns the next character.
    pub fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Consumes the next character only when it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// Consumes the longest numeric prefix at the cursor.
    ///
    /// Accepts an optional sign, digits with an optional decimal point and
    /// fraction, and an optional exponent. Returns `None` without moving when
    /// no digits are found.
    pub fn number(&mut self) -> Option<f64> {
        let rest = self.rest();
        let len = numeric_prefix_len(rest);
        if len == 0 {
            return None;
        }
        let value = rest[..len].parse::<f64>().ok()?;
        self.pos += len;
        Some(value)
    }
}

fn numeric_prefix_len(input: &str) -> usize {
    let bytes = input.as_bytes();
    let mut end = 0usize;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return 0;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    end
}

#[cfg(test)]
mod tests {
    use super::{numeric_prefix_len, Cursor};

    #[test]
    fn numeric_prefix_stops_at_first_non_numeric_byte() {
        assert_eq!(numeric_prefix_len("12+3"), 2);
        assert_eq!(numeric_prefix_len("-3.25*2"), 5);
        assert_eq!(numeric_prefix_len(".5)"), 2);
        assert_eq!(numeric_prefix_len("5."), 2);
        assert_eq!(numeric_prefix_len("1e3x"), 3);
        assert_eq!(numeric_prefix_len("2.5E-2"), 6);
    }

    #[test]
    fn numeric_prefix_leaves_dangling_exponent_and_sign() {
        assert_eq!(numeric_prefix_len("1e"), 1);
        assert_eq!(numeric_prefix_len("1e+"), 1);
        assert_eq!(numeric_prefix_len("-"), 0);
        assert_eq!(numeric_prefix_len("."), 0);
        assert_eq!(numeric_prefix_len("+.e1"), 0);
        assert_eq!(numeric_prefix_len("abc"), 0);
    }

    #[test]
    fn number_advances_exactly_past_consumed_text() {
        let mut cursor = Cursor::new("4.5e1 rest");
        assert_eq!(cursor.number(), Some(45.0));
        assert_eq!(cursor.pos(), 5);
        assert_eq!(cursor.rest(), " rest");

        let mut cursor = Cursor::new("(1)");
        assert_eq!(cursor.number(), None);
        assert_eq!(cursor.pos(), 0);
    }

    #[test]
    fn skip_whitespace_and_eat() {
        let mut cursor = Cursor::new(" \t )");
        cursor.skip_whitespace();
        assert!(!cursor.eat('('));
        assert!(cursor.eat(')'));
        assert!(cursor.is_at_end());
        assert_eq!(cursor.bump(), None);
    }
}
