//! Output text bounded by a byte capacity.

#[derive(Debug)]
pub(crate) struct BoundedOutput {
    text: String,
    capacity: usize,
    truncated: bool,
}

impl BoundedOutput {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity.min(4096)),
            capacity,
            truncated: false,
        }
    }

    /// Appends as much of `s` as fits. Returns `false` once anything had to be
    /// cut; every later push is ignored.
    pub(crate) fn push_str(&mut self, s: &str) -> bool {
        if self.truncated {
            return false;
        }
        let remaining = self.capacity - self.text.len();
        if s.len() <= remaining {
            self.text.push_str(s);
            return true;
        }

        let mut cut = remaining;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.text.push_str(&s[..cut]);
        self.truncated = true;
        false
    }

    pub(crate) fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn into_string(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::BoundedOutput;

    #[test]
    fn exact_fit_is_not_truncation() {
        let mut out = BoundedOutput::new(3);
        assert!(out.push_str("ab"));
        assert!(out.push_str("c"));
        assert!(out.push_str(""));
        assert!(!out.is_truncated());
        assert_eq!(out.into_string(), "abc");
    }

    #[test]
    fn cuts_at_char_boundary_and_ignores_later_pushes() {
        let mut out = BoundedOutput::new(2);
        assert!(!out.push_str("héllo"));
        assert!(out.is_truncated());
        assert!(!out.push_str("x"));
        assert_eq!(out.into_string(), "h");
    }

    #[test]
    fn zero_capacity_accepts_nothing() {
        let mut out = BoundedOutput::new(0);
        assert!(!out.push_str("a"));
        assert_eq!(out.capacity(), 0);
        assert_eq!(out.into_string(), "");
    }
}
