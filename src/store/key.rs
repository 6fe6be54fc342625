use std::fmt;

/// Address of a persisted record.
///
/// Box keys render as `box_0001`; ids past 9999 print unpadded. Only the
/// canonical spelling parses, so `box_1` is not a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKey {
    Box(u32),
    Rejects,
}

const BOX_PREFIX: &str = "box_";
const REJECTS: &str = "rejects";

impl RecordKey {
    pub fn parse(s: &str) -> Option<Self> {
        if s == REJECTS {
            return Some(Self::Rejects);
        }
        let digits = s.strip_prefix(BOX_PREFIX)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let key = Self::Box(digits.parse().ok()?);
        (key.to_string() == s).then_some(key)
    }

    pub fn box_id(&self) -> Option<u32> {
        match self {
            Self::Box(id) => Some(*id),
            Self::Rejects => None,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Box(id) => write!(f, "{}{:04}", BOX_PREFIX, id),
            Self::Rejects => f.write_str(REJECTS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_keys_are_zero_padded() {
        assert_eq!(RecordKey::Box(1).to_string(), "box_0001");
        assert_eq!(RecordKey::Box(42).to_string(), "box_0042");
        assert_eq!(RecordKey::Box(12345).to_string(), "box_12345");
    }

    #[test]
    fn test_parse_inverts_display() {
        assert_eq!(RecordKey::parse("box_0007"), Some(RecordKey::Box(7)));
        assert_eq!(RecordKey::parse("box_12345"), Some(RecordKey::Box(12345)));
        assert_eq!(RecordKey::parse("rejects"), Some(RecordKey::Rejects));
    }

    #[test]
    fn test_parse_ignores_foreign_names() {
        assert_eq!(RecordKey::parse("box_"), None);
        assert_eq!(RecordKey::parse("box_12a"), None);
        assert_eq!(RecordKey::parse("box_+12"), None);
        assert_eq!(RecordKey::parse("box_1"), None);
        assert_eq!(RecordKey::parse("box_00001"), None);
        assert_eq!(RecordKey::parse("crate_0001"), None);
        assert_eq!(RecordKey::parse("notes"), None);
    }
}
