use bytes::Bytes;
use std::fmt;

/// Identifier a flow is registered under.
///
/// Backed by `Bytes`, so handing a name to a helper task, an error or
/// a log line bumps a reference count instead of copying the text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FlowName(Bytes);

impl FlowName {
    /// Raw bytes of the name.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for FlowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for FlowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlowName({})", self)
    }
}

impl From<&str> for FlowName {
    fn from(s: &str) -> Self {
        Self(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for FlowName {
    fn from(s: String) -> Self {
        Self(Bytes::from(s))
    }
}

impl From<Bytes> for FlowName {
    fn from(b: Bytes) -> Self {
        Self(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_lossy_utf8() {
        assert_eq!(FlowName::from("outbound").to_string(), "outbound");

        let raw = FlowName::from(Bytes::from_static(b"\xffbin"));
        assert_eq!(raw.to_string(), "\u{fffd}bin");
    }

    #[test]
    fn test_clones_share_the_backing_bytes() {
        let a = FlowName::from("flow");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes().as_ptr(), b.as_bytes().as_ptr());
    }
}
