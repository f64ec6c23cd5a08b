//! Screen name identity (Section 3: "Screen name").

/// A user's identity, carrying both the form the client typed/displays and
/// the canonical form used for equality, hashing and registry lookup.
///
/// Canonicalization lowercases the name and strips spaces, matching AIM's
/// historical screen-name folding rules (`"Bob Smith"` and `"bobsmith"`
/// name the same account).
#[derive(Clone, Debug, Eq)]
pub struct ScreenName {
    display: String,
    canonical: String,
}

impl ScreenName {
    /// Build a `ScreenName` from the form a client displayed or typed.
    pub fn new(display: impl Into<String>) -> Self {
        let display = display.into();
        let canonical = canonicalize(&display);
        Self { display, canonical }
    }

    /// The form to show back to clients (TLV user info, chat rosters, ...).
    pub fn display(&self) -> &str {
        &self.display
    }

    /// The form used for registry keys and equality.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

fn canonicalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl PartialEq for ScreenName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl std::hash::Hash for ScreenName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl std::fmt::Display for ScreenName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<&str> for ScreenName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ScreenName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
