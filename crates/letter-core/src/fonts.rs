//! Logical font name → typeface asset URL.

use crate::constants::DEFAULT_FONT_KEY;

/// One entry of the known-font table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontEntry {
    pub key: &'static str,
    pub display_name: &'static str,
    /// Path relative to the font base URL.
    pub path: &'static str,
}

pub const KNOWN_FONTS: &[FontEntry] = &[
    FontEntry {
        key: "helvetiker_bold",
        display_name: "Helvetiker Bold",
        path: "helvetiker_bold.typeface.json",
    },
    FontEntry {
        key: "helvetiker_regular",
        display_name: "Helvetiker Regular",
        path: "helvetiker_regular.typeface.json",
    },
    FontEntry {
        key: "optimer_bold",
        display_name: "Optimer Bold",
        path: "optimer_bold.typeface.json",
    },
    FontEntry {
        key: "optimer_regular",
        display_name: "Optimer Regular",
        path: "optimer_regular.typeface.json",
    },
    FontEntry {
        key: "gentilis_bold",
        display_name: "Gentilis Bold",
        path: "gentilis_bold.typeface.json",
    },
    FontEntry {
        key: "gentilis_regular",
        display_name: "Gentilis Regular",
        path: "gentilis_regular.typeface.json",
    },
    FontEntry {
        key: "droid_sans",
        display_name: "Droid Sans",
        path: "droid/droid_sans_regular.typeface.json",
    },
    FontEntry {
        key: "droid_sans_bold",
        display_name: "Droid Sans Bold",
        path: "droid/droid_sans_bold.typeface.json",
    },
    FontEntry {
        key: "droid_serif",
        display_name: "Droid Serif",
        path: "droid/droid_serif_regular.typeface.json",
    },
    FontEntry {
        key: "droid_serif_bold",
        display_name: "Droid Serif Bold",
        path: "droid/droid_serif_bold.typeface.json",
    },
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedFont {
    /// Table key, or the raw input when it was used as a URL.
    pub key: String,
    pub url: String,
    /// The input was unknown or empty and the default font was substituted.
    pub fallback: bool,
}

#[derive(Clone, Debug)]
pub struct FontResolver {
    base_url: String,
}

impl FontResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.is_empty() && !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_url }
    }

    pub fn lookup(key: &str) -> Option<&'static FontEntry> {
        let key = key.trim();
        KNOWN_FONTS.iter().find(|f| f.key.eq_ignore_ascii_case(key))
    }

    fn default_entry() -> &'static FontEntry {
        // The default key is always the first table entry.
        &KNOWN_FONTS[0]
    }

    /// Resolve a logical font name or a direct asset URL.
    pub fn resolve(&self, name_or_url: &str) -> ResolvedFont {
        let input = name_or_url.trim();
        if looks_like_url(input) {
            return ResolvedFont {
                key: input.to_string(),
                url: input.to_string(),
                fallback: false,
            };
        }
        let lookup_key = if input.eq_ignore_ascii_case("default") {
            DEFAULT_FONT_KEY
        } else {
            input
        };
        match Self::lookup(lookup_key) {
            Some(entry) => ResolvedFont {
                key: entry.key.to_string(),
                url: format!("{}{}", self.base_url, entry.path),
                fallback: false,
            },
            None => {
                if !input.is_empty() {
                    log::warn!("[font] unknown font '{}', using default", input);
                }
                let entry = Self::default_entry();
                ResolvedFont {
                    key: entry.key.to_string(),
                    url: format!("{}{}", self.base_url, entry.path),
                    fallback: true,
                }
            }
        }
    }
}

#[inline]
fn looks_like_url(s: &str) -> bool {
    s.contains('/') || s.ends_with(".json")
}
