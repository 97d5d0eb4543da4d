//! Curated UI strings: the synchronous fast path.
//!
//! These literals are compiled into the binary and never change at runtime.
//! They live in their own namespace: nothing here is ever written to, or read
//! from, the dynamic translation cache, and a lookup never touches the model
//! loader or the inference engine.

use crate::i18n::LanguageCode;
use std::collections::HashMap;
use std::sync::OnceLock;

// ==================== English Strings ====================

/// English UI strings (canonical)
///
/// Keys are the short labels used by UI code; most values are identical to
/// their key, except where the label is an abbreviation of a longer sentence.
pub const ENGLISH_STRINGS: &[(&str, &str)] = &[
    ("Smart Nutrition", "Smart Nutrition"),
    ("Eat Smart, Stay Fit, Stay Rooted", "Eat Smart, Stay Fit, Stay Rooted"),
    (
        "Discover personalized nutrition insights",
        "Discover personalized nutrition insights, authentic recipes, and cultural secrets for every dish. Your journey to mindful eating starts here.",
    ),
    ("Search dishes...", "Search dishes..."),
    ("Recipes", "Recipes"),
    ("Languages", "Languages"),
    ("Authentic", "Authentic"),
    ("Explore by Category", "Explore by Category"),
    ("Trending Dishes", "Trending Dishes"),
];

// ==================== Telugu Strings ====================

/// Telugu UI strings
pub const TELUGU_STRINGS: &[(&str, &str)] = &[
    ("Smart Nutrition", "స్మార్ట్ న్యూట్రిషన్"),
    (
        "Eat Smart, Stay Fit, Stay Rooted",
        "తెలివిగా తింటూ, ఫిట్‌గా ఉండండి, మూలాలను విస్మరించకండి",
    ),
    (
        "Discover personalized nutrition insights",
        "వ్యక్తిగత పోషణ అంతర్దృష్టులు, నిజమైన వంటకాలు మరియు ప్రతి వంటకం యొక్క సాంస్కృతిక రహస్యాలను కనుగొనండి. మీ స్పృహతో తినే ప్రయాణం ఇక్కడ ప్రారంభమవుతుంది.",
    ),
    ("Search dishes...", "వంటకాలను వెతకండి..."),
    ("Recipes", "వంటకాలు"),
    ("Languages", "భాషలు"),
    ("Authentic", "నిజమైన"),
    ("Explore by Category", "వర్గం ద్వారా అన్వేషించండి"),
    ("Trending Dishes", "ట్రెండింగ్ వంటకాలు"),
];

/// Immutable key → literal tables, one per language.
pub struct StaticDictionary {
    english: HashMap<&'static str, &'static str>,
    telugu: HashMap<&'static str, &'static str>,
}

static DICTIONARY: OnceLock<StaticDictionary> = OnceLock::new();

impl StaticDictionary {
    /// Get the global dictionary instance, building the lookup tables on first use.
    pub fn get() -> &'static StaticDictionary {
        DICTIONARY.get_or_init(|| StaticDictionary {
            english: ENGLISH_STRINGS.iter().copied().collect(),
            telugu: TELUGU_STRINGS.iter().copied().collect(),
        })
    }

    fn table(&self, language: LanguageCode) -> &HashMap<&'static str, &'static str> {
        match language {
            LanguageCode::English => &self.english,
            LanguageCode::Telugu => &self.telugu,
        }
    }

    /// Look up the curated literal for `key` in `language`.
    ///
    /// Unknown keys are not an error: the key itself is returned unchanged.
    pub fn lookup<'a>(&self, key: &'a str, language: LanguageCode) -> &'a str {
        match self.table(language).get(key) {
            Some(literal) => *literal,
            None => key,
        }
    }

    /// Check whether `key` has a curated literal in `language`.
    pub fn contains(&self, key: &str, language: LanguageCode) -> bool {
        self.table(language).contains_key(key)
    }
}

/// Synchronous fast-path lookup with identity fallback.
pub fn static_lookup(key: &str, language: LanguageCode) -> &str {
    StaticDictionary::get().lookup(key, language)
}
