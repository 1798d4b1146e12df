//! Mode registry - fixture mode names to engine translation flags

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Translation mode flags understood by the transcription engine.
    ///
    /// The bit values match the engine's `translationModes` constants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TranslationMode: u32 {
        /// Do not use contractions
        const NO_CONTRACTIONS = 1;
        /// Computer braille for the word under the cursor
        const COMPBRL_AT_CURSOR = 2;
        /// Input/output as dot patterns
        const DOTS_IO = 4;
        /// Eight-dot computer braille
        const COMP8_DOTS = 8;
        /// Only run the first translation pass
        const PASS1_ONLY = 16;
        /// Computer braille left of the cursor
        const COMPBRL_LEFT_CURSOR = 32;
        /// Use the alternate translation
        const OTHER_TRANS = 64;
        /// Output Unicode braille patterns
        const UC_BRL = 128;
    }
}

/// Fixture name of each mode, in registry order.
const REGISTRY: [(&str, TranslationMode); 8] = [
    ("noContractions", TranslationMode::NO_CONTRACTIONS),
    ("compbrlAtCursor", TranslationMode::COMPBRL_AT_CURSOR),
    ("dotsIO", TranslationMode::DOTS_IO),
    ("comp8Dots", TranslationMode::COMP8_DOTS),
    ("pass1Only", TranslationMode::PASS1_ONLY),
    ("compbrlLeftCursor", TranslationMode::COMPBRL_LEFT_CURSOR),
    ("otherTrans", TranslationMode::OTHER_TRANS),
    ("ucBrl", TranslationMode::UC_BRL),
];

impl TranslationMode {
    /// Resolve a fixture mode name (e.g. `"noContractions"`).
    ///
    /// Names are case-sensitive, as written in fixture files.
    pub fn lookup(name: &str) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, mode)| *mode)
    }

    /// All registered fixture mode names.
    pub fn names() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().map(|(name, _)| *name)
    }

    /// Fixture names of the flags set in this mode.
    pub fn fixture_names(&self) -> Vec<&'static str> {
        REGISTRY
            .iter()
            .filter(|(_, mode)| self.contains(*mode))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0");
        }
        write!(f, "{}", self.fixture_names().join("|"))
    }
}
