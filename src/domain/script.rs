// ============================================================
// Layer 3 - Script Groups
// ============================================================
// A script group is a named bundle of characters belonging to
// one writing system. Two of them (latin, cyrillic) ship with
// hand-curated per-language letter lists. The rest are too
// large to curate and come from pre-generated files, looked up
// by the file stems returned from `ScriptGroup::data_files`.
//
// A selector is an ordered set of groups. "all" expands to every
// group; anything unrecognised is rejected rather than ignored so
// a typo can never silently shrink a vocabulary.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::{VocabError, VocabResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScriptGroup {
    Latin,
    Cyrillic,
    Cjk,
    Arabic,
    Devanagari,
}

impl ScriptGroup {
    pub const ALL: [ScriptGroup; 5] = [
        ScriptGroup::Latin,
        ScriptGroup::Cyrillic,
        ScriptGroup::Cjk,
        ScriptGroup::Arabic,
        ScriptGroup::Devanagari,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScriptGroup::Latin      => "latin",
            ScriptGroup::Cyrillic   => "cyrillic",
            ScriptGroup::Cjk        => "cjk",
            ScriptGroup::Arabic     => "arabic",
            ScriptGroup::Devanagari => "devanagari",
        }
    }

    /// Stems of the pre-generated files this group reads.
    /// Empty for latin, which is fully curated.
    pub fn data_files(self) -> &'static [&'static str] {
        match self {
            ScriptGroup::Latin      => &[],
            ScriptGroup::Cyrillic   => &["cyrillic"],
            ScriptGroup::Cjk        => &["chinese", "japanese", "korean"],
            ScriptGroup::Arabic     => &["arabic"],
            ScriptGroup::Devanagari => &["devanagari"],
        }
    }

    /// The hand-curated character set, if the group has one.
    pub fn curated_set(self) -> Option<BTreeSet<char>> {
        let lists: &[&[&str]] = match self {
            ScriptGroup::Latin    => LATIN_LANGUAGES,
            ScriptGroup::Cyrillic => CYRILLIC_LANGUAGES,
            _ => return None,
        };
        Some(
            lists
                .iter()
                .flat_map(|lang| lang.iter())
                .flat_map(|entry| entry.chars())
                .collect(),
        )
    }

    fn valid_names() -> String {
        let mut names: Vec<&str> = Self::ALL.iter().map(|g| g.name()).collect();
        names.push(ALL_SELECTOR);
        names.join(", ")
    }
}

impl fmt::Display for ScriptGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScriptGroup {
    type Err = VocabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.name() == wanted)
            .ok_or_else(|| VocabError::UnknownScriptGroup {
                name:  s.to_string(),
                valid: Self::valid_names(),
            })
    }
}

const ALL_SELECTOR: &str = "all";

/// The set of groups a vocabulary is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSelector {
    groups: BTreeSet<ScriptGroup>,
}

impl ScriptSelector {
    pub fn all() -> Self {
        Self { groups: ScriptGroup::ALL.into_iter().collect() }
    }

    pub fn only(groups: impl IntoIterator<Item = ScriptGroup>) -> Self {
        Self { groups: groups.into_iter().collect() }
    }

    /// Parse names such as `["latin", "cyrillic"]` or `["all"]`.
    /// Names may also be comma separated inside a single entry.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> VocabResult<Self> {
        let mut groups = BTreeSet::new();
        for raw in names {
            for name in raw.as_ref().split(',').map(str::trim).filter(|n| !n.is_empty()) {
                if name.eq_ignore_ascii_case(ALL_SELECTOR) {
                    groups.extend(ScriptGroup::ALL);
                } else {
                    groups.insert(name.parse::<ScriptGroup>()?);
                }
            }
        }
        Ok(Self { groups })
    }

    pub fn groups(&self) -> impl Iterator<Item = ScriptGroup> + '_ {
        self.groups.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl fmt::Display for ScriptSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.groups.iter().map(|g| g.name()).collect();
        f.write_str(&names.join(","))
    }
}

// ─── Curated Latin accents ───────────────────────────────────────────────────
// Only the letters beyond a-z; the base set covers plain ASCII.

const SPANISH:    &[&str] = &["á", "é", "í", "ó", "ú", "ü", "ñ"];
const FRENCH:     &[&str] = &["à", "â", "ä", "ç", "è", "é", "ê", "ë", "î", "ï", "ô", "ö", "ù", "û", "ü", "ÿ", "œ"];
const ITALIAN:    &[&str] = &["à", "è", "é", "ì", "í", "î", "ò", "ó", "ù", "ú"];
const PORTUGUESE: &[&str] = &["á", "à", "â", "ã", "ä", "ç", "é", "ê", "í", "ó", "ô", "õ", "ú", "ü"];
const GERMAN:     &[&str] = &["ä", "ö", "ü", "ß"];
const DUTCH:      &[&str] = &[
    "á", "à", "é", "è", "í", "ì", "ó", "ò", "ú", "ù", "ë", "ï", "ö", "ü", "ç", "ñ", "ê", "ô", "û",
    "â", "î", "ä",
];
const SWEDISH:    &[&str] = &["å", "ä", "ö", "é", "ü"];
const NORWEGIAN:  &[&str] = &["æ", "ø", "å", "é", "è", "ê", "ó", "ò", "ô", "à", "á", "ü"];
const FILIPINO:   &[&str] = &["á", "à", "â", "é", "è", "ê", "í", "ì", "î", "ó", "ò", "ô", "ú", "ù", "û", "ñ"];
const SWAHILI:    &[&str] = &["á", "é", "í", "ó", "ú", "ñ"];
// Uzbek digraphs contribute each of their code points.
const UZBEK:      &[&str] = &["ʻ", "gʻ", "oʻ", "ş", "ç", "aʻ", "eʻ", "iʻ", "uʻ"];

const LATIN_LANGUAGES: &[&[&str]] = &[
    SPANISH, FRENCH, ITALIAN, PORTUGUESE, GERMAN, DUTCH, SWEDISH, NORWEGIAN, FILIPINO, SWAHILI,
    UZBEK,
];

// ─── Curated Cyrillic alphabets ──────────────────────────────────────────────

const RUSSIAN: &[&str] = &[
    "а", "б", "в", "г", "д", "е", "ё", "ж", "з", "и", "й", "к", "л", "м", "н", "о", "п", "р", "с",
    "т", "у", "ф", "х", "ц", "ч", "ш", "щ", "ъ", "ы", "ь", "э", "ю", "я",
];
const UKRAINIAN: &[&str] = &[
    "а", "б", "в", "г", "ґ", "д", "е", "є", "ж", "з", "и", "і", "ї", "й", "к", "л", "м", "н", "о",
    "п", "р", "с", "т", "у", "ф", "х", "ц", "ч", "ш", "щ", "ь", "ю", "я",
];
const BULGARIAN: &[&str] = &[
    "а", "б", "в", "г", "д", "е", "ж", "з", "и", "й", "к", "л", "м", "н", "о", "п", "р", "с", "т",
    "у", "ф", "х", "ц", "ч", "ш", "щ", "ъ", "ь", "ю", "я",
];
const SERBIAN: &[&str] = &[
    "а", "б", "в", "г", "д", "ђ", "е", "ж", "з", "и", "ј", "к", "л", "љ", "м", "н", "њ", "о", "п",
    "р", "с", "т", "ћ", "у", "ф", "х", "ц", "ч", "џ", "ш",
];
const MACEDONIAN: &[&str] = &[
    "а", "б", "в", "г", "д", "ѓ", "е", "ж", "з", "ѕ", "и", "ј", "к", "л", "љ", "м", "н", "њ", "о",
    "п", "р", "с", "т", "ќ", "у", "ф", "х", "ц", "ч", "џ", "ш",
];
const BELARUSIAN: &[&str] = &[
    "а", "б", "в", "г", "д", "е", "ё", "ж", "з", "і", "й", "к", "л", "м", "н", "о", "п", "р", "с",
    "т", "у", "ў", "ф", "х", "ц", "ч", "ш", "ы", "ь", "э", "ю", "я",
];

const CYRILLIC_LANGUAGES: &[&[&str]] =
    &[RUSSIAN, UKRAINIAN, BULGARIAN, SERBIAN, MACEDONIAN, BELARUSIAN];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_expands_to_every_group() {
        let sel = ScriptSelector::from_names(&["all"]).unwrap();
        assert_eq!(sel.groups().count(), ScriptGroup::ALL.len());
        assert_eq!(sel, ScriptSelector::all());
    }

    #[test]
    fn test_comma_separated_names() {
        let sel = ScriptSelector::from_names(&["latin, Cyrillic"]).unwrap();
        let groups: Vec<ScriptGroup> = sel.groups().collect();
        assert_eq!(groups, vec![ScriptGroup::Latin, ScriptGroup::Cyrillic]);
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = ScriptSelector::from_names(&["latin", "klingon"]).unwrap_err();
        match err {
            VocabError::UnknownScriptGroup { name, valid } => {
                assert_eq!(name, "klingon");
                assert!(valid.contains("devanagari"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_uzbek_digraphs_split_into_code_points() {
        let latin = ScriptGroup::Latin.curated_set().unwrap();
        assert!(latin.contains(&'ʻ'));
        assert!(latin.contains(&'g'));
        assert!(latin.contains(&'ß'));
    }

    #[test]
    fn test_cyrillic_union_deduplicates() {
        let cyr = ScriptGroup::Cyrillic.curated_set().unwrap();
        // Shared letters appear once; national letters are all present.
        assert_eq!(cyr.iter().filter(|&&c| c == 'а').count(), 1);
        for c in ['ё', 'ґ', 'ђ', 'ѓ', 'ѕ', 'ў'] {
            assert!(cyr.contains(&c), "missing {c}");
        }
    }

    #[test]
    fn test_file_backed_groups_have_no_curated_set() {
        assert!(ScriptGroup::Cjk.curated_set().is_none());
        assert!(ScriptGroup::Arabic.curated_set().is_none());
        assert_eq!(ScriptGroup::Cjk.data_files().len(), 3);
    }
}
