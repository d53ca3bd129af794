//! Collators: locale rules turned into sort keys.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use icu_casemap::{CaseMapper, CaseMapperBorrowed};
use icu_normalizer::{DecomposingNormalizer, DecomposingNormalizerBorrowed};

use super::scheme::{CollationScheme, Language, Strength};

fn case_mapper() -> &'static CaseMapperBorrowed<'static> {
    static CM: OnceLock<CaseMapperBorrowed<'static>> = OnceLock::new();
    CM.get_or_init(CaseMapper::new)
}

fn nfd() -> &'static DecomposingNormalizerBorrowed<'static> {
    static NFD: OnceLock<DecomposingNormalizerBorrowed<'static>> = OnceLock::new();
    NFD.get_or_init(DecomposingNormalizer::new_nfd)
}

const RING_ABOVE: char = '\u{030A}';
const DIAERESIS: char = '\u{0308}';
const TILDE: char = '\u{0303}';

/// Separates the levels of a sort key; below every weight.
const LEVEL_SEPARATOR: u32 = 0;
/// Ends the accents of one character on the secondary level.
const UNIT_END: u32 = 1;

fn is_combining(c: char) -> bool {
    matches!(
        c as u32,
        0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F
    )
}

#[inline]
fn primary_weight(c: char) -> u32 {
    (c as u32 + 1) << 2
}

/// Immutable comparison rules of one scheme.
///
/// Building a recipe is the expensive part of setting up a collator; the
/// comparator cache shares one recipe between all collators of a scheme.
#[derive(Debug)]
pub struct CollationRecipe {
    scheme: CollationScheme,
    strength: Strength,
    // (folded base, first accent) -> primary weight
    tailoring: HashMap<(char, Option<char>), u32>,
}

impl CollationRecipe {
    /// Builds the recipe of `scheme`.
    pub fn build(scheme: &CollationScheme) -> Self {
        let (strength, tailoring) = match scheme {
            CollationScheme::Binary => (Strength::Tertiary, HashMap::new()),
            CollationScheme::Locale {
                language, strength, ..
            } => (*strength, tailoring_for(*language)),
        };
        Self {
            scheme: scheme.clone(),
            strength,
            tailoring,
        }
    }

    /// The code point recipe.
    pub fn binary() -> Self {
        Self::build(&CollationScheme::Binary)
    }

    /// Returns the scheme.
    pub fn scheme(&self) -> &CollationScheme {
        &self.scheme
    }

    /// Returns true for code point order.
    pub fn is_binary(&self) -> bool {
        self.scheme.is_binary()
    }

    fn write_sort_key(&self, s: &str, out: &mut Vec<u8>) {
        out.clear();
        if self.is_binary() {
            out.extend_from_slice(s.as_bytes());
            return;
        }

        let decomposed = nfd().normalize(s);
        let chars: Vec<char> = decomposed.chars().collect();
        let mut primary: Vec<u32> = Vec::with_capacity(chars.len());
        let mut secondary: Vec<u32> = Vec::with_capacity(chars.len() * 2);
        let mut tertiary: Vec<u8> = Vec::with_capacity(chars.len());

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            i += 1;
            if is_combining(c) {
                // An accent with nothing to attach to sorts as a character.
                primary.push(primary_weight(c));
                secondary.push(UNIT_END);
                tertiary.push(0);
                continue;
            }

            let marks_start = i;
            while i < chars.len() && is_combining(chars[i]) {
                i += 1;
            }
            let mut marks = &chars[marks_start..i];

            let mut utf8 = [0u8; 4];
            let folded = case_mapper().fold_string(c.encode_utf8(&mut utf8));
            let mut folded_chars = folded.chars();
            let base = folded_chars.next().unwrap_or(c);
            let case = u8::from(c.is_uppercase());

            let weight = match marks.first() {
                Some(&mark) => match self.tailoring.get(&(base, Some(mark))) {
                    Some(&w) => {
                        marks = &marks[1..];
                        w
                    }
                    None => self.tailored_or_default(base),
                },
                None => self.tailored_or_default(base),
            };

            primary.push(weight);
            secondary.extend(marks.iter().map(|&m| m as u32 + 2));
            secondary.push(UNIT_END);
            tertiary.push(case);

            // Folding can expand one character into several.
            for extra in folded_chars {
                primary.push(self.tailored_or_default(extra));
                secondary.push(UNIT_END);
                tertiary.push(case);
            }
        }

        for w in &primary {
            out.extend_from_slice(&w.to_be_bytes());
        }
        if self.strength >= Strength::Secondary {
            out.extend_from_slice(&LEVEL_SEPARATOR.to_be_bytes());
            for w in &secondary {
                out.extend_from_slice(&w.to_be_bytes());
            }
        }
        if self.strength >= Strength::Tertiary {
            out.extend_from_slice(&LEVEL_SEPARATOR.to_be_bytes());
            out.extend_from_slice(&tertiary);
        }
    }

    fn tailored_or_default(&self, base: char) -> u32 {
        self.tailoring
            .get(&(base, None))
            .copied()
            .unwrap_or_else(|| primary_weight(base))
    }
}

fn tailoring_for(language: Language) -> HashMap<(char, Option<char>), u32> {
    let after_z = |k: u32| primary_weight('z') + k;
    let mut map = HashMap::new();
    match language {
        Language::Swedish | Language::Finnish => {
            map.insert(('a', Some(RING_ABOVE)), after_z(1));
            map.insert(('a', Some(DIAERESIS)), after_z(2));
            map.insert(('o', Some(DIAERESIS)), after_z(3));
        }
        Language::Danish | Language::Norwegian => {
            map.insert(('æ', None), after_z(1));
            map.insert(('ø', None), after_z(2));
            map.insert(('a', Some(RING_ABOVE)), after_z(3));
        }
        Language::Spanish => {
            map.insert(('n', Some(TILDE)), primary_weight('n') + 1);
        }
        _ => {}
    }
    map
}

/// A comparator for one caller.
///
/// Collators share their scheme's recipe and own the scratch buffers used
/// to build sort keys, so a collator is used by one thread at a time while
/// any number of them exist for the same scheme.
#[derive(Debug)]
pub struct Collator {
    name: String,
    id: u32,
    recipe: Arc<CollationRecipe>,
    left: Vec<u8>,
    right: Vec<u8>,
}

impl Collator {
    /// Creates a collator over a shared recipe.
    pub fn new(name: impl Into<String>, id: u32, recipe: Arc<CollationRecipe>) -> Self {
        Self {
            name: name.into(),
            id,
            recipe,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Returns the scheme name this collator was requested with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the scheme id (0 is binary).
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the shared recipe.
    pub fn recipe(&self) -> &Arc<CollationRecipe> {
        &self.recipe
    }

    /// Returns true if this collator compares code points.
    pub fn is_binary(&self) -> bool {
        self.recipe.is_binary()
    }

    /// Compares two strings.
    pub fn compare(&mut self, a: &str, b: &str) -> Ordering {
        if self.recipe.is_binary() {
            return a.cmp(b);
        }
        self.recipe.write_sort_key(a, &mut self.left);
        self.recipe.write_sort_key(b, &mut self.right);
        self.left.cmp(&self.right)
    }

    /// Returns true if the strings are equal at this collator's strength.
    pub fn equals(&mut self, a: &str, b: &str) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// Returns a byte key whose order matches [`compare`](Self::compare).
    pub fn sort_key(&mut self, s: &str) -> Vec<u8> {
        self.recipe.write_sort_key(s, &mut self.left);
        self.left.clone()
    }
}
