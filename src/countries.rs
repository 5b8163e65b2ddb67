//! Countries
//!
//! Country hints arrive from the request context in whatever shape the caller
//! had to hand: an ISO code (`"IN"`), a full name (`"India"`), a name in odd
//! casing, or nothing at all. The resolver turns a hint into [`CountryKeys`],
//! the canonical lowercase forms the price resolver compares country price
//! entries against.
//!
//! The code table is plain configuration owned by the resolver. The built-in
//! table covers ISO 3166-1 alpha-2 codes for the markets the engine is
//! commonly deployed in, plus a handful of alpha-3 codes and aliases.

use rustc_hash::FxHashMap;

/// Built-in code to country name table, used by [`CountryResolver::default`].
const DEFAULT_COUNTRY_CODES: &[(&str, &str)] = &[
    ("ae", "united arab emirates"),
    ("ar", "argentina"),
    ("at", "austria"),
    ("au", "australia"),
    ("bd", "bangladesh"),
    ("be", "belgium"),
    ("br", "brazil"),
    ("ca", "canada"),
    ("ch", "switzerland"),
    ("cl", "chile"),
    ("cn", "china"),
    ("co", "colombia"),
    ("cz", "czech republic"),
    ("de", "germany"),
    ("dk", "denmark"),
    ("eg", "egypt"),
    ("es", "spain"),
    ("fi", "finland"),
    ("fr", "france"),
    ("gb", "united kingdom"),
    ("gr", "greece"),
    ("hk", "hong kong"),
    ("id", "indonesia"),
    ("ie", "ireland"),
    ("il", "israel"),
    ("in", "india"),
    ("it", "italy"),
    ("jp", "japan"),
    ("ke", "kenya"),
    ("kr", "south korea"),
    ("kw", "kuwait"),
    ("lk", "sri lanka"),
    ("mx", "mexico"),
    ("my", "malaysia"),
    ("ng", "nigeria"),
    ("nl", "netherlands"),
    ("no", "norway"),
    ("np", "nepal"),
    ("nz", "new zealand"),
    ("om", "oman"),
    ("ph", "philippines"),
    ("pk", "pakistan"),
    ("pl", "poland"),
    ("pt", "portugal"),
    ("qa", "qatar"),
    ("ru", "russia"),
    ("sa", "saudi arabia"),
    ("se", "sweden"),
    ("sg", "singapore"),
    ("th", "thailand"),
    ("tr", "turkey"),
    ("tw", "taiwan"),
    ("ua", "ukraine"),
    ("uk", "united kingdom"),
    ("us", "united states"),
    ("usa", "united states"),
    ("gbr", "united kingdom"),
    ("ind", "india"),
    ("are", "united arab emirates"),
    ("vn", "vietnam"),
    ("za", "south africa"),
];

/// Lowercase and trim a country name or code for comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Canonical comparison keys for a country hint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountryKeys {
    literal: String,
    expanded: Option<String>,
}

impl CountryKeys {
    /// The hint itself, normalized. Empty when no hint was given.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// The country name the hint expands to, when the hint is a known code.
    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    /// Whether the hint was empty.
    pub fn is_empty(&self) -> bool {
        self.literal.is_empty()
    }

    /// All non-empty keys, literal first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.literal.as_str())
            .chain(self.expanded.as_deref())
            .filter(|key| !key.is_empty())
    }
}

/// Resolves country hints against a code table.
#[derive(Debug, Clone)]
pub struct CountryResolver {
    codes: FxHashMap<String, String>,
}

impl CountryResolver {
    /// Create a resolver from `(code, country name)` pairs.
    ///
    /// Codes and names are normalized on the way in.
    pub fn new<C, N>(codes: impl IntoIterator<Item = (C, N)>) -> Self
    where
        C: AsRef<str>,
        N: AsRef<str>,
    {
        let codes = codes
            .into_iter()
            .map(|(code, name)| (normalize(code.as_ref()), normalize(name.as_ref())))
            .filter(|(code, name)| !code.is_empty() && !name.is_empty())
            .collect();

        Self { codes }
    }

    /// A resolver with an empty code table; every hint is matched literally.
    pub fn literal_only() -> Self {
        Self {
            codes: FxHashMap::default(),
        }
    }

    /// Resolve a hint into comparison keys. Never fails.
    pub fn resolve(&self, hint: &str) -> CountryKeys {
        let literal = normalize(hint);
        let expanded = self
            .codes
            .get(&literal)
            .filter(|name| **name != literal)
            .cloned();

        CountryKeys { literal, expanded }
    }

    /// Expand a single code, if known.
    pub fn expand(&self, code: &str) -> Option<&str> {
        self.codes.get(&normalize(code)).map(String::as_str)
    }

    /// Number of known codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the code table is empty.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for CountryResolver {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_CODES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_code_case_insensitively() {
        let resolver = CountryResolver::default();

        let keys = resolver.resolve(" In ");

        assert_eq!(keys.literal(), "in");
        assert_eq!(keys.expanded(), Some("india"));
        assert_eq!(keys.iter().collect::<Vec<_>>(), vec!["in", "india"]);
    }

    #[test]
    fn full_names_are_kept_literally() {
        let resolver = CountryResolver::default();

        let keys = resolver.resolve("Germany");

        assert_eq!(keys.literal(), "germany");
        assert_eq!(keys.expanded(), None);
    }

    #[test]
    fn unknown_hints_fall_back_to_the_literal() {
        let resolver = CountryResolver::default();

        let keys = resolver.resolve("Atlantis");

        assert_eq!(keys.iter().collect::<Vec<_>>(), vec!["atlantis"]);
    }

    #[test]
    fn empty_hint_yields_no_keys() {
        let resolver = CountryResolver::default();

        let keys = resolver.resolve("   ");

        assert!(keys.is_empty());
        assert_eq!(keys.iter().count(), 0);
    }

    #[test]
    fn custom_table_replaces_the_default() {
        let resolver = CountryResolver::new([("XK", "Kosovo")]);

        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.expand("xk"), Some("kosovo"));
        assert_eq!(resolver.resolve("IN").expanded(), None);
    }

    #[test]
    fn literal_only_resolver_never_expands() {
        let resolver = CountryResolver::literal_only();

        assert!(resolver.is_empty());
        assert_eq!(resolver.resolve("US").expanded(), None);
    }

    #[test]
    fn aliases_expand_to_the_same_country() {
        let resolver = CountryResolver::default();

        assert_eq!(resolver.expand("UK"), resolver.expand("GB"));
        assert_eq!(resolver.expand("USA"), Some("united states"));
    }
}
