//! Country reference data: the name→ISO3 table used to key the local file,
//! display names for the focus countries, and the structural group tags
//! that feed the score bonuses.
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};
use unicode_normalization::UnicodeNormalization;

static NAME_TO_ISO3: &[(&str, &str)] = &[
    ("united states", "USA"), ("canada", "CAN"), ("mexico", "MEX"), ("guatemala", "GTM"),
    ("honduras", "HND"), ("costa rica", "CRI"), ("panama", "PAN"), ("brazil", "BRA"),
    ("argentina", "ARG"), ("chile", "CHL"), ("colombia", "COL"), ("peru", "PER"),
    ("venezuela", "VEN"), ("ecuador", "ECU"), ("bolivia", "BOL"), ("uruguay", "URY"),
    ("paraguay", "PRY"), ("germany", "DEU"), ("france", "FRA"), ("italy", "ITA"),
    ("spain", "ESP"), ("netherlands", "NLD"), ("belgium", "BEL"), ("switzerland", "CHE"),
    ("austria", "AUT"), ("sweden", "SWE"), ("norway", "NOR"), ("denmark", "DNK"),
    ("finland", "FIN"), ("ireland", "IRL"), ("united kingdom", "GBR"), ("luxembourg", "LUX"),
    ("iceland", "ISL"), ("portugal", "PRT"), ("poland", "POL"), ("czech republic", "CZE"),
    ("hungary", "HUN"), ("romania", "ROU"), ("bulgaria", "BGR"), ("slovak republic", "SVK"),
    ("estonia", "EST"), ("latvia", "LVA"), ("lithuania", "LTU"), ("serbia", "SRB"),
    ("south africa", "ZAF"), ("egypt", "EGY"), ("nigeria", "NGA"), ("kenya", "KEN"),
    ("morocco", "MAR"), ("tunisia", "TUN"), ("ghana", "GHA"), ("cameroon", "CMR"),
    ("ethiopia", "ETH"), ("uganda", "UGA"), ("cote d'ivoire", "CIV"), ("senegal", "SEN"),
    ("togo", "TGO"), ("burkina faso", "BFA"), ("mali", "MLI"), ("tanzania", "TZA"),
    ("mozambique", "MOZ"), ("zambia", "ZMB"), ("sudan", "SDN"), ("namibia", "NAM"),
    ("zimbabwe", "ZWE"), ("turkey", "TUR"), ("saudi arabia", "SAU"), ("israel", "ISR"),
    ("jordan", "JOR"), ("lebanon", "LBN"), ("qatar", "QAT"), ("united arab emirates", "ARE"),
    ("kuwait", "KWT"), ("japan", "JPN"), ("korea", "KOR"), ("china", "CHN"), ("singapore", "SGP"),
    ("indonesia", "IDN"), ("thailand", "THA"), ("philippines", "PHL"), ("malaysia", "MYS"),
    ("vietnam", "VNM"), ("australia", "AUS"), ("india", "IND"), ("pakistan", "PAK"),
    ("bangladesh", "BGD"), ("sri lanka", "LKA"), ("nepal", "NPL"), ("maldives", "MDV"),
    ("cuba", "CUB"), ("haiti", "HTI"), ("jamaica", "JAM"), ("papua new guinea", "PNG"),
];

static ISO3_BY_NAME: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| NAME_TO_ISO3.iter().copied().collect());

/// Countries tracked over the long history window, with display names.
pub const FOCUS_COUNTRIES: &[(&str, &str)] = &[
    ("USA", "États-Unis"),
    ("DEU", "Allemagne"),
    ("FRA", "France"),
    ("JPN", "Japon"),
    ("CAN", "Canada"),
    ("IND", "Inde"),
    ("BRA", "Brésil"),
    ("ZAF", "Afrique du Sud"),
    ("IDN", "Indonésie"),
    ("MAR", "Maroc"),
];

/// Lower-case, trim and strip diacritics so "Côte d'Ivoire" and
/// "cote d'ivoire" land on the same key.
pub fn normalize_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| c.is_ascii())
        .collect()
}

/// ISO3 code for a country name as written in the local file.
pub fn iso3_for_name(raw: &str) -> Option<&'static str> {
    ISO3_BY_NAME.get(normalize_name(raw).as_str()).copied()
}

/// Every ISO3 code of the scoring universe, deduplicated and sorted.
pub fn scoring_universe() -> Vec<String> {
    let set: BTreeSet<&str> = NAME_TO_ISO3.iter().map(|(_, code)| *code).collect();
    set.into_iter().map(str::to_string).collect()
}

pub fn focus_codes() -> Vec<String> {
    FOCUS_COUNTRIES.iter().map(|(code, _)| code.to_string()).collect()
}

pub fn display_name(iso3: &str) -> Option<&'static str> {
    FOCUS_COUNTRIES
        .iter()
        .find(|(code, _)| *code == iso3)
        .map(|(_, name)| *name)
}

/// Structural tags carried by a country.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CountryTags {
    pub reserve_currency: bool,
    pub safe_haven: bool,
    pub euro_core: bool,
    pub developed: bool,
}

/// One structural tag, as used by the score weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    ReserveCurrency,
    SafeHaven,
    EuroCore,
    Developed,
}

impl CountryTags {
    pub fn has(&self, tag: Tag) -> bool {
        match tag {
            Tag::ReserveCurrency => self.reserve_currency,
            Tag::SafeHaven => self.safe_haven,
            Tag::EuroCore => self.euro_core,
            Tag::Developed => self.developed,
        }
    }
}

/// Membership table for the structural tags. `Default` is the production
/// table; tests build their own with `from_lists`.
#[derive(Debug, Clone)]
pub struct CountryGroups {
    tags: HashMap<String, CountryTags>,
}

const RESERVE_CURRENCY: &[&str] = &["USA"];
const SAFE_HAVEN: &[&str] = &["CHE", "NOR", "DNK", "SGP", "DEU"];
const EURO_CORE: &[&str] = &["DEU", "FRA", "NLD", "FIN", "IRL"];
const DEVELOPED: &[&str] = &[
    "USA", "DEU", "FRA", "JPN", "CAN", "GBR", "ITA", "ESP", "NLD", "AUS", "CHE",
    "SWE", "NOR", "DNK", "FIN", "IRL", "KOR", "SGP", "CZE", "PRT", "ISR",
];

impl CountryGroups {
    pub fn from_lists(
        reserve_currency: &[&str],
        safe_haven: &[&str],
        euro_core: &[&str],
        developed: &[&str],
    ) -> Self {
        let mut tags: HashMap<String, CountryTags> = HashMap::new();
        for c in reserve_currency {
            tags.entry(c.to_string()).or_default().reserve_currency = true;
        }
        for c in safe_haven {
            tags.entry(c.to_string()).or_default().safe_haven = true;
        }
        for c in euro_core {
            tags.entry(c.to_string()).or_default().euro_core = true;
        }
        for c in developed {
            tags.entry(c.to_string()).or_default().developed = true;
        }
        Self { tags }
    }

    pub fn tags(&self, iso3: &str) -> CountryTags {
        self.tags.get(iso3).copied().unwrap_or_default()
    }
}

impl Default for CountryGroups {
    fn default() -> Self {
        Self::from_lists(RESERVE_CURRENCY, SAFE_HAVEN, EURO_CORE, DEVELOPED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_matched_without_accents_or_case() {
        assert_eq!(iso3_for_name("Côte d'Ivoire"), Some("CIV"));
        assert_eq!(iso3_for_name("  UNITED States "), Some("USA"));
        assert_eq!(iso3_for_name("Atlantis"), None);
    }

    #[test]
    fn universe_is_sorted_and_unique() {
        let u = scoring_universe();
        assert!(u.windows(2).all(|w| w[0] < w[1]));
        assert!(u.contains(&"PNG".to_string()));
    }

    #[test]
    fn default_groups_tag_germany_three_ways() {
        let g = CountryGroups::default();
        let deu = g.tags("DEU");
        assert!(deu.safe_haven && deu.euro_core && deu.developed);
        assert!(!deu.reserve_currency);
        assert!(g.tags("USA").reserve_currency);
        assert_eq!(g.tags("MAR"), CountryTags::default());
    }

    #[test]
    fn focus_countries_have_display_names() {
        for code in focus_codes() {
            assert!(display_name(&code).is_some());
        }
        assert_eq!(display_name("CHE"), None);
    }
}
