use crate::badge::BadgeTag;
use crate::error::LookupError;
use crate::models::ArticleSummary;
use regex::Regex;

/// Ordered badge rules. First match wins, so specific categories come first.
const BADGE_RULES: &[(BadgeTag, &[&str])] = &[
    (BadgeTag::HistoricDistrict, &["historic district", "historic districts"]),
    (BadgeTag::NrhpSite, &["national register of historic places", "nrhp"]),
    (
        BadgeTag::HistoricHouse,
        &["historic house", "house museum", "mansion", "plantation", "homestead", "manor house"],
    ),
    (BadgeTag::ZooAquarium, &["zoo", "aquarium", "zoological park", "zoological garden"]),
    (
        BadgeTag::Museum,
        &["museum", "art gallery", "gallery", "science center", "heritage center"],
    ),
    (
        BadgeTag::University,
        &["university", "college", "institute of technology", "polytechnic"],
    ),
    (BadgeTag::Library, &["library"]),
    (BadgeTag::Airport, &["airport", "airfield", "air base", "aerodrome"]),
    (
        BadgeTag::Stadium,
        &["stadium", "arena", "ballpark", "speedway", "coliseum", "velodrome"],
    ),
    (BadgeTag::Bridge, &["bridge", "viaduct", "covered bridge"]),
    (BadgeTag::Waterfall, &["waterfall", "waterfalls", "cascades"]),
    (BadgeTag::Dam, &["dam"]),
    (BadgeTag::Lake, &["lake", "reservoir", "pond"]),
    (BadgeTag::River, &["river", "creek", "stream", "tributary"]),
    (BadgeTag::Mill, &["mill", "mills", "gristmill", "textile mill"]),
    (
        BadgeTag::Theater,
        &[
            "theater",
            "theatre",
            "opera house",
            "amphitheater",
            "amphitheatre",
            "concert hall",
            "auditorium",
        ],
    ),
    (
        BadgeTag::ReligiousSite,
        &[
            "church",
            "cathedral",
            "chapel",
            "basilica",
            "mosque",
            "synagogue",
            "temple",
            "monastery",
            "abbey",
            "shrine",
        ],
    ),
    (
        BadgeTag::FortCastle,
        &["fort", "fortress", "castle", "citadel", "fortification"],
    ),
    (
        BadgeTag::Monument,
        &["monument", "memorial", "statue", "obelisk", "battlefield"],
    ),
    (BadgeTag::Market, &["market", "marketplace", "bazaar", "market hall"]),
    (BadgeTag::TrailGreenway, &["trail", "greenway", "rail trail"]),
    (
        BadgeTag::FactoryMfg,
        &["factory", "manufacturing", "assembly plant", "brewery", "distillery", "foundry"],
    ),
    (
        BadgeTag::Park,
        &[
            "park",
            "state park",
            "national park",
            "botanical garden",
            "gardens",
            "nature preserve",
            "nature reserve",
            "wildlife refuge",
            "arboretum",
        ],
    ),
    (
        BadgeTag::Neighborhood,
        &["neighborhood", "neighbourhood", "suburb", "quarter"],
    ),
];

/// Government bodies, elections, offices and index articles. Checked against title and description.
const NON_PLACE_PHRASES: &[&str] = &[
    "mayor",
    "city council",
    "town council",
    "county council",
    "election",
    "elections",
    "referendum",
    "wikimedia list article",
    "legislature",
    "parliament",
    "political party",
    "school district",
    "police department",
    "fire department",
];

/// Office words that place descriptions legitimately use ("commune in the Var department"),
/// so they only disqualify through the title.
const NON_PLACE_TITLE_WORDS: &[&str] = &[
    "department",
    "agency",
    "ministry",
    "office of",
    "board of",
    "commission",
];

const BIOGRAPHY_MEDIA_WORDS: &[&str] = &[
    "actor",
    "actress",
    "singer",
    "rapper",
    "musician",
    "songwriter",
    "politician",
    "businessman",
    "businesswoman",
    "footballer",
    "athlete",
    "journalist",
    "writer",
    "author",
    "painter",
    "poet",
    "company",
    "corporation",
    "band",
    "film",
    "novel",
    "album",
    "song",
    "television series",
    "tv series",
    "video game",
    "software",
    "newspaper",
    "magazine",
    "radio station",
    "television station",
    "surname",
    "given name",
    "fictional character",
];

const GOVERNMENT_BODY_WORDS: &[&str] = &[
    "council",
    "legislature",
    "parliament",
    "board",
    "commission",
    "authority",
    "department",
];

const PLACE_HINT_WORDS: &[&str] = &[
    "city",
    "town",
    "village",
    "municipality",
    "capital",
    "country",
    "state",
    "province",
    "county",
    "district",
    "borough",
    "township",
    "hamlet",
    "commune",
    "prefecture",
    "metropolitan",
    "census-designated place",
    "unincorporated community",
    "settlement",
];

/// Overview and index articles ("History of Greer", "List of parks in ..."). Title prefix only.
const INDEX_TITLE: &str = r"^(?:lists?|index|outline|timeline|history|government|politics) of\b";

/// "City in Texas", "Independent city in Virginia", "Census-designated place in ...".
const SETTLEMENT_DESCRIPTION: &str = r"^((?:[a-z-]+\s+){0,2})(?:city|town|village|municipality|borough|township|hamlet|commune|census-designated place|unincorporated community|settlement)(?:\s+(?:in|of|and|on|near|within)\b|,|$)";

/// Words that mean the settlement phrase describes where something else is.
const SETTLEMENT_PREFIX_STOPWORDS: &[&str] = &[
    "in", "of", "on", "at", "near", "for", "from", "by", "with", "about", "within",
];

const COUNTRY_DESCRIPTION: &str =
    r"^(?:[a-z-]+\s+)?(?:country|sovereign state|sovereign country|nation|island country)\b";
const STATE_DESCRIPTION: &str =
    r"^(?:[a-z.-]+\s+)?(?:state|province|territory|region|constituent country)\b";
const COUNTY_DESCRIPTION: &str = r"^(?:[a-z-]+\s+)?(?:county|parish|shire)\s+(?:in|of)\b";

const PLACE_SHAPES: &[&str] = &[
    // "Greer, South Carolina"
    r"^[^,()]+,\s*[^,()]+$",
    // "Springfield (Illinois)"
    r"^[^()]+\s\([^()]+\)$",
    // "City of London"
    r"^(?i:city|town|village|borough|municipality) of\s+\p{Lu}",
    // "North Augusta", "St. Louis", "San Marcos"
    r"^(?i:north|south|east|west|new|old|upper|lower|saint|st\.?|ste\.?|san|santa|sao|são|fort|port|mount|mt\.?)\s+\p{Lu}",
    // one to four capitalized words
    r"^\p{Lu}[\p{L}'’.-]*(?:\s+\p{Lu}[\p{L}'’.-]*){0,3}$",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierConfig {
    /// Accept unbadged summaries whose title merely looks like a place name.
    pub accept_place_shaped_titles: bool,
}

/// Compiled rule table and blocklists for labelling article summaries.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(BadgeTag, Regex)>,
    non_place: Regex,
    non_place_title: Regex,
    index_title: Regex,
    biography_media: Regex,
    government_body: Regex,
    mayor_of: Regex,
    place_hint: Regex,
    settlement: Regex,
    country: Regex,
    state: Regex,
    county: Regex,
    place_shapes: Vec<Regex>,
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, LookupError> {
        let rules = BADGE_RULES
            .iter()
            .map(|(badge, words)| Ok((*badge, word_pattern(words)?)))
            .collect::<Result<Vec<_>, LookupError>>()?;

        let place_shapes = PLACE_SHAPES
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            rules,
            non_place: word_pattern(NON_PLACE_PHRASES)?,
            non_place_title: word_pattern(NON_PLACE_TITLE_WORDS)?,
            index_title: Regex::new(INDEX_TITLE)?,
            biography_media: word_pattern(BIOGRAPHY_MEDIA_WORDS)?,
            government_body: word_pattern(GOVERNMENT_BODY_WORDS)?,
            mayor_of: Regex::new(r"\bmayors? of\b")?,
            place_hint: word_pattern(PLACE_HINT_WORDS)?,
            settlement: Regex::new(SETTLEMENT_DESCRIPTION)?,
            country: Regex::new(COUNTRY_DESCRIPTION)?,
            state: Regex::new(STATE_DESCRIPTION)?,
            county: Regex::new(COUNTY_DESCRIPTION)?,
            place_shapes,
            config,
        })
    }

    pub fn detect_badge(&self, summary: &ArticleSummary) -> Option<BadgeTag> {
        let title = summary.title.trim().to_lowercase();
        let description = summary.description_text().trim().to_lowercase();

        if self.is_non_place(&title, &description) {
            return None;
        }

        // Settlement descriptions outrank POI words in the title ("Fort Worth", "College Station").
        if self.is_settlement(&description) && self.looks_like_place_name(&summary.title) {
            return Some(BadgeTag::Place);
        }

        if let Some((badge, _)) = self
            .rules
            .iter()
            .find(|(_, pattern)| pattern.is_match(&title) || pattern.is_match(&description))
        {
            return Some(*badge);
        }

        if self.county.is_match(&description) {
            return Some(BadgeTag::County);
        }
        if self.country.is_match(&description) {
            return Some(BadgeTag::Country);
        }
        if self.state.is_match(&description) {
            return Some(BadgeTag::StateProvince);
        }

        if self.place_hint.is_match(&description) && self.looks_like_place_name(&summary.title) {
            return Some(BadgeTag::Place);
        }

        None
    }

    pub fn is_admin(&self, summary: &ArticleSummary) -> bool {
        self.detect_badge(summary).is_some_and(BadgeTag::is_admin)
    }

    pub fn is_place_or_poi(&self, summary: &ArticleSummary) -> bool {
        if summary.is_disambiguation() {
            return false;
        }

        let title = summary.title.trim().to_lowercase();
        let description = summary.description_text().trim().to_lowercase();
        if self.biography_media.is_match(&description) || self.is_non_place(&title, &description) {
            return false;
        }

        if self.detect_badge(summary).is_some() {
            return true;
        }

        self.config.accept_place_shaped_titles && self.looks_like_place_name(&summary.title)
    }

    /// Surface-form check on the original-case title.
    pub fn looks_like_place_name(&self, title: &str) -> bool {
        let title = title.trim();
        !title.is_empty() && self.place_shapes.iter().any(|shape| shape.is_match(title))
    }

    pub fn is_government_body(&self, title: &str) -> bool {
        let lowered = title.trim().to_lowercase();
        self.government_body.is_match(&lowered) || self.mayor_of.is_match(&lowered)
    }

    fn is_non_place(&self, title: &str, description: &str) -> bool {
        self.non_place.is_match(title)
            || self.non_place.is_match(description)
            || self.non_place_title.is_match(title)
            || self.index_title.is_match(title)
    }

    fn is_settlement(&self, description: &str) -> bool {
        self.settlement
            .captures(description)
            .and_then(|captures| captures.get(1))
            .is_some_and(|prefix| {
                !prefix
                    .as_str()
                    .split_whitespace()
                    .any(|word| SETTLEMENT_PREFIX_STOPWORDS.contains(&word))
            })
    }
}

/// True for `"X, <city>"` titles naming a sub-place of the city rather than the city itself.
pub fn is_sub_place_of(title: &str, city: &str, place_name: &str) -> bool {
    let Some((prefix, suffix)) = title.split_once(',') else {
        return false;
    };

    let prefix = prefix.trim();
    let suffix = suffix.trim();
    let city = city.trim();
    let place_name = place_name.trim();

    if city.is_empty() || !suffix.eq_ignore_ascii_case(city) {
        return false;
    }

    !prefix.eq_ignore_ascii_case(city) && !prefix.eq_ignore_ascii_case(place_name)
}

fn word_pattern(words: &[&str]) -> Result<Regex, LookupError> {
    let alternatives = words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Regex::new(&format!(r"\b(?:{alternatives})\b"))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(ClassifierConfig::default()).expect("patterns should compile")
    }

    fn badge(title: &str, description: &str) -> Option<BadgeTag> {
        classifier().detect_badge(&ArticleSummary::new(title, description))
    }

    #[test]
    fn poi_rules_match_title_or_description() {
        assert_eq!(badge("Paris Museum of Art", "art museum"), Some(BadgeTag::Museum));
        assert_eq!(badge("Springfield River", "river in Illinois"), Some(BadgeTag::River));
        assert_eq!(badge("Poinsett Bridge", "Stone arch bridge"), Some(BadgeTag::Bridge));
        assert_eq!(
            badge("Clemson University", "Public university in South Carolina"),
            Some(BadgeTag::University)
        );
        assert_eq!(badge("Lake Robinson", "Reservoir in South Carolina"), Some(BadgeTag::Lake));
    }

    #[test]
    fn specific_rules_win_over_general_ones() {
        assert_eq!(
            badge("Greer Downtown Historic District", "historic district with a museum and park"),
            Some(BadgeTag::HistoricDistrict)
        );
        assert_eq!(
            badge("Whitehall", "historic house museum in Greenville"),
            Some(BadgeTag::HistoricHouse)
        );
        assert_eq!(
            badge("Riverbanks Zoo", "zoo and botanical garden"),
            Some(BadgeTag::ZooAquarium)
        );
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert_eq!(badge("Amsterdam", "Capital city of the Netherlands"), Some(BadgeTag::Place));
        assert_eq!(badge("Parkersburg", "City in West Virginia"), Some(BadgeTag::Place));
    }

    #[test]
    fn administrative_descriptions_become_admin_badges() {
        assert_eq!(
            badge("Greenville County, South Carolina", "County in South Carolina, United States"),
            Some(BadgeTag::County)
        );
        assert_eq!(badge("South Carolina", "U.S. state"), Some(BadgeTag::StateProvince));
        assert_eq!(badge("Ontario", "Province of Canada"), Some(BadgeTag::StateProvince));
        assert_eq!(
            badge("United States", "Country primarily located in North America"),
            Some(BadgeTag::Country)
        );
        assert_eq!(badge("France", "Sovereign state in Western Europe"), Some(BadgeTag::Country));
    }

    #[test]
    fn towns_inside_a_county_are_places_not_counties() {
        assert_eq!(
            badge("Greer, South Carolina", "City in Greenville County, South Carolina"),
            Some(BadgeTag::Place)
        );
    }

    #[test]
    fn place_needs_both_hint_and_place_shaped_title() {
        assert_eq!(badge("greer", "city in south carolina"), None);
        assert_eq!(badge("Greer", "a surname of Scottish origin"), None);
        assert_eq!(badge("Greer", "City in South Carolina"), Some(BadgeTag::Place));
    }

    #[test]
    fn blocklisted_topics_never_get_a_badge() {
        assert_eq!(badge("Greer City Council", "legislative body of Greer"), None);
        assert_eq!(badge("List of museums in South Carolina", "museum list"), None);
        assert_eq!(badge("2020 Greer mayoral election", "municipal election"), None);
        assert_eq!(badge("Greer Police Department", "police department"), None);
        assert_eq!(badge("South Carolina Department of Parks", "state agency"), None);
    }

    #[test]
    fn cities_named_after_landmarks_are_places() {
        for (title, description) in [
            ("Fort Worth, Texas", "City in Texas, United States"),
            ("College Station, Texas", "City in Texas, United States"),
            ("Park City, Utah", "City in Utah, United States"),
            ("Falls Church, Virginia", "Independent city in Virginia, United States"),
            ("Mill Valley, California", "City in California, United States"),
        ] {
            assert_eq!(badge(title, description), Some(BadgeTag::Place), "{title}");
        }
    }

    #[test]
    fn settlement_words_inside_a_poi_description_keep_the_poi_badge() {
        assert_eq!(
            badge("Greer City Park", "Public park in the city of Greer"),
            Some(BadgeTag::Park)
        );
        assert_eq!(
            badge("Poinsett Bridge", "Stone bridge near the town of Travelers Rest"),
            Some(BadgeTag::Bridge)
        );
        assert_eq!(
            badge("Cleveland Park", "Park in town of Greenville"),
            Some(BadgeTag::Park)
        );
        assert_eq!(
            badge("Upcountry History Museum", "Museum about the town of Greenville"),
            Some(BadgeTag::Museum)
        );
    }

    #[test]
    fn history_in_a_description_does_not_block_a_museum() {
        let classifier = classifier();
        for (title, description) in [
            ("Upcountry History Museum", "Museum about the history of upstate South Carolina"),
            ("Museum of the History of Science, Oxford", "Museum in Oxford, England"),
        ] {
            let summary = ArticleSummary::new(title, description);
            assert_eq!(classifier.detect_badge(&summary), Some(BadgeTag::Museum), "{title}");
            assert!(classifier.is_place_or_poi(&summary), "{title}");
        }
    }

    #[test]
    fn overview_articles_are_blocked_by_title_prefix() {
        assert_eq!(badge("History of Greer, South Carolina", "City in South Carolina"), None);
        assert_eq!(badge("Timeline of Chicago", "City in Illinois"), None);
        assert_eq!(badge("Politics of Texas", "state politics"), None);
        assert_eq!(badge("Lists of parks", "Wikimedia list article"), None);
    }

    #[test]
    fn office_words_in_descriptions_do_not_block_places() {
        assert_eq!(
            badge("Draguignan", "Commune in Var department, France"),
            Some(BadgeTag::Place)
        );
    }

    #[test]
    fn detect_badge_is_deterministic() {
        let classifier = classifier();
        let summary = ArticleSummary::new("Greer Station", "Historic district in Greer");
        let first = classifier.detect_badge(&summary);
        for _ in 0..5 {
            assert_eq!(classifier.detect_badge(&summary), first);
        }
    }

    #[test]
    fn is_admin_agrees_with_detected_badge() {
        let classifier = classifier();
        let samples = [
            ArticleSummary::new("Spartanburg County, South Carolina", "County in South Carolina"),
            ArticleSummary::new("South Carolina", "U.S. state"),
            ArticleSummary::new("Canada", "Country in North America"),
            ArticleSummary::new("Greer, South Carolina", "City in South Carolina"),
            ArticleSummary::new("BMW Zentrum", "automobile museum"),
            ArticleSummary::new("Taylor Swift", "American singer-songwriter"),
        ];

        for summary in &samples {
            let admin_badge = classifier
                .detect_badge(summary)
                .is_some_and(|badge| BadgeTag::ADMIN.contains(&badge));
            assert_eq!(classifier.is_admin(summary), admin_badge, "{}", summary.title);
        }
    }

    #[test]
    fn people_media_and_disambiguation_are_not_places() {
        let classifier = classifier();
        assert!(!classifier.is_place_or_poi(&ArticleSummary::new(
            "Greer Garson",
            "British-American actress"
        )));
        assert!(!classifier.is_place_or_poi(&ArticleSummary::new(
            "Museum (film)",
            "2018 film"
        )));

        let mut disambiguation = ArticleSummary::new("Greer", "Topics referred to by the same term");
        disambiguation.page_type = Some("disambiguation".to_string());
        assert!(!classifier.is_place_or_poi(&disambiguation));

        assert!(classifier.is_place_or_poi(&ArticleSummary::new(
            "Upcountry History Museum",
            "History museum in Greenville, South Carolina"
        )));
    }

    #[test]
    fn place_shaped_escape_hatch_is_opt_in() {
        let strict = classifier();
        let loose = Classifier::new(ClassifierConfig {
            accept_place_shaped_titles: true,
        })
        .expect("patterns should compile");
        let summary = ArticleSummary::new("Taylors, South Carolina", "");

        assert!(!strict.is_place_or_poi(&summary));
        assert!(loose.is_place_or_poi(&summary));
    }

    #[test]
    fn place_name_shapes() {
        let classifier = classifier();
        assert!(classifier.looks_like_place_name("Greer, South Carolina"));
        assert!(classifier.looks_like_place_name("Springfield (Illinois)"));
        assert!(classifier.looks_like_place_name("City of London"));
        assert!(classifier.looks_like_place_name("St. Louis"));
        assert!(classifier.looks_like_place_name("Chicago"));
        assert!(!classifier.looks_like_place_name("the quick brown fox"));
        assert!(!classifier.looks_like_place_name(""));
    }

    #[test]
    fn government_bodies_are_recognised_by_title() {
        let classifier = classifier();
        assert!(classifier.is_government_body("Greer City Council"));
        assert!(classifier.is_government_body("Mayor of Chicago"));
        assert!(classifier.is_government_body("Chicago Transit Authority"));
        assert!(!classifier.is_government_body("Greer, South Carolina"));
    }

    #[test]
    fn sub_places_of_the_city_are_detected() {
        assert!(is_sub_place_of("New City, Chicago", "Chicago", "Chicago"));
        assert!(!is_sub_place_of("New City, Chicago", "Chicago", "New City"));
        assert!(!is_sub_place_of("Chicago, Illinois", "Chicago", "Chicago"));
        assert!(!is_sub_place_of("Chicago", "Chicago", "Chicago"));
        assert!(!is_sub_place_of("Hyde Park, London", "", "Hyde Park"));
    }
}
