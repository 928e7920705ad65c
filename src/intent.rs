//! Question intent parsing
//!
//! Free text is matched against a fixed, ordered list of phrasing templates.
//! Each template is a matcher that either builds a populated
//! [`QuestionIntent`] or declines; the first matcher that accepts wins and
//! no later template is consulted. A question no template accepts becomes
//! [`QuestionIntent::Unknown`] carrying a usage hint.
//!
//! States are recognized only from a closed whitelist of Indian states and
//! union territories; crop names are captured permissively and title-cased.

use crate::normalize::normalize_name;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whitelist of state/UT names the parser can recognize (lower case).
pub const STATES: &[&str] = &[
    "andaman and nicobar islands",
    "andhra pradesh",
    "arunachal pradesh",
    "assam",
    "bihar",
    "chandigarh",
    "chhattisgarh",
    "dadra and nagar haveli and daman and diu",
    "delhi",
    "goa",
    "gujarat",
    "haryana",
    "himachal pradesh",
    "jammu and kashmir",
    "jharkhand",
    "karnataka",
    "kerala",
    "ladakh",
    "lakshadweep",
    "madhya pradesh",
    "maharashtra",
    "manipur",
    "meghalaya",
    "mizoram",
    "nagaland",
    "odisha",
    "puducherry",
    "punjab",
    "rajasthan",
    "sikkim",
    "tamil nadu",
    "telangana",
    "tripura",
    "uttar pradesh",
    "uttarakhand",
    "west bengal",
];

/// Window used by the national trend template
pub const NATIONAL_TREND_YEARS: usize = 10;

/// Crops listed per state when the rainfall question does not say "top M"
pub const DEFAULT_TOP_CROPS: usize = 3;

pub const USAGE_HINT: &str = "Try:\n\
- 'Which district in Maharashtra has the highest production of Sugarcane in 2014?'\n\
- 'Top 5 crops in Karnataka'\n\
- 'Analyze trend/correlation for crop Rice in India'\n\
- 'Compare rainfall in Karnataka and Tamil Nadu for last 5 years and top 3 crops' (requires subdivision rainfall)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremeMode {
    Highest,
    Lowest,
}

impl ExtremeMode {
    /// Map a captured mode word; `max` and `min` are synonyms.
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "highest" | "max" => Some(ExtremeMode::Highest),
            "lowest" | "min" => Some(ExtremeMode::Lowest),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExtremeMode::Highest => "Highest",
            ExtremeMode::Lowest => "Lowest",
        }
    }
}

impl fmt::Display for ExtremeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A parsed question. Exactly one is produced per question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionIntent {
    /// District with max/min production of a crop in one state and year
    #[serde(rename = "district_extremes_one")]
    DistrictExtremeOne {
        crop: String,
        state: String,
        year: i64,
        mode: ExtremeMode,
    },

    /// Highest-producing district in `state1` vs lowest-producing in `state2`
    #[serde(rename = "district_extremes_two")]
    DistrictExtremeTwo {
        crop: String,
        state1: String,
        state2: String,
        year: Option<i64>,
    },

    /// Average rainfall over the last `years` years plus the top `top` crops
    /// of each state in the same window
    #[serde(rename = "rainfall_compare_topcrops")]
    RainfallCompareTopCrops {
        state1: String,
        state2: String,
        years: usize,
        top: usize,
    },

    /// National production trend for a crop correlated with national rainfall
    #[serde(rename = "india_trend_corr")]
    IndiaTrendCorrelation { crop: String, years: usize },

    /// Top crops of a state in its most recent year
    #[serde(rename = "top_crops_state_latest")]
    TopCropsStateLatest { state: String, top: usize },

    #[serde(rename = "unknown")]
    Unknown { hint: String },
}

impl QuestionIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            QuestionIntent::DistrictExtremeOne { .. } => "district_extremes_one",
            QuestionIntent::DistrictExtremeTwo { .. } => "district_extremes_two",
            QuestionIntent::RainfallCompareTopCrops { .. } => "rainfall_compare_topcrops",
            QuestionIntent::IndiaTrendCorrelation { .. } => "india_trend_corr",
            QuestionIntent::TopCropsStateLatest { .. } => "top_crops_state_latest",
            QuestionIntent::Unknown { .. } => "unknown",
        }
    }

    pub fn unknown() -> Self {
        QuestionIntent::Unknown {
            hint: USAGE_HINT.to_string(),
        }
    }
}

type Matcher = fn(&str) -> Option<QuestionIntent>;

/// One phrasing template: a name for logs and the matcher that builds the intent
pub struct Template {
    pub name: &'static str,
    matcher: Matcher,
}

impl Template {
    pub fn try_match(&self, question: &str) -> Option<QuestionIntent> {
        (self.matcher)(question)
    }
}

/// Templates in priority order. Earlier entries win.
pub static TEMPLATES: &[Template] = &[
    Template { name: "district_extremes_state_first", matcher: match_extreme_state_first },
    Template { name: "district_extremes_crop_first", matcher: match_extreme_crop_first },
    Template { name: "district_extremes_two_states", matcher: match_extreme_two_states },
    Template { name: "rainfall_compare_topcrops", matcher: match_rainfall_compare },
    Template { name: "india_trend_corr", matcher: match_national_trend },
    Template { name: "top_crops_state_latest", matcher: match_top_crops },
];

fn state_alternation() -> String {
    format!("(?:{})", STATES.join("|"))
}

lazy_static! {
    static ref EXTREME_STATE_FIRST: Regex = Regex::new(&format!(
        r"district\s+in\s+(?P<state>{s}).*?(?P<mode>highest|lowest|max|min).*?production\s+of\s+(?P<crop>.+?)\s+(?:in|for)?\s+(?P<year>\d{{4}})",
        s = state_alternation()
    ))
    .expect("state-first template compiles");

    static ref EXTREME_CROP_FIRST: Regex = Regex::new(&format!(
        r"district.*?(?P<mode>highest|lowest|max|min).*?production\s+of\s+(?P<crop>.+?)\s+in\s+(?P<state>{s})\s+(?:in|for)?\s+(?P<year>\d{{4}})",
        s = state_alternation()
    ))
    .expect("crop-first template compiles");

    // The crop phrase ends at an optional "in/for <year>" and a joining word
    // before the second district clause.
    static ref EXTREME_TWO_STATES: Regex = Regex::new(&format!(
        r"district\s+in\s+(?P<state1>{s}).*?(?:highest|max).*?production\s+of\s+(?P<crop>[a-z][a-z ()\-/&]*?)(?:\s+(?:in|for)\s+(?P<year>\d{{4}}))?(?:\s*,|\s+(?:and|vs\.?|versus|compared|while|whereas|but)).*?district\s+(?:in|of)\s+(?P<state2>{s}).*?(?:lowest|min).*?production",
        s = state_alternation()
    ))
    .expect("two-state template compiles");

    static ref RAINFALL_COMPARE: Regex = Regex::new(&format!(
        r"compare.*?rainfall.*?(?P<state1>{s}).*?(?P<state2>{s}).*?last\s+(?P<years>\d+)",
        s = state_alternation()
    ))
    .expect("rainfall template compiles");

    static ref TOP_M: Regex = Regex::new(r"top\s+(?P<top>\d+)").expect("top-M phrase compiles");

    static ref NATIONAL_TREND: Regex = Regex::new(
        r"(?:trend|correlate|correlation).*?crop\s+(?P<crop>[a-z][a-z ()\-/]+?)\s+.*?(?:india|national)"
    )
    .expect("trend template compiles");

    static ref TOP_CROPS: Regex = Regex::new(&format!(
        r"top\s+(?P<top>\d+)\s+crops.*?(?P<state>{s})",
        s = state_alternation()
    ))
    .expect("top-crops template compiles");
}

/// Parse a question into exactly one intent.
pub fn parse_question(question: &str) -> QuestionIntent {
    let lowered = question.trim().to_lowercase();
    TEMPLATES
        .iter()
        .find_map(|template| template.try_match(&lowered))
        .unwrap_or_else(QuestionIntent::unknown)
}

/// Name of the first template accepting the question, if any
pub fn matching_template(question: &str) -> Option<&'static str> {
    let lowered = question.trim().to_lowercase();
    TEMPLATES
        .iter()
        .find(|template| template.try_match(&lowered).is_some())
        .map(|template| template.name)
}

fn capture<'t>(caps: &Captures<'t>, name: &str) -> Option<&'t str> {
    caps.name(name).map(|m| m.as_str())
}

fn capture_number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Option<T> {
    capture(caps, name)?.parse().ok()
}

fn district_extreme_one(caps: Captures<'_>) -> Option<QuestionIntent> {
    Some(QuestionIntent::DistrictExtremeOne {
        crop: normalize_name(capture(&caps, "crop")?),
        state: normalize_name(capture(&caps, "state")?),
        year: capture_number(&caps, "year")?,
        mode: ExtremeMode::from_word(capture(&caps, "mode")?)?,
    })
}

fn match_extreme_state_first(question: &str) -> Option<QuestionIntent> {
    district_extreme_one(EXTREME_STATE_FIRST.captures(question)?)
}

fn match_extreme_crop_first(question: &str) -> Option<QuestionIntent> {
    district_extreme_one(EXTREME_CROP_FIRST.captures(question)?)
}

fn match_extreme_two_states(question: &str) -> Option<QuestionIntent> {
    let caps = EXTREME_TWO_STATES.captures(question)?;
    let year = match capture(&caps, "year") {
        Some(raw) => Some(raw.parse().ok()?),
        None => None,
    };
    Some(QuestionIntent::DistrictExtremeTwo {
        crop: normalize_name(capture(&caps, "crop")?),
        state1: normalize_name(capture(&caps, "state1")?),
        state2: normalize_name(capture(&caps, "state2")?),
        year,
    })
}

fn match_rainfall_compare(question: &str) -> Option<QuestionIntent> {
    let caps = RAINFALL_COMPARE.captures(question)?;
    let top = match TOP_M.captures(question) {
        Some(top_caps) => capture_number(&top_caps, "top")?,
        None => DEFAULT_TOP_CROPS,
    };
    Some(QuestionIntent::RainfallCompareTopCrops {
        state1: normalize_name(capture(&caps, "state1")?),
        state2: normalize_name(capture(&caps, "state2")?),
        years: capture_number(&caps, "years")?,
        top,
    })
}

fn match_national_trend(question: &str) -> Option<QuestionIntent> {
    let caps = NATIONAL_TREND.captures(question)?;
    Some(QuestionIntent::IndiaTrendCorrelation {
        crop: normalize_name(capture(&caps, "crop")?),
        years: NATIONAL_TREND_YEARS,
    })
}

fn match_top_crops(question: &str) -> Option<QuestionIntent> {
    let caps = TOP_CROPS.captures(question)?;
    Some(QuestionIntent::TopCropsStateLatest {
        state: normalize_name(capture(&caps, "state")?),
        top: capture_number(&caps, "top")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(crop: &str, state: &str, year: i64, mode: ExtremeMode) -> QuestionIntent {
        QuestionIntent::DistrictExtremeOne {
            crop: crop.to_string(),
            state: state.to_string(),
            year,
            mode,
        }
    }

    #[test]
    fn test_state_before_crop() {
        let intent = parse_question("Which district in Maharashtra has the highest production of Sugarcane in 2014?");
        assert_eq!(intent, one("Sugarcane", "Maharashtra", 2014, ExtremeMode::Highest));
    }

    #[test]
    fn test_phrase_order_gives_same_intent() {
        let state_first = parse_question("Which district in Tamil Nadu has the lowest production of rice in 2012");
        let crop_first = parse_question("Which district has the lowest production of rice in Tamil Nadu in 2012");
        assert_eq!(state_first, crop_first);
        assert_eq!(state_first, one("Rice", "Tamil Nadu", 2012, ExtremeMode::Lowest));
        assert_eq!(
            matching_template("Which district has the lowest production of rice in Tamil Nadu in 2012"),
            Some("district_extremes_crop_first")
        );
    }

    #[test]
    fn test_max_min_synonyms() {
        assert_eq!(
            parse_question("district in kerala with max production of coconut for 2010"),
            one("Coconut", "Kerala", 2010, ExtremeMode::Highest)
        );
        assert_eq!(
            parse_question("district in kerala with min production of coconut in 2010"),
            one("Coconut", "Kerala", 2010, ExtremeMode::Lowest)
        );
    }

    #[test]
    fn test_two_states_without_year() {
        let intent = parse_question(
            "Identify the district in Karnataka with the highest production of rice and compare it with the district in Tamil Nadu with the lowest production",
        );
        assert_eq!(
            intent,
            QuestionIntent::DistrictExtremeTwo {
                crop: "Rice".to_string(),
                state1: "Karnataka".to_string(),
                state2: "Tamil Nadu".to_string(),
                year: None,
            }
        );
    }

    #[test]
    fn test_two_states_beats_rainfall_template() {
        let question = "Compare rainfall: district in Punjab with max production of wheat vs district of Bihar with min production over the last 5 years";
        assert!(RAINFALL_COMPARE.is_match(&question.to_lowercase()));
        assert_eq!(
            parse_question(question),
            QuestionIntent::DistrictExtremeTwo {
                crop: "Wheat".to_string(),
                state1: "Punjab".to_string(),
                state2: "Bihar".to_string(),
                year: None,
            }
        );
    }

    #[test]
    fn test_year_directly_after_crop_prefers_single_state() {
        let intent = parse_question(
            "district in punjab with highest production of wheat in 2015 and district in bihar with lowest production",
        );
        assert_eq!(intent, one("Wheat", "Punjab", 2015, ExtremeMode::Highest));
    }

    #[test]
    fn test_rainfall_compare_with_and_without_top() {
        assert_eq!(
            parse_question("Compare rainfall in Karnataka and Tamil Nadu for last 5 years and top 3 crops"),
            QuestionIntent::RainfallCompareTopCrops {
                state1: "Karnataka".to_string(),
                state2: "Tamil Nadu".to_string(),
                years: 5,
                top: 3,
            }
        );
        assert_eq!(
            parse_question("compare the rainfall of gujarat against uttar pradesh over the last 7 years"),
            QuestionIntent::RainfallCompareTopCrops {
                state1: "Gujarat".to_string(),
                state2: "Uttar Pradesh".to_string(),
                years: 7,
                top: DEFAULT_TOP_CROPS,
            }
        );
    }

    #[test]
    fn test_national_trend() {
        assert_eq!(
            parse_question("Analyze trend/correlation for crop Rice in India"),
            QuestionIntent::IndiaTrendCorrelation {
                crop: "Rice".to_string(),
                years: NATIONAL_TREND_YEARS,
            }
        );
        assert_eq!(
            parse_question("correlate crop cotton(lint) with national rainfall"),
            QuestionIntent::IndiaTrendCorrelation {
                crop: "Cotton(Lint)".to_string(),
                years: NATIONAL_TREND_YEARS,
            }
        );
    }

    #[test]
    fn test_top_crops() {
        assert_eq!(
            parse_question("Top 5 crops in Karnataka"),
            QuestionIntent::TopCropsStateLatest {
                state: "Karnataka".to_string(),
                top: 5,
            }
        );
    }

    #[test]
    fn test_unknown_carries_hint() {
        match parse_question("asdkjasd") {
            QuestionIntent::Unknown { hint } => {
                assert_eq!(hint, USAGE_HINT);
                assert_eq!(hint.matches("\n- ").count(), 4);
            }
            other => panic!("expected unknown, got {:?}", other),
        }
        assert_eq!(matching_template("asdkjasd"), None);
    }

    #[test]
    fn test_unlisted_state_not_recognized() {
        assert_eq!(parse_question("top 3 crops in atlantis"), QuestionIntent::unknown());
    }

    #[test]
    fn test_oversized_number_falls_through() {
        assert_eq!(
            parse_question("top 99999999999999999999999 crops in kerala"),
            QuestionIntent::unknown()
        );
    }

    #[test]
    fn test_intent_serializes_with_type_tag() {
        let json = serde_json::to_value(one("Rice", "Kerala", 2011, ExtremeMode::Lowest)).unwrap();
        assert_eq!(json["type"], "district_extremes_one");
        assert_eq!(json["mode"], "lowest");
    }
}
