//! Answer normalization and gold/predicted comparison.
//!
//! Gold results carry at most two variables: a value variable and optionally a
//! human-readable name variable (any key containing `name`). The value variable's key
//! selects how predicted values are cleaned and compared:
//!
//! | Gold key       | Predicted cleaning                                   | Equality        |
//! |----------------|------------------------------------------------------|-----------------|
//! | `targetValue`  | strip datatype and language tag; years if gold dated | exact set       |
//! | `answerSubset` | strip datatype, keep trailing path segment; years    | gold ⊆ predicted|
//! | `answer`       | as `answerSubset`                                    | exact set       |
//! | anything else  | none                                                 | exact set       |

use std::sync::OnceLock;

use indexmap::IndexSet;
use regex::Regex;

use crate::core::{is_date_value, strip_datatype, AggregatedResult};
use crate::error::{Error, Result};

/// Distinct answers, first-seen order preserved.
pub type AnswerSet = IndexSet<String>;

const TARGET_VALUE: &str = "targetValue";
const ANSWER_SUBSET: &str = "answerSubset";
const ANSWER: &str = "answer";
const MAX_VARIABLES: usize = 2;

/// Comparison mode, chosen once from the gold result's variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    /// Literal target values, possibly dates
    TargetValue,
    /// Gold entity ids must all appear among the predicted ones
    AnswerSubset,
    /// Gold entity ids must equal the predicted ones
    Answer,
    /// Raw value sets compared as they are
    Raw,
}

impl AnswerMode {
    /// Determines the mode for a gold result.
    pub fn detect(gold: &AggregatedResult) -> Result<Self> {
        Ok(GoldSelection::select(gold)?.mode)
    }
}

struct GoldSelection<'a> {
    mode: AnswerMode,
    variable: Option<&'a str>,
}

impl<'a> GoldSelection<'a> {
    fn select(gold: &'a AggregatedResult) -> Result<Self> {
        check_arity(gold, "gold")?;

        let mut target = None;
        let mut value = None;
        for key in gold.keys() {
            if key == TARGET_VALUE {
                target = Some(key.as_str());
            } else if !key.contains("name") {
                value = Some(key.as_str());
            }
        }

        if target.is_some() {
            return Ok(Self { mode: AnswerMode::TargetValue, variable: target });
        }
        let mode = match value {
            Some(ANSWER_SUBSET) => AnswerMode::AnswerSubset,
            Some(ANSWER) => AnswerMode::Answer,
            _ => AnswerMode::Raw,
        };
        Ok(Self { mode, variable: value })
    }

    /// Gold answers, reduced to years when every target value is date-typed.
    /// The flag reports whether that reduction happened.
    fn answers(&self, gold: &AggregatedResult) -> (AnswerSet, bool) {
        let values = self.variable.and_then(|var| gold.get(var)).cloned().unwrap_or_default();

        let dated = self.mode == AnswerMode::TargetValue
            && !values.is_empty()
            && values.iter().all(|value| is_date_value(value));
        if dated {
            (convert_dates_to_years(&values), true)
        } else {
            (values, false)
        }
    }
}

struct PredictedSelection<'a> {
    value: Option<&'a AnswerSet>,
    name: Option<&'a AnswerSet>,
}

impl<'a> PredictedSelection<'a> {
    fn select(predicted: &'a AggregatedResult) -> Result<Self> {
        check_arity(predicted, "predicted")?;

        let mut value = None;
        let mut name = None;
        for (key, values) in predicted {
            if !key.contains("name") {
                value = Some(values);
            } else if !values.is_empty() {
                name = Some(values);
            }
        }
        Ok(Self { value, name })
    }

    fn cleaned(&self, mode: AnswerMode, dated: bool) -> AnswerSet {
        match mode {
            AnswerMode::TargetValue => self
                .name
                .or(self.value)
                .map(|values| values.iter().map(|v| clean_target_value(v, dated)).collect())
                .unwrap_or_default(),
            AnswerMode::AnswerSubset | AnswerMode::Answer => self
                .value
                .map(|values| values.iter().map(|v| clean_entity(v)).collect())
                .unwrap_or_default(),
            AnswerMode::Raw => self.value.cloned().unwrap_or_default(),
        }
    }
}

fn check_arity(result: &AggregatedResult, role: &str) -> Result<()> {
    if result.len() > MAX_VARIABLES {
        return Err(Error::ContractViolation(format!(
            "Unknown target variable: {} result has {} variables, at most {} supported",
            role,
            result.len(),
            MAX_VARIABLES
        )));
    }
    Ok(())
}

fn is_empty_result(result: &AggregatedResult) -> bool {
    result.values().all(IndexSet::is_empty)
}

/// Cleaned gold and predicted answer sets, e.g. for an external scorer.
///
/// An empty predicted result yields an empty predicted set.
pub fn extract_clean_answers(
    gold: &AggregatedResult,
    predicted: &AggregatedResult,
) -> Result<(AnswerSet, AnswerSet)> {
    let selection = GoldSelection::select(gold)?;
    let (gold_answers, dated) = selection.answers(gold);

    if is_empty_result(predicted) {
        return Ok((gold_answers, AnswerSet::new()));
    }

    let predicted = PredictedSelection::select(predicted)?.cleaned(selection.mode, dated);
    Ok((gold_answers, predicted))
}

/// Whether the predicted result answers the gold result.
///
/// An empty predicted result is never equal, whatever the gold content. Results with
/// more than two variables are rejected with [`Error::ContractViolation`].
pub fn answers_equal(gold: &AggregatedResult, predicted: &AggregatedResult) -> Result<bool> {
    if is_empty_result(predicted) {
        return Ok(false);
    }

    let selection = GoldSelection::select(gold)?;
    let predicted = PredictedSelection::select(predicted)?;
    let (gold_answers, dated) = selection.answers(gold);
    let cleaned = predicted.cleaned(selection.mode, dated);

    Ok(match selection.mode {
        AnswerMode::AnswerSubset => gold_answers.is_subset(&cleaned),
        AnswerMode::TargetValue | AnswerMode::Answer | AnswerMode::Raw => {
            gold_answers.len() == cleaned.len() && gold_answers.is_subset(&cleaned)
        }
    })
}

/// Reduces date-typed values to their year; values that are not dates are dropped.
///
/// `2008-12-31^^<http://www.w3.org/2001/XMLSchema#dateTime>` becomes `2008`.
pub fn convert_dates_to_years(values: &AnswerSet) -> AnswerSet {
    values
        .iter()
        .filter(|value| is_date_value(value))
        .filter_map(|value| strip_datatype(value).split('-').next())
        .map(str::to_string)
        .collect()
}

fn year_pattern() -> &'static Regex {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"([0-9]{3,4})").expect("valid year pattern"))
}

fn language_tag_pattern() -> &'static Regex {
    static LANGUAGE_TAG: OnceLock<Regex> = OnceLock::new();
    LANGUAGE_TAG.get_or_init(|| Regex::new(r"@[a-zA-Z\-]+$").expect("valid language tag pattern"))
}

/// First 3-4 digit run, or the value unchanged when there is none.
fn leading_year(value: &str) -> String {
    year_pattern().find(value).map_or(value, |m| m.as_str()).to_string()
}

fn clean_target_value(value: &str, dated: bool) -> String {
    let value = language_tag_pattern().replace(strip_datatype(value), "");
    if dated {
        leading_year(&value)
    } else {
        value.into_owned()
    }
}

fn clean_entity(value: &str) -> String {
    let tail = path_tail(strip_datatype(value));
    if is_date_value(value) {
        leading_year(tail)
    } else {
        tail.to_string()
    }
}

/// Last `/`-separated segment, ignoring trailing separators.
fn path_tail(value: &str) -> &str {
    value.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(var: &str, values: &[&str]) -> AggregatedResult {
        let mut result = AggregatedResult::new();
        result.insert(var.to_string(), values.iter().map(|v| v.to_string()).collect());
        result
    }

    #[test]
    fn test_path_tail() {
        assert_eq!(path_tail("http://rdf.freebase.com/ns/m.017nt"), "m.017nt");
        assert_eq!(path_tail("http://rdf.freebase.com/ns/m.017nt/"), "m.017nt");
        assert_eq!(path_tail("m.017nt"), "m.017nt");
        assert_eq!(path_tail(""), "");
    }

    #[test]
    fn test_clean_target_value() {
        assert_eq!(clean_target_value("Chicago@en", false), "Chicago");
        assert_eq!(clean_target_value("Chicago@en-US", false), "Chicago");
        assert_eq!(
            clean_target_value("42^^<http://www.w3.org/2001/XMLSchema#integer>", false),
            "42"
        );
        assert_eq!(clean_target_value("1999-01-01", true), "1999");
        assert_eq!(clean_target_value("no year here", true), "no year here");
    }

    #[test]
    fn test_clean_entity_dates() {
        assert_eq!(
            clean_entity("1969-07-20^^<http://www.w3.org/2001/XMLSchema#dateTime>"),
            "1969"
        );
        assert_eq!(clean_entity("http://rdf.freebase.com/ns/en.1969"), "en.1969");
    }

    #[test]
    fn test_convert_dates_to_years_drops_non_dates() {
        let values: AnswerSet = [
            "2008-12-31^^<http://www.w3.org/2001/XMLSchema#dateTime>",
            "2009-01-01^^<http://www.w3.org/2001/XMLSchema#date>",
            "Chicago",
        ]
        .iter()
        .map(|v| v.to_string())
        .collect();
        let years: Vec<&str> = convert_dates_to_years(&values).iter().map(String::as_str).collect();
        assert_eq!(years, vec!["2008", "2009"]);
    }

    #[test]
    fn test_mode_detection() {
        assert_eq!(AnswerMode::detect(&result("targetValue", &["x"])).unwrap(), AnswerMode::TargetValue);
        assert_eq!(AnswerMode::detect(&result("answerSubset", &["x"])).unwrap(), AnswerMode::AnswerSubset);
        assert_eq!(AnswerMode::detect(&result("answer", &["x"])).unwrap(), AnswerMode::Answer);
        assert_eq!(AnswerMode::detect(&result("x", &["x"])).unwrap(), AnswerMode::Raw);

        let mut with_name = result("answer", &["m.01"]);
        with_name.insert("answer_name".to_string(), AnswerSet::new());
        assert_eq!(AnswerMode::detect(&with_name).unwrap(), AnswerMode::Answer);
    }

    #[test]
    fn test_all_empty_predicted_sets_count_as_empty() {
        let gold = result("answerSubset", &[]);
        let predicted = result("x", &[]);
        assert!(!answers_equal(&gold, &predicted).unwrap());
    }
}
