//! Scoring predicted query results against gold results

pub mod normalizer;

pub use normalizer::{
    answers_equal, convert_dates_to_years, extract_clean_answers, AnswerMode, AnswerSet,
};
