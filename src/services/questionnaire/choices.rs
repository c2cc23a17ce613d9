//! Multi-choice answers are stored as the selected labels joined with `,`.
//! A label containing the delimiter would split on the way back, so such
//! labels are refused instead of being silently corrupted.

use thiserror::Error;

use crate::models::question;

pub const CHOICE_DELIMITER: char = ',';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChoiceError {
    #[error("Option {0:?} contains the ',' delimiter and cannot be selected")]
    ContainsDelimiter(String),
}

pub fn decode_choices(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(CHOICE_DELIMITER).map(str::to_string).collect()
}

pub fn encode_choices<S: AsRef<str>>(selected: &[S]) -> Result<String, ChoiceError> {
    let mut parts = Vec::with_capacity(selected.len());
    for option in selected {
        let option = option.as_ref();
        if option.contains(CHOICE_DELIMITER) {
            return Err(ChoiceError::ContainsDelimiter(option.to_string()));
        }
        parts.push(option);
    }
    Ok(parts.join(","))
}

/// Add or remove one option from an encoded answer, keeping selection order.
pub fn toggle_choice(raw: &str, option: &str, checked: bool) -> Result<String, ChoiceError> {
    if option.contains(CHOICE_DELIMITER) {
        return Err(ChoiceError::ContainsDelimiter(option.to_string()));
    }

    let mut selected = decode_choices(raw);
    if checked {
        if !selected.iter().any(|s| s == option) {
            selected.push(option.to_string());
        }
    } else {
        selected.retain(|s| s != option);
    }

    encode_choices(&selected)
}

/// Options of a question that could not survive the answer encoding
pub fn unencodable_options(question: &question::Model) -> Vec<String> {
    question
        .option_list()
        .into_iter()
        .filter(|o| o.contains(CHOICE_DELIMITER))
        .collect()
}
