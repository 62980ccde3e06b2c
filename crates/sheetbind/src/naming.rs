//! Derived names for models: collection keys and table titles.

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").unwrap());
static LOWER_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// `ManufacturingPlant` -> `manufacturing_plant`.
pub fn camel_to_snake(name: &str) -> String {
    let s1 = WORD_BOUNDARY.replace_all(name, "${1}_${2}");
    LOWER_UPPER.replace_all(&s1, "${1}_${2}").to_lowercase()
}

/// Naive English plural: append `s` unless the word already ends in one.
pub fn pluralize(word: &str) -> String {
    if word.ends_with('s') {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Key a model's repository is stored under, e.g. `manufacturing_plants`.
pub fn collection_key(model_name: &str) -> String {
    pluralize(&camel_to_snake(model_name))
}

/// Title written above a model's table, e.g. `Manufacturing Plants`.
pub fn display_title(model_name: &str) -> String {
    collection_key(model_name)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_conversion() {
        assert_eq!(camel_to_snake("Car"), "car");
        assert_eq!(camel_to_snake("ManufacturingPlant"), "manufacturing_plant");
        assert_eq!(camel_to_snake("HTTPServer"), "http_server");
        assert_eq!(camel_to_snake("Plant2Site"), "plant2_site");
    }

    #[test]
    fn keys_and_titles() {
        assert_eq!(collection_key("Car"), "cars");
        assert_eq!(collection_key("ManufacturingPlant"), "manufacturing_plants");
        assert_eq!(collection_key("Bus"), "bus");
        assert_eq!(display_title("Car"), "Cars");
        assert_eq!(display_title("ManufacturingPlant"), "Manufacturing Plants");
    }
}
