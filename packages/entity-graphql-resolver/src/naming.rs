//! Naming conventions between GraphQL field names and entity names.

use convert_case::{Case, Casing};

/// Singular/plural pairs that do not follow the suffix rules.
const IRREGULAR: [(&str, &str); 6] = [
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("tooth", "teeth"),
    ("foot", "feet"),
];

/// Words whose singular and plural are the same.
const UNINFLECTED: [&str; 8] = [
    "media",
    "data",
    "information",
    "equipment",
    "news",
    "series",
    "species",
    "sheep",
];

/// Word inflection and case conversion.
///
/// Instances are immutable once built; pass one to whatever needs to map
/// field names to entities.
#[derive(Debug, Clone)]
pub struct Inflector {
    irregular: Vec<(String, String)>,
    uninflected: Vec<String>,
}

impl Default for Inflector {
    fn default() -> Self {
        Self {
            irregular: IRREGULAR
                .iter()
                .map(|(singular, plural)| (singular.to_string(), plural.to_string()))
                .collect(),
            uninflected: UNINFLECTED.iter().map(|word| word.to_string()).collect(),
        }
    }
}

impl Inflector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_irregular(mut self, singular: &str, plural: &str) -> Self {
        self.irregular
            .push((singular.to_lowercase(), plural.to_lowercase()));
        self
    }

    pub fn with_uninflected(mut self, word: &str) -> Self {
        self.uninflected.push(word.to_lowercase());
        self
    }

    /// Singular form of the last word of a camelCase or snake_case name.
    pub fn singularize(&self, word: &str) -> String {
        let (head, last) = split_last_word(word);
        format!("{}{}", head, self.inflect_word(last, Number::Singular))
    }

    /// Plural form of the last word of a camelCase or snake_case name.
    pub fn pluralize(&self, word: &str) -> String {
        let (head, last) = split_last_word(word);
        format!("{}{}", head, self.inflect_word(last, Number::Plural))
    }

    /// `ProductPrice` or `productPrice` to `product_price`.
    pub fn tableize(&self, word: &str) -> String {
        word.to_case(Case::Snake)
    }

    /// `product_price` to `ProductPrice`.
    pub fn classify(&self, word: &str) -> String {
        word.to_case(Case::Pascal)
    }

    /// `product_price` to `productPrice`.
    pub fn camelize(&self, word: &str) -> String {
        word.to_case(Case::Camel)
    }

    fn inflect_word(&self, word: &str, number: Number) -> String {
        let lower = word.to_lowercase();
        if lower.is_empty() || self.uninflected.contains(&lower) {
            return word.to_string();
        }

        let irregular = self.irregular.iter().find_map(|(singular, plural)| match number {
            Number::Singular if *plural == lower => Some(singular),
            Number::Plural if *singular == lower => Some(plural),
            _ => None,
        });
        if let Some(replacement) = irregular {
            return match_capitalization(word, replacement);
        }

        match number {
            Number::Singular => singular_suffix(word),
            Number::Plural => plural_suffix(word),
        }
    }
}

#[derive(Clone, Copy)]
enum Number {
    Singular,
    Plural,
}

/// Splits before the last word boundary (an uppercase letter or `_`).
fn split_last_word(word: &str) -> (&str, &str) {
    let boundary = word
        .char_indices()
        .filter(|(index, c)| *index > 0 && (c.is_uppercase() || *c == '_'))
        .map(|(index, c)| if c == '_' { index + 1 } else { index })
        .last()
        .unwrap_or(0);
    word.split_at(boundary)
}

fn match_capitalization(original: &str, replacement: &str) -> String {
    let mut chars = replacement.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(head)) if first.is_uppercase() => {
            head.to_uppercase().chain(chars).collect()
        }
        _ => replacement.to_string(),
    }
}

fn singular_suffix(word: &str) -> String {
    let lower = word.to_lowercase();
    let strip = |suffix: &str, replacement: &str| {
        format!("{}{}", &word[..word.len() - suffix.len()], replacement)
    };

    if lower.ends_with("ies") && lower.len() > 3 {
        strip("ies", "y")
    } else if ["sses", "xes", "ches", "shes", "zzes"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        strip("es", "")
    } else if lower.ends_with("uses") {
        strip("es", "")
    } else if lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") {
        strip("s", "")
    } else {
        word.to_string()
    }
}

fn plural_suffix(word: &str) -> String {
    let lower = word.to_lowercase();
    let before_last = lower.chars().rev().nth(1);

    if lower.ends_with('y') && before_last.is_some_and(|c| !"aeiou".contains(c)) {
        format!("{}ies", &word[..word.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singularize() {
        let inflector = Inflector::new();
        assert_eq!(inflector.singularize("products"), "product");
        assert_eq!(inflector.singularize("categories"), "category");
        assert_eq!(inflector.singularize("productPrices"), "productPrice");
        assert_eq!(inflector.singularize("taxes"), "tax");
        assert_eq!(inflector.singularize("addresses"), "address");
        assert_eq!(inflector.singularize("statuses"), "status");
        assert_eq!(inflector.singularize("product"), "product");
        assert_eq!(inflector.singularize("media"), "media");
        assert_eq!(inflector.singularize("salesChannelPeople"), "salesChannelPerson");
    }

    #[test]
    fn test_pluralize() {
        let inflector = Inflector::new();
        assert_eq!(inflector.pluralize("product"), "products");
        assert_eq!(inflector.pluralize("category"), "categories");
        assert_eq!(inflector.pluralize("day"), "days");
        assert_eq!(inflector.pluralize("tax"), "taxes");
        assert_eq!(inflector.pluralize("productPrice"), "productPrices");
        assert_eq!(inflector.pluralize("media"), "media");
        assert_eq!(inflector.pluralize("child"), "children");
    }

    #[test]
    fn test_round_trip_on_entity_words() {
        let inflector = Inflector::new();
        for word in ["product", "category", "currency", "box", "order", "address"] {
            assert_eq!(inflector.singularize(&inflector.pluralize(word)), word);
        }
    }

    #[test]
    fn test_case_conversion() {
        let inflector = Inflector::new();
        assert_eq!(inflector.tableize("ProductPrice"), "product_price");
        assert_eq!(inflector.tableize("productManufacturer"), "product_manufacturer");
        assert_eq!(inflector.classify("product_price"), "ProductPrice");
        assert_eq!(inflector.camelize("product_price"), "productPrice");
    }

    #[test]
    fn test_custom_rules() {
        let inflector = Inflector::new()
            .with_irregular("cactus", "cacti")
            .with_uninflected("fish");
        assert_eq!(inflector.singularize("cacti"), "cactus");
        assert_eq!(inflector.pluralize("fish"), "fish");
    }

    #[test]
    fn test_snake_case_last_word() {
        let inflector = Inflector::new();
        assert_eq!(inflector.singularize("product_prices"), "product_price");
    }
}
