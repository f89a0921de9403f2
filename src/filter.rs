//! Stan filtrów i jego zapis w fragmencie adresu.
//!
//! Fragment ma postać `type=..&pref=..&veg=..&q=..` (kodowanie jak w
//! formularzach HTML). Pusta wartość oznacza brak filtra na danym polu.

use url::form_urlencoded;

use crate::data::Feature;

pub const KEY_CATEGORY: &str = "type";
pub const KEY_REGION: &str = "pref";
pub const KEY_VEGETATION: &str = "veg";
pub const KEY_QUERY: &str = "q";

/// Aktywne filtry: cztery pola łączone koniunkcją
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category: String,
    pub region: String,
    pub vegetation: String,
    pub query: String,
}

impl FilterState {
    /// Odczyt z fragmentu adresu. Nieznane klucze są pomijane, brakujące
    /// zostają puste, przy powtórzeniu wygrywa pierwsza wartość.
    pub fn decode(raw: &str) -> Self {
        let raw = raw.strip_prefix('#').unwrap_or(raw);
        let (mut category, mut region, mut vegetation, mut query) = (None, None, None, None);

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let slot: &mut Option<String> = match key.as_ref() {
                KEY_CATEGORY => &mut category,
                KEY_REGION => &mut region,
                KEY_VEGETATION => &mut vegetation,
                KEY_QUERY => &mut query,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        Self {
            category: category.unwrap_or_default(),
            region: region.unwrap_or_default(),
            vegetation: vegetation.unwrap_or_default(),
            query: query.unwrap_or_default(),
        }
    }

    /// Zapis wszystkich czterech par, także pustych
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair(KEY_CATEGORY, &self.category)
            .append_pair(KEY_REGION, &self.region)
            .append_pair(KEY_VEGETATION, &self.vegetation)
            .append_pair(KEY_QUERY, &self.query)
            .finish()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_unset(&self) -> bool {
        self.category.is_empty()
            && self.region.is_empty()
            && self.vegetation.is_empty()
            && self.query.trim().is_empty()
    }

    /// Czy obiekt przechodzi przez wszystkie cztery filtry
    pub fn matches(&self, feature: &Feature) -> bool {
        self.category_matches(feature)
            && self.region_matches(feature)
            && self.vegetation_matches(feature)
            && self.query_matches(feature)
    }

    pub fn category_matches(&self, feature: &Feature) -> bool {
        self.category.is_empty() || self.category == feature.category
    }

    pub fn region_matches(&self, feature: &Feature) -> bool {
        self.region.is_empty() || self.region == feature.region
    }

    pub fn vegetation_matches(&self, feature: &Feature) -> bool {
        self.vegetation.is_empty() || feature.vegetation.as_deref() == Some(self.vegetation.as_str())
    }

    /// Podciąg bez rozróżniania wielkości liter w sklejeniu nazwa+opis.
    /// Pola są sklejane bez separatora, więc trafienie może przejść przez
    /// ich granicę.
    pub fn query_matches(&self, feature: &Feature) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let haystack = format!("{}{}", feature.name, feature.description).to_lowercase();
        haystack.contains(&needle)
    }
}
