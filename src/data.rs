use geo::Geometry;
use geojson::{GeoJson, JsonObject};
use serde::Deserialize;
use std::{collections::BTreeSet, fs, path::Path, str::FromStr};
use tracing::{info, warn};

use crate::{error::AtlasError, palette};

/// Jedna forma terenu z pliku z danymi; po załadowaniu nie zmienia się
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub name: String,
    pub region: String,
    pub category: String,
    pub vegetation: Option<String>,
    pub description: String,
}

/// Atrybuty obiektu w GeoJSON (klucze po japońsku, jak w pliku źródłowym)
#[derive(Debug, Default, Deserialize)]
struct LandformProperties {
    #[serde(rename = "名称", default)]
    name: Option<String>,
    #[serde(rename = "都道府県", default)]
    region: Option<String>,
    #[serde(rename = "地形タイプ", default)]
    category: Option<String>,
    #[serde(rename = "植生", default)]
    vegetation: Option<String>,
    #[serde(rename = "地理的特徴・成り立ち", default)]
    description: Option<String>,
}

impl LandformProperties {
    fn from_json(props: Option<JsonObject>) -> Self {
        let Some(props) = props else {
            return Self::default();
        };
        serde_json::from_value(serde_json::Value::Object(props)).unwrap_or_else(|err| {
            warn!(%err, "unexpected property types, using empty attributes");
            Self::default()
        })
    }
}

/// Załadowana kolekcja obiektów
#[derive(Clone, Debug, Default)]
pub struct FeatureStore {
    features: Vec<Feature>,
}

impl FeatureStore {
    pub fn load(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AtlasError> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path)?;
        let store = Self::from_geojson(GeoJson::from_str(&txt)?)?;
        info!(path = %path.display(), features = store.len(), "dataset loaded");
        Ok(store)
    }

    pub fn from_geojson(raw: GeoJson) -> Result<Self, AtlasError> {
        let features = match raw {
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Feature(f) => vec![f],
            GeoJson::Geometry(_) => return Err(AtlasError::NotACollection("Geometry")),
        };

        let mut items = Vec::with_capacity(features.len());
        for (idx, feature) in features.into_iter().enumerate() {
            let Some(gj) = feature.geometry else {
                warn!(idx, "feature without geometry skipped");
                continue;
            };
            let geometry: Geometry<f64> = match gj.value.try_into() {
                Ok(g) => g,
                Err(err) => {
                    warn!(idx, %err, "feature geometry not convertible, skipped");
                    continue;
                }
            };
            let props = LandformProperties::from_json(feature.properties);
            items.push(Feature {
                geometry,
                name: props.name.unwrap_or_default(),
                region: props.region.unwrap_or_default(),
                category: props.category.unwrap_or_default(),
                vegetation: props.vegetation.filter(|v| !v.is_empty()),
                description: props.description.unwrap_or_default(),
            });
        }

        Ok(Self::load(items))
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Unikalne prefektury (bez pustych, `""` to już "すべて"), posortowane
    pub fn distinct_regions(&self) -> Vec<String> {
        distinct(self.features.iter().map(|f| f.region.as_str()))
    }

    /// Unikalne wartości roślinności (bez pustych), posortowane
    pub fn distinct_vegetation(&self) -> Vec<String> {
        distinct(self.features.iter().filter_map(|f| f.vegetation.as_deref()))
    }

    /// Pełna lista typów w stałej kolejności, bez względu na dane
    pub fn distinct_categories_in_fixed_order(&self) -> Vec<String> {
        palette::category_order().map(str::to_string).collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
