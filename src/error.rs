use thiserror::Error;

/// Błędy ładowania danych i obsługi schowka
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Nie udało się odczytać pliku z danymi
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Plik nie jest poprawnym GeoJSON-em
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// GeoJSON poprawny, ale bez kolekcji obiektów
    #[error("expected a FeatureCollection, got a bare {0}")]
    NotACollection(&'static str),

    /// Schowek niedostępny albo odmówił zapisu
    #[error("clipboard error: {0}")]
    Clipboard(String),
}
