use ratatui::style::Color;

/// Kolor dla typów spoza listy (oraz pustej etykiety)
pub const FALLBACK_COLOR: Color = Color::Rgb(0x66, 0x66, 0x66);

/// Typy form terenu w kolejności wyświetlania, razem z kolorami.
/// Ta sama lista zasila selektor i legendę.
pub const CATEGORY_PALETTE: [(&str, Color); 16] = [
    ("火山地形", Color::Rgb(0xe9, 0x7a, 0xa6)),
    ("扇状地", Color::Rgb(0xff, 0x8f, 0xab)),
    ("三角州", Color::Rgb(0xf6, 0xb2, 0x6b)),
    ("海岸段丘", Color::Rgb(0xc7, 0x7d, 0xff)),
    ("段丘", Color::Rgb(0x9b, 0x89, 0xb3)),
    ("砂丘", Color::Rgb(0xff, 0xd1, 0x66)),
    ("砂州・砂嘴", Color::Rgb(0x80, 0xed, 0x99)),
    ("干潟・干拓低地", Color::Rgb(0x73, 0xc0, 0xde)),
    ("リアス・沈水海岸", Color::Rgb(0xa0, 0xd8, 0xef)),
    ("カルスト", Color::Rgb(0x7a, 0xd3, 0xa1)),
    ("氾濫原・低地", Color::Rgb(0xcf, 0xe8, 0xf3)),
    ("断層地形", Color::Rgb(0xf4, 0xa3, 0xb5)),
    ("台地", Color::Rgb(0xbd, 0xe0, 0xfe)),
    ("海食崖・波食台", Color::Rgb(0xb8, 0xb8, 0xb8)),
    ("花崗岩侵食地形", Color::Rgb(0xe1, 0xc4, 0xff)),
    ("その他", FALLBACK_COLOR),
];

/// Kolor znacznika dla danego typu; nigdy nie zawodzi
pub fn color_for(category: &str) -> Color {
    CATEGORY_PALETTE
        .iter()
        .find(|(label, _)| *label == category)
        .map(|(_, color)| *color)
        .unwrap_or(FALLBACK_COLOR)
}

/// Stała kolejność typów (niezależna od danych)
pub fn category_order() -> impl Iterator<Item = &'static str> {
    CATEGORY_PALETTE.iter().map(|(label, _)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_categories_get_their_color() {
        assert_eq!(color_for("火山地形"), Color::Rgb(0xe9, 0x7a, 0xa6));
        assert_eq!(color_for("カルスト"), Color::Rgb(0x7a, 0xd3, 0xa1));
    }

    #[test]
    fn unknown_or_empty_category_falls_back() {
        assert_eq!(color_for(""), FALLBACK_COLOR);
        assert_eq!(color_for("氷河地形"), FALLBACK_COLOR);
        assert_eq!(color_for("火山"), FALLBACK_COLOR);
    }

    #[test]
    fn order_starts_with_volcanic_and_ends_with_other() {
        let order: Vec<&str> = category_order().collect();
        assert_eq!(order.len(), 16);
        assert_eq!(order.first(), Some(&"火山地形"));
        assert_eq!(order.last(), Some(&"その他"));
    }
}
