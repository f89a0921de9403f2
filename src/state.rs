use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::{
    address::Address,
    clipboard::ClipboardSink,
    data::FeatureStore,
    filter::FilterState,
    map_draw::{self, MapView, Popup},
};

pub const ALL_LABEL: &str = "すべて";
pub const SHARE_LABEL: &str = "検索";
pub const SHARE_COPIED_LABEL: &str = "コピーしました";
pub const FILTERS_HIDE_LABEL: &str = "フィルタを隠す";
pub const FILTERS_SHOW_LABEL: &str = "フィルタを表示";

/// Jak długo przycisk pokazuje potwierdzenie skopiowania
const SHARE_FEEDBACK: Duration = Duration::from_millis(1500);

/// Aktywny element interfejsu (kolejność jak przy Tab)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Category,
    Region,
    Vegetation,
    Query,
    Clear,
    Share,
    Map,
}

impl Focus {
    const RING: [Focus; 7] = [
        Focus::Category,
        Focus::Region,
        Focus::Vegetation,
        Focus::Query,
        Focus::Clear,
        Focus::Share,
        Focus::Map,
    ];

    fn step(self, forward: bool) -> Self {
        let idx = Self::RING.iter().position(|f| *f == self).unwrap_or(0);
        let len = Self::RING.len();
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        Self::RING[next]
    }

    pub fn label(self) -> &'static str {
        match self {
            Focus::Category => "地形タイプ",
            Focus::Region => "都道府県",
            Focus::Vegetation => "植生",
            Focus::Query => "キーワード",
            Focus::Clear => "クリア",
            Focus::Share => SHARE_LABEL,
            Focus::Map => "地図",
        }
    }
}

/// Cały stan aplikacji: dane, filtry, warstwa mapy i adres
pub struct AppState {
    pub store: FeatureStore,
    pub filter: FilterState,
    pub map: MapView,
    pub address: Address,
    pub categories: Vec<String>,
    pub regions: Vec<String>,
    pub vegetation: Vec<String>,
    pub hits: usize,
    pub focus: Focus,
    pub filters_open: bool,
    pub selected: usize,
    pub popup_open: bool,
    share_copied_at: Option<Instant>,
    clipboard: Box<dyn ClipboardSink>,
}

impl AppState {
    pub const HELP_TEXT: &'static str = "\
Tab / Shift+Tab: 項目の移動
←/→: 選択肢の切り替え
Enter: ボタン・詳細表示
F2 / Ctrl+F: フィルタの表示切替
↑/↓ (地図): 地形の選択
Ctrl+L: クリア  Ctrl+S: 共有
Esc / q (地図): 終了";

    /// Filtry odczytane z fragmentu adresu, potem pierwsze rysowanie.
    /// Adres zostaje taki, jak podany, aż do pierwszej zmiany.
    pub fn new(
        store: FeatureStore,
        address: Address,
        filters_open: bool,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        let categories = store.distinct_categories_in_fixed_order();
        let regions = store.distinct_regions();
        let vegetation = store.distinct_vegetation();
        let filter = FilterState::decode(&address.fragment);
        debug!(?filter, "filters restored from address");

        let mut state = Self {
            store,
            filter,
            map: MapView::new(),
            address,
            categories,
            regions,
            vegetation,
            hits: 0,
            focus: if filters_open { Focus::Category } else { Focus::Map },
            filters_open,
            selected: 0,
            popup_open: false,
            share_copied_at: None,
            clipboard,
        };
        state.render();
        state
    }

    /// Zwraca true, jeśli trzeba wyjść
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        use KeyCode::*;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            Char('c') if ctrl => return true,
            Char('f') if ctrl => self.toggle_filters(),
            F(2) => self.toggle_filters(),
            Char('l') if ctrl => self.clear(),
            Char('s') if ctrl => self.share(),
            Esc if self.popup_open => self.popup_open = false,
            Esc => return true,
            Tab if self.filters_open => self.focus = self.focus.step(true),
            BackTab if self.filters_open => self.focus = self.focus.step(false),
            code => return self.handle_focused(code, key.modifiers),
        }
        false
    }

    fn handle_focused(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        use KeyCode::*;
        match (self.focus, code) {
            (Focus::Category | Focus::Region | Focus::Vegetation, Left | Up) => self.cycle(false),
            (Focus::Category | Focus::Region | Focus::Vegetation, Right | Down) => self.cycle(true),
            (Focus::Query, Char(c)) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.filter.query.push(c);
                self.update();
            }
            (Focus::Query, Backspace) => {
                if self.filter.query.pop().is_some() {
                    self.update();
                }
            }
            (Focus::Clear, Enter) => self.clear(),
            (Focus::Share, Enter) => self.share(),
            (Focus::Map, Char('q')) => return true,
            (Focus::Map, Up | Char('k')) => self.move_selection(false),
            (Focus::Map, Down | Char('j')) => self.move_selection(true),
            (Focus::Map, Enter) => self.popup_open = !self.popup_open && self.hits > 0,
            _ => {}
        }
        false
    }

    /// Zmiana wartości w selektorze; pusta wartość ("すべて") jest pierwsza
    fn cycle(&mut self, forward: bool) {
        let (options, field) = match self.focus {
            Focus::Category => (&self.categories, &mut self.filter.category),
            Focus::Region => (&self.regions, &mut self.filter.region),
            Focus::Vegetation => (&self.vegetation, &mut self.filter.vegetation),
            _ => return,
        };
        let len = options.len() + 1;
        let current = options.iter().position(|o| *o == *field).map(|i| i + 1).unwrap_or(0);
        let next = if forward { (current + 1) % len } else { (current + len - 1) % len };
        *field = if next == 0 { String::new() } else { options[next - 1].clone() };
        self.update();
    }

    fn move_selection(&mut self, forward: bool) {
        if self.hits == 0 {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % self.hits
        } else {
            (self.selected + self.hits - 1) % self.hits
        };
    }

    /// Po każdej zmianie: zapis do adresu i ponowne rysowanie
    fn update(&mut self) {
        self.address.set_fragment(self.filter.encode());
        self.render();
    }

    fn render(&mut self) {
        let result = self.map.render(&self.store, &self.filter);
        self.hits = result.count;
        if self.selected >= self.hits {
            self.selected = 0;
        }
        if self.hits == 0 {
            self.popup_open = false;
        }
    }

    pub fn clear(&mut self) {
        self.filter.clear();
        self.update();
    }

    /// Zapisuje stan w adresie i próbuje skopiować link; błąd schowka
    /// jest tylko logowany
    pub fn share(&mut self) {
        self.address.set_fragment(self.filter.encode());
        let href = self.address.href();
        match self.clipboard.set_text(&href) {
            Ok(()) => info!(%href, "link copied to clipboard"),
            Err(err) => debug!(%err, "link not copied"),
        }
        self.share_copied_at = Some(Instant::now());
    }

    pub fn toggle_filters(&mut self) {
        self.filters_open = !self.filters_open;
        if !self.filters_open {
            self.focus = Focus::Map;
        }
    }

    pub fn share_label(&self) -> &'static str {
        self.share_label_at(Instant::now())
    }

    fn share_label_at(&self, now: Instant) -> &'static str {
        match self.share_copied_at {
            Some(at) if now.saturating_duration_since(at) < SHARE_FEEDBACK => SHARE_COPIED_LABEL,
            _ => SHARE_LABEL,
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.filters_open { FILTERS_HIDE_LABEL } else { FILTERS_SHOW_LABEL }
    }

    pub fn hits_label(&self) -> String {
        map_draw::hits_label(self.hits)
    }

    /// Wartość selektora / pola tekstowego do wyświetlenia
    pub fn control_value(&self, focus: Focus) -> &str {
        let value = match focus {
            Focus::Category => &self.filter.category,
            Focus::Region => &self.filter.region,
            Focus::Vegetation => &self.filter.vegetation,
            Focus::Query => return &self.filter.query,
            _ => return "",
        };
        if value.is_empty() { ALL_LABEL } else { value }
    }

    /// Indeks podświetlonego obiektu, gdy mapa ma fokus
    pub fn highlighted(&self) -> Option<usize> {
        (self.focus == Focus::Map && self.hits > 0).then_some(self.selected)
    }

    pub fn popup(&self) -> Option<&Popup> {
        if !self.popup_open {
            return None;
        }
        self.map.markers().get(self.selected).map(|m| &m.popup)
    }
}
