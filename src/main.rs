mod address;
mod clipboard;
mod data;
mod error;
mod filter;
mod map_draw;
mod palette;
mod state;
mod ui;

use address::Address;
use anyhow::Context;
use clap::Parser;
use clipboard::SystemClipboard;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use data::FeatureStore;
use filter::FilterState;
use ratatui::{Terminal, backend::CrosstermBackend};
use state::AppState;
use std::{
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Przeglądarka form terenu z filtrami zapisywanymi w linku
#[derive(Parser, Debug)]
#[command(name = "landform-atlas", version, about)]
struct Args {
    /// Link (albo sam fragment `type=..&pref=..&veg=..&q=..`) z zapisanymi filtrami
    link: Option<String>,

    /// Plik GeoJSON z formami terenu
    #[arg(long, default_value = "assets/data.geojson")]
    data: PathBuf,

    /// Adres bazowy linków do udostępniania
    #[arg(long, default_value = "https://localhost/landforms/")]
    base_url: String,

    /// Poniżej tej szerokości terminala panel filtrów startuje zwinięty
    #[arg(long, default_value_t = 100)]
    narrow_width: u16,

    /// Plik z logami (terminal jest zajęty przez interfejs)
    #[arg(long, default_value = "landform-atlas.log")]
    log_file: PathBuf,

    /// Wypisz widoczne obiekty i zakończ, bez interfejsu
    #[arg(long, default_value_t = false)]
    dump: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_file = open_log(&args.log_file)
        .with_context(|| format!("cannot open log file {}", args.log_file.display()))?;
    let (writer, _guard) = tracing_appender::non_blocking(log_file);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    // Błąd ładowania nie kończy programu: mapa zostaje pusta
    let store = FeatureStore::open(&args.data).unwrap_or_else(|err| {
        error!(path = %args.data.display(), %err, "dataset not loaded");
        FeatureStore::default()
    });
    if store.is_empty() {
        warn!("no features to show");
    }
    let address = Address::parse(args.link.as_deref().unwrap_or(""), &args.base_url);

    if args.dump {
        dump(&store, &address);
        return Ok(());
    }

    let (width, _) = crossterm::terminal::size()?;
    let filters_open = width >= args.narrow_width;
    let mut state = AppState::new(store, address, filters_open, Box::new(SystemClipboard::default()));
    info!(width, filters_open, "starting ui");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result?;

    // Ostatni adres, żeby dało się go zapisać
    println!("{}", state.address.href());
    Ok(())
}

/// Logi są dopisywane, poprzednie uruchomienia zostają w pliku
fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, state: &mut AppState) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, state))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && state.handle_input(key) {
                    return Ok(());
                }
            }
        }
    }
}

fn dump(store: &FeatureStore, address: &Address) {
    let filter = FilterState::decode(&address.fragment);
    let mut map = map_draw::MapView::new();
    let result = map.render(store, &filter);
    debug!(?filter, viewport = ?map.viewport(), "dump");
    for marker in map.markers() {
        let f = &store.features()[marker.feature];
        println!("{}\t{}\t{}", f.name, f.region, f.category);
    }
    println!("{}", map_draw::hits_label(result.count));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn log_file_is_appended_not_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.log");
        writeln!(open_log(&path).unwrap(), "first run").unwrap();
        writeln!(open_log(&path).unwrap(), "second run").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first run\nsecond run\n");
    }
}
