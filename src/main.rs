use std::cell::Cell;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use tracing::info;

use gpx_track_editor::events::{EventCategory, EventFilter};
use gpx_track_editor::export::export_profile_csv;
use gpx_track_editor::gpx_io::{ensure_gpx_extension, load_track, save_track};
use gpx_track_editor::stats::ProfileAxes;
use gpx_track_editor::viewport::MapViewport;
use gpx_track_editor::{
    init_logging, EditOrchestrator, EditOutcome, EditorConfig, EditorEvent, UserIntent,
};

/// Rows shown on each side of the cursor by `list`.
const LIST_CONTEXT: usize = 10;

struct CliArgs {
    input: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs> {
    let mut input = None;
    let mut config = None;
    let mut output = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                config = Some(PathBuf::from(args.next().context("--config needs a path")?));
            }
            "--output" | "-o" => {
                output = Some(PathBuf::from(args.next().context("--output needs a path")?));
            }
            "--help" | "-h" => {
                println!("Usage: gpx-track-editor [--config editor.toml] [--output edited.gpx] <track.gpx>");
                std::process::exit(0);
            }
            other if input.is_none() => input = Some(PathBuf::from(other)),
            other => bail!("Unexpected argument: {}", other),
        }
    }
    let input = input.context("Usage: gpx-track-editor [--config editor.toml] [--output edited.gpx] <track.gpx>")?;
    Ok(CliArgs {
        input,
        config,
        output,
    })
}

fn main() -> Result<()> {
    init_logging()?;
    let args = parse_args()?;
    let config = EditorConfig::load_or_default(args.config.as_deref())?;

    let loaded = load_track(&args.input, config.display_offset())
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let mut track_name = loaded.name.clone();

    let editor = EditOrchestrator::new(config.stats_params());
    let view: Rc<Cell<Option<MapViewport>>> = Rc::new(Cell::new(None));
    let map = Rc::clone(&view);
    editor.subscribe(
        EventFilter::Categories(vec![EventCategory::Track, EventCategory::Stats]),
        move |event| match event {
            EditorEvent::TrackChanged { kind, points } => {
                println!("✏️  {}: {} points", kind, points.len());
                // An emptied track keeps the last framing.
                if let Some(fitted) = MapViewport::fit(points) {
                    map.set(Some(fitted));
                    print_view(&fitted);
                }
            }
            EditorEvent::StatsUpdated(stats) => {
                println!("📊 {}", stats.summary());
            }
            _ => {}
        },
    );

    println!("\n🗺️  GPX TRACK EDITOR");
    println!("====================");
    println!("Track: {}", track_name);
    editor.handle(UserIntent::Load(loaded.points));
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let arg = words.next();
        let rest = command_rest(&line, command);

        match command {
            "list" | "l" => print_rows(&editor),
            "select" | "s" => match PointArg::parse(arg) {
                PointArg::Missing => report(editor.handle(UserIntent::Select(None))),
                PointArg::Index(i) => report(editor.handle(UserIntent::Select(Some(i)))),
                PointArg::Invalid(a) => bad_index(a),
            },
            "next" | "n" => report(editor.handle(UserIntent::MoveCursor(1))),
            "prev" | "p" => report(editor.handle(UserIntent::MoveCursor(-1))),
            "toggle" | "t" => match PointArg::parse(arg) {
                PointArg::Index(i) => report(editor.handle(UserIntent::ToggleChecked(i))),
                PointArg::Invalid(a) => bad_index(a),
                PointArg::Missing => println!("ℹ️  toggle needs a point number"),
            },
            "clear" => report(editor.handle(UserIntent::ClearChecked)),
            "delete" | "d" => match PointArg::parse(arg).or_cursor(editor.cursor()) {
                PointArg::Index(i) => report(editor.handle(UserIntent::DeleteOne(i))),
                PointArg::Invalid(a) => bad_index(a),
                PointArg::Missing => println!("ℹ️  delete needs a point number or a highlighted point"),
            },
            "before" => report(editor.handle(UserIntent::DeleteBefore)),
            "after" => report(editor.handle(UserIntent::DeleteAfter)),
            "selected" => report(editor.handle(UserIntent::DeleteSelected)),
            "undo" | "u" => report(editor.handle(UserIntent::Undo)),
            "stats" => print_stats(&editor),
            "info" | "i" => print_point_info(&editor),
            "csv" => match arg {
                Some(path) => {
                    let stats = editor.stats();
                    match export_profile_csv(&editor.points(), &stats, Path::new(path)) {
                        Ok(()) => println!("✅ Profile written to {}", path),
                        Err(e) => println!("❌ {}", e),
                    }
                }
                None => println!("ℹ️  csv needs an output path"),
            },
            "save" => {
                if !editor.controls().can_export {
                    println!("⚠️  Nothing to save");
                    continue;
                }
                let path = match (arg, &args.output) {
                    (Some(p), _) => ensure_gpx_extension(Path::new(p)),
                    (None, Some(p)) => ensure_gpx_extension(p),
                    (None, None) => ensure_gpx_extension(&args.input.with_file_name(format!(
                        "{}_edited",
                        args.input.file_stem().and_then(|s| s.to_str()).unwrap_or("track")
                    ))),
                };
                let name = save_name(&track_name, &config.default_track_name);
                match save_track(&editor.points(), &path, name) {
                    Ok(()) => println!("✅ Saved {}", path.display()),
                    Err(e) => println!("❌ {}", e),
                }
            }
            "zoom+" | "zoom-" => match view.get() {
                Some(mut v) => {
                    let changed = if command == "zoom+" { v.zoom_in() } else { v.zoom_out() };
                    if changed {
                        view.set(Some(v));
                        print_view(&v);
                    } else {
                        println!("ℹ️  Already at zoom {}", v.zoom);
                    }
                }
                None => println!("ℹ️  No map view for this track"),
            },
            "name" => {
                if rest.is_empty() {
                    println!("Track: {}", track_name);
                } else {
                    track_name = rest.to_string();
                    println!("✅ Track renamed to {}", track_name);
                }
            }
            "help" | "?" => print_help(),
            "quit" | "q" => break,
            other => println!("ℹ️  Unknown command: {}", other),
        }
    }

    info!("Editor closed with {} points", editor.len());
    Ok(())
}

/// Everything after the command word, trimmed.
fn command_rest<'a>(line: &'a str, command: &str) -> &'a str {
    line.trim_start()[command.len()..].trim()
}

fn save_name<'a>(track_name: &'a str, default: &'a str) -> &'a str {
    match track_name.trim() {
        "" => default,
        trimmed => trimmed,
    }
}

/// A point number typed after a command.
#[derive(Debug, PartialEq)]
enum PointArg<'a> {
    Missing,
    Index(usize),
    Invalid(&'a str),
}

impl<'a> PointArg<'a> {
    fn parse(arg: Option<&'a str>) -> Self {
        match arg {
            None => PointArg::Missing,
            Some(a) => a.parse().map(PointArg::Index).unwrap_or(PointArg::Invalid(a)),
        }
    }

    /// Only a missing argument falls back to the highlighted point.
    fn or_cursor(self, cursor: Option<usize>) -> Self {
        match (self, cursor) {
            (PointArg::Missing, Some(c)) => PointArg::Index(c),
            (other, _) => other,
        }
    }
}

fn bad_index(arg: &str) {
    println!("⚠️  Not a point number: {}", arg);
}

fn print_view(view: &MapViewport) {
    println!(
        "🗺️  Map center: {:.5}, {:.5} (zoom {})",
        view.center_lat, view.center_lon, view.zoom
    );
}

fn report(outcome: EditOutcome) {
    if let EditOutcome::Rejected(rejection) = outcome {
        println!("⚠️  {}", rejection);
    }
}

fn print_help() {
    println!("\nCommands:");
    println!("  list               show points around the highlighted one");
    println!("  select N | next | prev");
    println!("  toggle N | clear   check or uncheck point N, or uncheck all");
    println!("  delete [N]         delete point N (default: highlighted)");
    println!("  before | after     delete everything before/after the highlighted point");
    println!("  selected           delete all checked points");
    println!("  undo");
    println!("  stats | info");
    println!("  zoom+ | zoom-      change the map zoom");
    println!("  name [NEW NAME]    show or change the saved track name");
    println!("  csv PATH           export the elevation profile");
    println!("  save [PATH]        write the edited track");
    println!("  quit");
}

fn print_rows(editor: &EditOrchestrator) {
    let points = editor.points();
    if points.is_empty() {
        println!("(empty track)");
        return;
    }
    let cursor = editor.cursor();
    let checked = editor.checked();
    let center = cursor.unwrap_or(0);
    let start = center.saturating_sub(LIST_CONTEXT);
    let end = (center + LIST_CONTEXT + 1).min(points.len());

    for (i, p) in points.iter().enumerate().take(end).skip(start) {
        let marker = if cursor == Some(i) { '>' } else { ' ' };
        let check = if checked.binary_search(&i).is_ok() { "[x]" } else { "[ ]" };
        let time = p
            .time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} {:>5}  {}  {:.6}, {:.6}  {:.1} m",
            marker, check, i, time, p.lat, p.lon, p.ele
        );
    }
    println!("({} of {} points)", end - start, points.len());
}

fn print_stats(editor: &EditOrchestrator) {
    let stats = editor.stats();
    let controls = editor.controls();
    println!("📊 {}", stats.summary());
    let axes = ProfileAxes::from_snapshot(&stats);
    println!(
        "   Profile: {:.0}-{:.0} m (grid {} m), 0-{} km (tick {} km)",
        axes.min_elevation_m,
        axes.max_elevation_m,
        axes.elevation_grid_m,
        axes.max_distance_km,
        axes.distance_tick_km
    );
    println!(
        "   Undo depth: {}  undo:{} before:{} after:{} selected:{}",
        editor.undo_depth(),
        controls.can_undo,
        controls.can_delete_before,
        controls.can_delete_after,
        controls.can_delete_selected
    );
}

fn print_point_info(editor: &EditOrchestrator) {
    match editor.cursor().and_then(|i| editor.stats().point_info(i)) {
        Some(info) => println!("📍 #{} {}", info.index, info.describe()),
        None => println!("ℹ️  No highlighted point"),
    }
}
