//! Art for your TTY.
//!
//! Draws a piece of terminal art from the local cache. Pieces can be generated
//! from PNG/JPEG images, downloaded from a remote corpus, listed, and demoed.

use std::path::PathBuf;

use artty_lib::{
    ArtCache, ArtPaths, ArtPiece, Config, CorpusSource, DirectorySource, FitBounds, HttpSource,
    JsonCacheStore, LayeredSource, MirrorSource, Mode, Prefetched, RefreshOutcome, Selection,
    VERSION, corpus::write_piece, generate, render, select,
};
use clap::{ArgGroup, Parser};
use color_eyre::{
    Section,
    eyre::{Result, WrapErr, eyre},
};
use tracing_subscriber::EnvFilter;

type Cache = ArtCache<JsonCacheStore>;

/// Art for your TTY.
///
/// Without an action flag, draws the first (or a random) piece matching the
/// current filters. Filters and flags can be saved as defaults with --save.
///
/// Examples:
///   artty                         # Draw art using saved defaults
///   artty tux                     # Draw the piece named "tux"
///   artty -r -m '^d' --fit        # Random piece starting with "d" that fits
///   artty -g ~/Pictures/logo_40x20.png
///   artty --ls -e cat             # List everything except cats
#[derive(Debug, Parser)]
#[command(name = "artty")]
#[command(version)]
#[command(about = "Art for your TTY")]
#[command(group(
    ArgGroup::new("action")
        .args(["cache", "demo", "generate", "list", "save", "update"])
        .multiple(false)
))]
struct Cli {
    /// Ignore previous filtering.
    #[arg(short, long)]
    all: bool,

    /// Rebuild the cache from the local art directory.
    #[arg(long)]
    cache: bool,

    /// Clear screen first.
    #[arg(short, long)]
    clear: bool,

    /// Demo art matching filters.
    #[arg(short, long)]
    demo: bool,

    /// Exclude art matching pattern.
    #[arg(short, long, value_name = "PATTERN")]
    exclude: Option<String>,

    /// Only use art that fits in the current window.
    #[arg(long)]
    fit: bool,

    /// Generate art from an image (NAME_WxH.png).
    #[arg(short, long, value_name = "IMAGE")]
    generate: Option<PathBuf>,

    /// List art matching filters.
    #[arg(long = "ls")]
    list: bool,

    /// Only use art matching pattern.
    #[arg(short = 'm', long = "match", value_name = "PATTERN")]
    matching: Option<String>,

    /// Disable colorized output.
    #[arg(long)]
    no_color: bool,

    /// Ignore previous flags and filtering (useful for tab-completion with --ls).
    #[arg(short, long)]
    plain: bool,

    /// Display random art matching filters.
    #[arg(short, long)]
    random: bool,

    /// Save specified options as default.
    #[arg(long)]
    save: bool,

    /// Download new art and refresh the cache.
    #[arg(short, long)]
    update: bool,

    /// Remote art corpus (JSON) used by --update.
    #[arg(long, value_name = "URL")]
    corpus_url: Option<String>,

    /// Show debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Art to draw (or the name to give generated art).
    #[arg(value_name = "ART")]
    art: Option<String>,
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Draw,
    Cache,
    Demo,
    Generate(PathBuf),
    List,
    Save,
    Update,
}

impl Cli {
    fn action(&self) -> Action {
        if self.cache {
            Action::Cache
        } else if self.demo {
            Action::Demo
        } else if let Some(image) = &self.generate {
            Action::Generate(image.clone())
        } else if self.list {
            Action::List
        } else if self.save {
            Action::Save
        } else if self.update {
            Action::Update
        } else {
            Action::Draw
        }
    }

    /// Layers command-line flags over the saved config.
    fn apply(&self, config: &mut Config) {
        if self.all {
            config.clear_filters();
        }
        if self.plain {
            config.reset_plain();
        }

        if self.clear {
            config.clear_screen = true;
        }
        if let Some(exclude) = &self.exclude {
            config.exclude = exclude.clone();
        }
        if self.fit {
            config.fit = true;
        }
        if let Some(matching) = &self.matching {
            config.matching = matching.clone();
        }
        if self.random {
            config.random = true;
        }
        if let Some(url) = &self.corpus_url {
            config.corpus_url = Some(url.clone());
        }

        if let Some(art) = &self.art {
            config.art = Some(art.clone());
            config.random = false;
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = ArtPaths::discover();
    let mut config = Config::load(&paths.config_file)?;
    cli.apply(&mut config);
    let color = !cli.no_color && std::env::var_os("NO_COLOR").is_none();

    let action = cli.action();
    tracing::debug!(?action, ?paths, "starting");

    match action {
        Action::Save => {
            config.save(&paths.config_file)?;
            println!("Saved defaults to {}", paths.config_file.display());
        }
        Action::Cache => {
            let mut cache = load_cache(&paths)?;
            let mirror = MirrorSource::new(&paths.mirror_file);
            let local = DirectorySource::new(&paths.corpus_dir);
            let outcome = cache.refresh(&LayeredSource::new(&mirror, &local), true)?;
            report_refresh(outcome);
        }
        Action::Update => {
            let mut cache = load_cache(&paths)?;
            update(&mut cache, &config, &paths)?;
        }
        Action::Generate(image) => {
            let mut cache = open_cache(&paths)?;
            let name = cli.art.as_deref().filter(|name| !name.trim().is_empty());
            let piece = generate(&image, name)?;
            write_piece(&paths.corpus_dir, &piece)?;
            print!("{}", render::render(&piece, color));
            cache.add(piece)?;
        }
        Action::List => {
            let cache = open_cache(&paths)?;
            for piece in pick(&cache, &config, Mode::List)?.into_vec() {
                println!("{}", piece.name);
            }
        }
        Action::Demo => {
            let cache = open_cache(&paths)?;
            for piece in pick(&cache, &config, Mode::List)?.into_vec() {
                draw(piece, &config, color, true);
            }
        }
        Action::Draw => {
            let cache = open_cache(&paths)?;
            let mode = if config.random { Mode::Random } else { Mode::First };
            if let Some(piece) = pick(&cache, &config, mode)?.first() {
                draw(piece, &config, color, false);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_cache(paths: &ArtPaths) -> Result<Cache> {
    ArtCache::load(JsonCacheStore::new(&paths.cache_file), VERSION)
        .wrap_err("failed to load the art cache")
}

/// Loads the cache, building it from the mirrored corpus and the local art
/// directory when it is stale or has never been built.
fn open_cache(paths: &ArtPaths) -> Result<Cache> {
    let mut cache = load_cache(paths)?;

    if cache.is_stale() || cache.source_location().is_none() {
        tracing::info!(stored = %cache.version(), running = VERSION, "rebuilding art cache");
        let mirror = MirrorSource::new(&paths.mirror_file);
        let local = DirectorySource::new(&paths.corpus_dir);
        cache
            .refresh(&LayeredSource::new(&mirror, &local), false)
            .wrap_err("failed to rebuild the art cache")?;
    }

    Ok(cache)
}

/// Downloads the remote corpus and rebuilds the cache from it plus the local
/// art directory. The download is mirrored only after the cache is committed.
fn update(cache: &mut Cache, config: &Config, paths: &ArtPaths) -> Result<()> {
    let url = config
        .corpus_url
        .as_deref()
        .ok_or_else(|| eyre!("no corpus URL configured"))
        .suggestion("pass --corpus-url <URL>, optionally with --save to remember it")?;

    let remote = HttpSource::new(url).with_timeout(config.fetch_timeout());
    let fetched = Prefetched::new(remote.location(), remote.fetch()?);
    println!(
        "Downloaded {} pieces from {url}",
        fetched.corpus().pieces.len()
    );

    let local = DirectorySource::new(&paths.corpus_dir);
    let outcome = cache.refresh(&LayeredSource::new(&fetched, &local), true)?;
    MirrorSource::new(&paths.mirror_file)
        .save(fetched.corpus())
        .wrap_err("cache updated, but the downloaded corpus could not be mirrored")?;

    report_refresh(outcome);
    Ok(())
}

fn report_refresh(outcome: RefreshOutcome) {
    match outcome {
        RefreshOutcome::Refreshed(count) => println!("Refreshed cache: {count} pieces"),
        RefreshOutcome::Skipped => println!("Cache already up to date"),
    }
}

/// Runs the selection engine with the configured filters.
fn pick<'a>(cache: &'a Cache, config: &Config, mode: Mode) -> Result<Selection<'a>> {
    let criteria = config.criteria(terminal_bounds());

    select(cache, &criteria, mode).map_err(|err| {
        if err.is_no_match() {
            color_eyre::Report::new(err)
                .suggestion("relax --match/--exclude/--fit, use --all, or run --update")
        } else {
            err.into()
        }
    })
}

/// The terminal size, or `$COLUMNS` x `$LINES` when stdout is not a terminal.
fn terminal_bounds() -> Option<FitBounds> {
    let size = terminal_size::terminal_size()
        .map(|(width, height)| (usize::from(width.0), usize::from(height.0)))
        .or_else(|| Some((env_dimension("COLUMNS")?, env_dimension("LINES")?)));

    match size {
        Some((columns, rows)) => Some(FitBounds::for_terminal(columns, rows)),
        None => {
            tracing::debug!("terminal size unknown, fit filtering disabled");
            None
        }
    }
}

fn env_dimension(name: &str) -> Option<usize> {
    std::env::var(name).ok()?.trim().parse().ok().filter(|value| *value > 0)
}

fn draw(piece: &ArtPiece, config: &Config, color: bool, caption: bool) {
    if config.clear_screen {
        print!("{}", render::CLEAR_SCREEN);
    }
    if caption {
        println!("{}", piece.name);
    }
    print!("{}", render::render(piece, color));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("artty").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn default_action_is_draw() {
        assert_eq!(parse(&[]).action(), Action::Draw);
        assert_eq!(parse(&["tux"]).action(), Action::Draw);
    }

    #[test]
    fn action_flags_map_to_actions() {
        assert_eq!(parse(&["--ls"]).action(), Action::List);
        assert_eq!(parse(&["-d"]).action(), Action::Demo);
        assert_eq!(parse(&["--cache"]).action(), Action::Cache);
        assert_eq!(parse(&["-u"]).action(), Action::Update);
        assert_eq!(parse(&["--save"]).action(), Action::Save);
        assert_eq!(
            parse(&["-g", "logo_10x5.png"]).action(),
            Action::Generate(PathBuf::from("logo_10x5.png"))
        );
    }

    #[test]
    fn actions_are_mutually_exclusive() {
        assert!(Cli::try_parse_from(["artty", "--ls", "--demo"]).is_err());
        assert!(Cli::try_parse_from(["artty", "-u", "--cache"]).is_err());
    }

    #[test]
    fn positional_art_disables_random() {
        let mut config = Config {
            random: true,
            ..Config::default()
        };
        parse(&["-r", "tux"]).apply(&mut config);

        assert_eq!(config.art.as_deref(), Some("tux"));
        assert!(!config.random);
    }

    #[test]
    fn all_clears_saved_filters_before_new_ones() {
        let mut config = Config {
            exclude: "cat".to_string(),
            matching: "old".to_string(),
            fit: true,
            ..Config::default()
        };
        parse(&["-a", "-m", "^d"]).apply(&mut config);

        assert!(config.exclude.is_empty());
        assert!(!config.fit);
        assert_eq!(config.matching, "^d");
    }

    #[test]
    fn plain_resets_saved_defaults() {
        let mut config = Config {
            clear_screen: true,
            random: true,
            fit: true,
            matching: "x".to_string(),
            ..Config::default()
        };
        parse(&["-p"]).apply(&mut config);

        assert_eq!(config, Config::default());
    }
}
