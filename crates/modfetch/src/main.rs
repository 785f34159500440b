//! Modfetch command line

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use modfetch::{
    FetchConfig, FetchOptions, Fetcher, Location, NotationResolver, SharedCache, VersionNotation,
    VersionTrack,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "modfetch")]
#[command(about = "Fetch game distributions and mods through a shared cache", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the shared cache directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Override the freshness TTL in seconds
    #[arg(long, global = true)]
    ttl_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Make an artifact available at an output path
    Fetch {
        /// Location notation (github:Owner/Repo, jar:Owner/Repo, https://..., path:...)
        location: String,
        /// Output file, or directory to place the artifact in
        output: PathBuf,
        /// Re-acquire even if the output already exists
        #[arg(long)]
        overwrite: bool,
        /// Remove other files in the output directory
        #[arg(long)]
        clean_others: bool,
    },
    /// Resolve a version notation to a concrete version
    Resolve {
        /// Repository to resolve against
        #[arg(value_enum)]
        track: Track,
        /// latest, latestRelease or latestTag
        notation: VersionNotation,
    },
    /// Delete the shared cache
    Clean,
}

#[derive(Clone, Copy, ValueEnum)]
enum Track {
    Arc,
    Mindustry,
    Mirror,
}

impl Track {
    fn version_track(self) -> VersionTrack {
        match self {
            Track::Arc => VersionTrack::arc(),
            Track::Mindustry => VersionTrack::mindustry(),
            Track::Mirror => VersionTrack::mindustry_mirror(),
        }
    }

    fn key(self) -> &'static str {
        match self {
            Track::Arc => "arc",
            Track::Mindustry => "mindustry",
            Track::Mirror => "mindustry-mirror",
        }
    }
}

fn notation_key(notation: VersionNotation) -> &'static str {
    match notation {
        VersionNotation::Latest => "commit",
        VersionNotation::LatestRelease => "release",
        VersionNotation::LatestTag => "tag",
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<FetchConfig> {
    let mut config = match &cli.config {
        Some(path) => FetchConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => FetchConfig::default(),
    };
    if let Some(dir) = &cli.cache_dir {
        config.cache_root = dir.clone();
    }
    if let Some(secs) = cli.ttl_secs {
        config = config.with_ttl(Duration::from_secs(secs));
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,modfetch=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Fetch {
            location,
            output,
            overwrite,
            clean_others,
        } => {
            let location: Location = location.parse()?;
            let output = if output.is_dir() {
                output.join(location.local_file_name())
            } else {
                output
            };
            let options = FetchOptions {
                overwrite,
                keep_others: !clean_others,
            };

            let fetcher = Fetcher::from_config(&config)?;
            let outcome = fetcher
                .ensure_available(&location, &output, &options)
                .with_context(|| format!("Failed to fetch {}", location))?;
            println!("{} ({:?})", output.display(), outcome);
        }
        Commands::Resolve { track, notation } => {
            let resolver = NotationResolver::from_config(&config)?;
            let key = format!("{}-{}", track.key(), notation_key(notation));
            let version = resolver.resolve_notation(notation, &key, &track.version_track());
            println!("{}", version);
        }
        Commands::Clean => {
            let cache = SharedCache::open(&config.cache_root)?;
            cache.clear()?;
            println!("Cleaned {}", cache.root().display());
        }
    }

    Ok(())
}
