//! Game distributions
//!
//! Presets for the game's own release binaries. They are plain release
//! downloads, so every preset is a [`Location::DirectUrl`] and goes through
//! the `url/` cache partition like any other link.

use crate::location::Location;
use std::fmt;

/// Latest official release known to work
pub const DEFAULT_MINDUSTRY_VERSION: &str = "v141.3";

/// Bleeding-edge build number known to work
pub const DEFAULT_BLEEDING_EDGE_VERSION: &str = "23770";

/// Arc release matching [`DEFAULT_MINDUSTRY_VERSION`]
pub const DEFAULT_ARC_VERSION: &str = "v141.3";

pub const OFFICIAL_REPO: &str = "Anuken/Mindustry";
pub const BLEEDING_EDGE_REPO: &str = "Anuken/MindustryBuilds";
pub const FOO_CLIENT_REPO: &str = "mindustry-antigrief/mindustry-client";

pub const CLIENT_RELEASE_NAME: &str = "Mindustry.jar";
pub const SERVER_RELEASE_NAME: &str = "server-release.jar";

/// Which binary of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSide {
    Client,
    Server,
}

impl fmt::Display for GameSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameSide::Client => f.write_str("client"),
            GameSide::Server => f.write_str("server"),
        }
    }
}

/// Official release of `version`
pub fn official(version: &str, side: GameSide) -> Location {
    let file = match side {
        GameSide::Client => CLIENT_RELEASE_NAME,
        GameSide::Server => SERVER_RELEASE_NAME,
    };
    release_download(OFFICIAL_REPO, version, file)
}

/// Bleeding-edge build number `version`
pub fn bleeding_edge(version: &str, side: GameSide) -> Location {
    let file = match side {
        GameSide::Client => format!("Mindustry-BE-Desktop-{}.jar", version),
        GameSide::Server => format!("Mindustry-BE-Server-{}.jar", version),
    };
    release_download(BLEEDING_EDGE_REPO, version, &file)
}

/// Foo's client, a named asset of release `tag`
pub fn foo_client(tag: &str, file: &str) -> Location {
    release_download(FOO_CLIENT_REPO, tag, file)
}

/// Browser download link of a release asset
pub fn release_download(repo: &str, tag: &str, file: &str) -> Location {
    Location::url(format!(
        "https://github.com/{}/releases/download/{}/{}",
        repo, tag, file
    ))
}
