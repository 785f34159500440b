//! Integration tests for download source resolution

mod common;

use common::{release_json, MockTransport, API};
use modfetch::{GitHubClient, Location, ResolutionError, SourceResolver};
use std::sync::Arc;

fn resolver() -> (Arc<MockTransport>, SourceResolver) {
    let transport = Arc::new(MockTransport::new());
    let client = GitHubClient::new(transport.clone(), API);
    (transport, SourceResolver::new(client))
}

#[test]
fn test_local_and_url_need_no_network() {
    let (transport, resolver) = resolver();

    let url = "https://example.com/pack.zip";
    assert_eq!(
        resolver.resolve_download_source(&Location::url(url)).unwrap(),
        url
    );
    assert_eq!(
        resolver
            .resolve_download_source(&Location::local("/mods/a.jar"))
            .unwrap(),
        "/mods/a.jar"
    );
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_untyped_jvm_repo_resolves_to_release_asset() {
    let (transport, resolver) = resolver();
    transport.serve(
        &format!("{}/repos/Org/JvmMod", API),
        r#"{"default_branch":"main","language":"Kotlin"}"#,
    );
    transport.serve(
        &format!("{}/repos/Org/JvmMod/releases/latest", API),
        release_json("v3", &["JvmMod.jar"]),
    );

    let source = resolver
        .resolve_download_source(&Location::github("Org/JvmMod"))
        .unwrap();
    assert_eq!(source, "https://dl.test/v3/JvmMod.jar");
}

#[test]
fn test_untyped_plain_repo_resolves_to_zipball() {
    let (transport, resolver) = resolver();
    transport.serve(
        &format!("{}/repos/Org/JsonMod", API),
        r#"{"default_branch":"trunk","language":"JavaScript"}"#,
    );

    let source = resolver
        .resolve_download_source(&Location::github("Org/JsonMod"))
        .unwrap();
    assert_eq!(source, format!("{}/repos/Org/JsonMod/zipball/trunk", API));
    assert_eq!(transport.call_count(), 1);
}

#[test]
fn test_untyped_repo_without_language_is_plain() {
    let (transport, resolver) = resolver();
    transport.serve(
        &format!("{}/repos/Org/Assets", API),
        r#"{"default_branch":"master","language":null}"#,
    );

    let source = resolver
        .resolve_download_source(&Location::github("Org/Assets"))
        .unwrap();
    assert_eq!(source, format!("{}/repos/Org/Assets/zipball/master", API));
}

#[test]
fn test_source_ref_with_branch_skips_metadata() {
    let (transport, resolver) = resolver();

    let source = resolver
        .resolve_download_source(&Location::github_source("Org/Mod", Some("0.8")))
        .unwrap();
    assert_eq!(source, format!("{}/repos/Org/Mod/zipball/0.8", API));
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_source_ref_without_branch_uses_default_branch() {
    let (transport, resolver) = resolver();
    transport.serve(
        &format!("{}/repos/Org/Mod", API),
        r#"{"default_branch":"develop","language":"JavaScript"}"#,
    );

    let source = resolver
        .resolve_download_source(&Location::github_source("Org/Mod", None))
        .unwrap();
    assert_eq!(source, format!("{}/repos/Org/Mod/zipball/develop", API));
}

#[test]
fn test_package_ref_prefers_optimized_asset() {
    let (transport, resolver) = resolver();
    transport.serve(
        &format!("{}/repos/Org/Game/releases/latest", API),
        release_json("v1", &["game.jar", "dexed-game.jar"]),
    );

    let source = resolver
        .resolve_download_source(&Location::github_package("Org/Game", None))
        .unwrap();
    assert_eq!(source, "https://dl.test/v1/dexed-game.jar");
}

#[test]
fn test_package_ref_with_tag() {
    let (transport, resolver) = resolver();
    transport.serve(
        &format!("{}/repos/Org/Game/releases", API),
        format!(
            "[{},{}]",
            release_json("v2", &[]),
            release_json("v1", &[])
        ),
    );
    transport.serve(
        &format!("{}/releases/v1", API),
        release_json("v1", &["game-v1.jar"]),
    );

    let source = resolver
        .resolve_download_source(&Location::github_package("Org/Game", Some("v1")))
        .unwrap();
    assert_eq!(source, "https://dl.test/v1/game-v1.jar");
    assert_eq!(
        transport.calls(),
        vec![
            format!("{}/repos/Org/Game/releases", API),
            format!("{}/releases/v1", API),
        ]
    );
}

#[test]
fn test_package_ref_tag_not_found() {
    let (transport, resolver) = resolver();
    transport.serve(
        &format!("{}/repos/Org/Game/releases", API),
        format!("[{}]", release_json("v2", &["game.jar"])),
    );

    let result = resolver.resolve_download_source(&Location::github_package("Org/Game", Some("v9")));
    match result {
        Err(ResolutionError::TagNotFound { repo, tag }) => {
            assert_eq!(repo, "Org/Game");
            assert_eq!(tag, "v9");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_release_without_jar_asset() {
    let (transport, resolver) = resolver();
    transport.serve(
        &format!("{}/repos/Org/Game/releases/latest", API),
        release_json("v1", &["notes.txt", "source.zip"]),
    );

    let result = resolver.resolve_download_source(&Location::github_package("Org/Game", None));
    assert!(matches!(result, Err(ResolutionError::NoAssetFound { .. })));
}

#[test]
fn test_missing_repository() {
    let (_transport, resolver) = resolver();

    let result = resolver.resolve_download_source(&Location::github("Org/Gone"));
    assert!(matches!(result, Err(ResolutionError::RepositoryNotFound(repo)) if repo == "Org/Gone"));
}

#[test]
fn test_no_release_published() {
    let (_transport, resolver) = resolver();

    let result = resolver.resolve_download_source(&Location::github_package("Org/Fresh", None));
    assert!(matches!(result, Err(ResolutionError::NoRelease(_))));
}

#[test]
fn test_rate_limited_is_transport_error() {
    let (transport, resolver) = resolver();
    transport.fail(&format!("{}/repos/Org/Mod", API), 403);

    let result = resolver.resolve_download_source(&Location::github("Org/Mod"));
    assert!(matches!(result, Err(ResolutionError::Http(_))));
}

#[test]
fn test_malformed_response() {
    let (transport, resolver) = resolver();
    transport.serve(&format!("{}/repos/Org/Mod", API), "<html>oops</html>");

    let result = resolver.resolve_download_source(&Location::github("Org/Mod"));
    assert!(matches!(result, Err(ResolutionError::MalformedResponse { .. })));
}
