#![allow(dead_code)]

use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `vrstats` rooted in `workdir`, with home, config and proxy settings
/// pinned so nothing from the developer's machine leaks in.
pub fn vrstats_cmd(workdir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("vrstats");
    cmd.current_dir(workdir)
        .env("VRSTATS_HOME", workdir)
        .env("VRSTATS_CONFIG_PATH", workdir.join("absent.toml"))
        .env_remove("VRSTATS_DATA_DIR")
        .env_remove("VRSTATS_ARCHIVE_DIR")
        .env_remove("VRSTATS_CURRENT_STATS_URL")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy");
    cmd
}

/// Serve `body` at `route`. Routes that are never mounted answer 404.
pub async fn mount_body(server: &MockServer, route: &str, body: impl Into<Vec<u8>>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into()))
        .mount(server)
        .await;
}
