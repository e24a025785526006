//! Shared fixtures: a mock portal and config/credentials files pointing at it.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LOGIN_PAGE: &str = r#"<html><body>
<form id="pre-login-form" action="login/index.php" method="post">
<input type="hidden" name="logintoken" value="tok-e2e">
<input type="text" name="username"><input type="password" name="password">
</form></body></html>"#;

/// A profile page in the stock template layout.
pub fn profile_page(name: &str, permanent: &str, phone: &str) -> String {
    format!(
        r#"<html><body>
<h1 class="fullname"><span>{name}</span></h1>
<section class="custom_field_CorrespondenceAddressPermanent"><dl><dt>Permanent</dt><dd>{permanent}</dd></dl></section>
<section class="custom_field_ContactNumber"><dl><dt>Phone</dt><dd>{phone}</dd></dl></section>
</body></html>"#
    )
}

pub async fn mount_login(server: &MockServer, login_page: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_page))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/index.php"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "MoodleSession=e2e; Path=/"),
        )
        .mount(server)
        .await;
}

pub async fn mount_profile(server: &MockServer, uid: i64, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/user/profile.php"))
        .and(query_param("id", uid.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

/// The three-id scenario: a full profile, a 404, and an empty name.
pub async fn mount_scenario(server: &MockServer) {
    mount_profile(
        server,
        1,
        ResponseTemplate::new(200).set_body_string(profile_page(
            "Asha Rao",
            "12 Lake Road, Nashik",
            "+91 98765 43210",
        )),
    )
    .await;
    mount_profile(server, 2, ResponseTemplate::new(404)).await;
    mount_profile(
        server,
        3,
        ResponseTemplate::new(200).set_body_string(profile_page("", "", "")),
    )
    .await;
}

pub struct TestEnv {
    pub tmp: TempDir,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
}

/// Write credentials and a config targeting `portal_uri` into a temp dir.
pub fn setup_env(portal_uri: &str, start: i64, end: i64) -> TestEnv {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    let creds_path = root.join("userpass.json");
    fs::write(
        &creds_path,
        r#"{"username": "registrar", "password": "s3cret"}"#,
    )
    .unwrap();

    let db_path = root.join("data").join("person_data.db");
    let config_path = root.join("harvest.toml");
    fs::write(
        &config_path,
        config_toml(portal_uri, &creds_path, &db_path, start, end),
    )
    .unwrap();

    TestEnv {
        tmp,
        config_path,
        db_path,
    }
}

pub fn config_toml(portal_uri: &str, creds: &Path, db: &Path, start: i64, end: i64) -> String {
    format!(
        r#"[portal]
base_url = "{}"

[credentials]
path = "{}"

[db]
path = "{}"

[harvest]
start = {}
end = {}
delay_ms = 0
"#,
        portal_uri,
        creds.display(),
        db.display(),
        start,
        end
    )
}
