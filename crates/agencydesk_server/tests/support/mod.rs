//! Shared integration-test server bootstrap helpers.

use agencydesk_core::booking::PromoCatalog;
use agencydesk_core::constants::{DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_PUBLIC_BASE_URL, USER_HEADER};
use agencydesk_server::{create_app, AppState, Config, Integrations, Services};
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use std::path::Path;
use tempfile::TempDir;


pub(crate) fn test_config_for_dir(dir: &Path, quota: Option<u64>) -> Config {
    Config {
        db_path: dir.join("test.db").to_str().expect("db path").to_string(),
        storage_path: dir.join("objects").to_str().expect("storage path").to_string(),
        public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
        port: 0,
        max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        storage_quota_bytes: quota,
        calendar_webhook_url: None,
        email_webhook_url: None,
        promo_codes: PromoCatalog::parse("SPRING:10").expect("promo codes"),
        business_hours: Default::default(),
    }
}

pub(crate) fn test_server_for_config(config: Config) -> TestServer {
    let services = Services::from_config(&config).expect("open services");
    let state = AppState::with_integrations(config, services, Integrations::disabled());
    let app = create_app(state, false);
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_test_server_with_quota(quota: Option<u64>) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("temp dir");
    let config = test_config_for_dir(temp_dir.path(), quota);
    let server = test_server_for_config(config);
    (server, temp_dir)
}

pub(crate) fn setup_test_server() -> (TestServer, TempDir) {
    setup_test_server_with_quota(None)
}

pub(crate) fn user(id: &'static str) -> HeaderValue {
    HeaderValue::from_static(id)
}

pub(crate) fn user_header() -> HeaderName {
    HeaderName::from_static(USER_HEADER)
}
