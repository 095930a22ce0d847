//! Release resolution and install pipeline against mocked vendor endpoints.

use driverup::config::Browser;
use driverup::release::{
    self, ArchiveFormat, Arch, DriverRelease, Endpoints, Os, Platform,
};
use std::io::Write;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LINUX: Platform = Platform {
    os: Os::Linux,
    arch: Arch::X64,
};

fn zip_archive(entry_name: &str, content: &[u8]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        writer
            .start_file(entry_name, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(content).unwrap();
        writer.finish().unwrap();
    }
    buf
}

fn tar_gz_archive(entry_name: &str, content: &[u8]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, entry_name, content).unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}

fn test_endpoints(server: &MockServer) -> Endpoints {
    Endpoints {
        chromedriver: server.uri(),
        geckodriver: server.uri(),
        edgedriver: server.uri(),
        selenium_release: server.uri(),
    }
}

#[tokio::test]
async fn test_chrome_resolution_and_install_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/LATEST_RELEASE_114"))
        .respond_with(ResponseTemplate::new(200).set_body_string("114.0.5735.90"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/114.0.5735.90/chromedriver_linux64.zip"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(zip_archive("chromedriver", b"driver binary")),
        )
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let endpoints = test_endpoints(&server);
    let release = release::resolve_chrome(&client, &endpoints, "114.0.5735.198", LINUX)
        .await
        .unwrap();
    assert_eq!(release.version, "114.0.5735.90");
    assert_eq!(
        release.download_url,
        format!("{}/114.0.5735.90/chromedriver_linux64.zip", server.uri())
    );

    let root = tempfile::tempdir().unwrap();
    let exe = driverup::install::ensure_installed(&client, &release, root.path())
        .await
        .unwrap();
    assert!(exe.ends_with("chrome/114.0.5735.90/chromedriver"));
    assert_eq!(std::fs::read(&exe).unwrap(), b"driver binary");
    // The transient archive is deleted after extraction.
    assert!(!root.path().join("chrome/chromedriver.zip").exists());
}

#[tokio::test]
async fn test_ensure_installed_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/archive.zip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(zip_archive("msedgedriver", b"edge")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let release = DriverRelease {
        browser: Browser::Edge,
        version: "120.0.2210.91".to_string(),
        download_url: format!("{}/archive.zip", server.uri()),
        archive: ArchiveFormat::Zip,
        platform: LINUX,
    };

    let client = reqwest::Client::new();
    let root = tempfile::tempdir().unwrap();
    let first = driverup::install::ensure_installed(&client, &release, root.path())
        .await
        .unwrap();
    let second = driverup::install::ensure_installed(&client, &release, root.path())
        .await
        .unwrap();
    assert_eq!(first, second);
    // The mock's expect(1) verifies the second call downloaded nothing.
}

#[tokio::test]
async fn test_firefox_resolution_follows_redirect_and_unpacks_tarball() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/tag/v0.34.0", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tag/v0.34.0"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download/v0.34.0/geckodriver-v0.34.0-linux64.tar.gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(tar_gz_archive("geckodriver", b"gecko binary")),
        )
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let endpoints = test_endpoints(&server);
    let release = release::resolve_firefox(&client, &endpoints, LINUX)
        .await
        .unwrap();
    assert_eq!(release.version, "v0.34.0");
    assert_eq!(release.archive, ArchiveFormat::TarGz);

    let root = tempfile::tempdir().unwrap();
    let exe = driverup::install::ensure_installed(&client, &release, root.path())
        .await
        .unwrap();
    assert!(exe.ends_with("firefox/v0.34.0/geckodriver"));
    assert_eq!(std::fs::read(&exe).unwrap(), b"gecko binary");
}

#[tokio::test]
async fn test_download_failure_surfaces_as_download_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let release = DriverRelease {
        browser: Browser::Chrome,
        version: "1.2.3".to_string(),
        download_url: format!("{}/missing.zip", server.uri()),
        archive: ArchiveFormat::Zip,
        platform: LINUX,
    };

    let client = reqwest::Client::new();
    let root = tempfile::tempdir().unwrap();
    let err = driverup::install::ensure_installed(&client, &release, root.path())
        .await
        .unwrap_err();
    assert!(matches!(err, driverup::ProvisionError::Download(_)));
    // Nothing was installed, so a retry would not see a cached version.
    assert!(!root.path().join("chrome/1.2.3").exists());
}

#[tokio::test]
async fn test_zip_entry_escaping_install_dir_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/evil.zip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(zip_archive("../../escape", b"payload")),
        )
        .mount(&server)
        .await;

    let release = DriverRelease {
        browser: Browser::Chrome,
        version: "1.2.3".to_string(),
        download_url: format!("{}/evil.zip", server.uri()),
        archive: ArchiveFormat::Zip,
        platform: LINUX,
    };

    let client = reqwest::Client::new();
    let root = tempfile::tempdir().unwrap();
    let err = driverup::install::ensure_installed(&client, &release, root.path())
        .await
        .unwrap_err();
    assert!(matches!(err, driverup::ProvisionError::Extract(_)));
    // Nothing was written outside the staging directory.
    assert!(!root.path().join("escape").exists());
    assert!(!root.path().parent().unwrap().join("escape").exists());
    assert!(!root.path().join("chrome/1.2.3").exists());
}

#[tokio::test]
async fn test_corrupt_archive_surfaces_as_extract_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/corrupt.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not a zip".to_vec()))
        .mount(&server)
        .await;

    let release = DriverRelease {
        browser: Browser::Chrome,
        version: "1.2.3".to_string(),
        download_url: format!("{}/corrupt.zip", server.uri()),
        archive: ArchiveFormat::Zip,
        platform: LINUX,
    };

    let client = reqwest::Client::new();
    let root = tempfile::tempdir().unwrap();
    let err = driverup::install::ensure_installed(&client, &release, root.path())
        .await
        .unwrap_err();
    assert!(matches!(err, driverup::ProvisionError::Extract(_)));
    assert!(!root.path().join("chrome/1.2.3").exists());
}
