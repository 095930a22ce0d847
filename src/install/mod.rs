//! Download and extract driver archives; the version-qualified directory on
//! disk acts as the install cache.

use crate::error::{ProvisionError, Result};
use crate::release::{ArchiveFormat, DriverRelease};
use std::path::{Path, PathBuf};

/// Default root for extracted drivers, relative to the working directory.
/// Layout: `driver/<browser>/<version>/<driver binary>`.
pub const DRIVER_ROOT: &str = "driver";

/// Ensure the release is present under `root`; return the executable path.
///
/// Presence of the version-qualified directory is treated as proof of a valid
/// prior install, so a second call for the same version is a no-op.
pub async fn ensure_installed(
    client: &reqwest::Client,
    release: &DriverRelease,
    root: &Path,
) -> Result<PathBuf> {
    let install_dir = release.install_dir(root);
    let exe_path = install_dir.join(release.executable_name());
    if install_dir.exists() {
        tracing::info!("Executable driver found at {}", install_dir.display());
        return Ok(exe_path);
    }

    tracing::info!(
        "No executable {} for version {}; downloading",
        release.executable_name(),
        release.version
    );
    download_and_extract(client, release, &install_dir).await?;
    set_executable(&exe_path)?;
    Ok(exe_path)
}

/// Stream the archive to a transient file, extract into a temporary sibling
/// of `install_dir`, then rename into place and delete the archive. The
/// rename keeps a crashed extraction from being mistaken for a finished one.
async fn download_and_extract(
    client: &reqwest::Client,
    release: &DriverRelease,
    install_dir: &Path,
) -> Result<()> {
    let parent = install_dir
        .parent()
        .ok_or_else(|| ProvisionError::Extract("install dir has no parent".to_string()))?;
    std::fs::create_dir_all(parent)?;

    let archive_path = parent.join(release.archive_file_name());
    download_to_file(client, &release.download_url, &archive_path).await?;

    let staging_dir = staging_dir_for(install_dir)?;
    if staging_dir.exists() {
        std::fs::remove_dir_all(&staging_dir)?;
    }
    std::fs::create_dir_all(&staging_dir)?;

    match release.archive {
        ArchiveFormat::Zip => extract_zip(&archive_path, &staging_dir)?,
        ArchiveFormat::TarGz => extract_tar_gz(&archive_path, &staging_dir)?,
    }

    std::fs::rename(&staging_dir, install_dir)?;
    std::fs::remove_file(&archive_path).ok();
    Ok(())
}

fn staging_dir_for(install_dir: &Path) -> Result<PathBuf> {
    let name = install_dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ProvisionError::Extract("install dir has no name".to_string()))?;
    Ok(install_dir.with_file_name(format!(".{}.partial", name)))
}

async fn download_to_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    use futures::stream::StreamExt;
    use std::io::Write;

    tracing::info!("Downloading from {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ProvisionError::Download(format!("{}: {}", url, e)))?
        .error_for_status()
        .map_err(|e| ProvisionError::Download(format!("{}: {}", url, e)))?;

    let mut file = std::fs::File::create(dest)?;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ProvisionError::Download(format!("{}: {}", url, e)))?;
        file.write_all(&chunk)?;
    }
    Ok(())
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ProvisionError::Extract(format!("invalid zip: {}", e)))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ProvisionError::Extract(format!("zip entry: {}", e)))?;
        // Entry names are untrusted; reject anything that would resolve
        // outside the extraction directory.
        let out_path = match entry.enclosed_name() {
            Some(safe) => dest_dir.join(safe),
            None => {
                return Err(ProvisionError::Extract(format!(
                    "zip entry escapes extraction directory: {}",
                    entry.name()
                )))
            }
        };
        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
        } else {
            if let Some(p) = out_path.parent() {
                std::fs::create_dir_all(p)?;
            }
            let mut out = std::fs::File::create(&out_path)?;
            std::io::copy(&mut entry, &mut out)?;
        }
    }
    Ok(())
}

fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    use flate2::read::GzDecoder;

    let file = std::fs::File::open(archive_path)?;
    let gz = GzDecoder::new(file);
    let mut archive = tar::Archive::new(gz);
    archive
        .unpack(dest_dir)
        .map_err(|e| ProvisionError::Extract(format!("invalid tarball: {}", e)))?;
    Ok(())
}

/// Set the executable bit on the driver binary if it is not already set.
#[cfg(unix)]
pub fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if !path.is_file() {
        return Ok(());
    }
    let metadata = std::fs::metadata(path)?;
    let mode = metadata.permissions().mode();
    if mode & 0o111 == 0 {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode | 0o755))?;
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Append the absolute install dir to the process-visible `PATH`. Repeated
/// calls append duplicates.
pub fn register_on_search_path(dir: &Path) -> Result<()> {
    let absolute = std::fs::canonicalize(dir)?;
    let current = std::env::var_os("PATH").unwrap_or_default();
    let appended = appended_search_path(&current.to_string_lossy(), &absolute);
    std::env::set_var("PATH", &appended);
    tracing::info!("Registered {} on PATH", absolute.display());
    Ok(())
}

pub(crate) fn appended_search_path(current: &str, dir: &Path) -> String {
    let separator = if cfg!(windows) { ';' } else { ':' };
    if current.is_empty() {
        dir.display().to_string()
    } else {
        format!("{}{}{}", current, separator, dir.display())
    }
}
