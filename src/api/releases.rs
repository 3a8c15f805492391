//! GitHub-release based update source.
//!
//! - **Check**: reads `releases/latest`, compares its tag with the running
//!   version and picks the asset built for this platform.
//! - **Download**: stores the artifact under `{data_dir}/updates/`.
//! - **Install**: unpacks a `.tar.gz` over the running executable, or hands
//!   an `.exe`/`.msi` installer to the OS and exits so it can replace us.

use super::types::{AckReply, DownloadReply, UpdateCheckReply};
use super::BackendError;
use crate::libs::config::UpdateConfig;
use crate::libs::data_storage::{DataStorage, APP_NAME, APP_VERSION};
use crate::libs::messages::Message;
use flate2::read::GzDecoder;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::cmp::Ordering;
use std::env;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tar::Archive;
use tracing::{info, warn};

const UPDATES_DIR: &str = "updates";
const INSTALLER_EXIT_DELAY: Duration = Duration::from_secs(1);
/// Unattended install that closes the running app.
const EXE_INSTALLER_ARGS: [&str; 2] = ["/SILENT", "/CLOSEAPPLICATIONS"];
const MSI_INSTALLER_ARGS: [&str; 2] = ["/quiet", "/norestart"];

#[derive(Deserialize, Debug)]
struct Release {
    #[serde(default)]
    tag_name: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Deserialize, Debug)]
struct Asset {
    browser_download_url: String,
    name: String,
}

#[derive(Debug, Clone)]
pub struct Releases {
    client: Client,
    name: String,
    version: String,
    releases_url: String,
}

impl Releases {
    pub fn new(config: &UpdateConfig) -> Self {
        Self {
            client: Client::new(),
            name: APP_NAME.to_owned(),
            version: APP_VERSION.to_owned(),
            releases_url: format!("https://api.github.com/repos/{}/releases/latest", config.repository),
        }
    }

    pub async fn check(&self) -> Result<UpdateCheckReply, BackendError> {
        let res = self
            .client
            .get(&self.releases_url)
            .header("User-Agent", &self.name)
            .send()
            .await?;

        if res.status() != StatusCode::OK {
            return Ok(UpdateCheckReply::failed(
                Message::UpdateCheckStatusFailed(res.status().as_u16()).to_string(),
            ));
        }

        let release = res.json::<Release>().await?;
        let latest_version = match release.tag_name.as_deref().map(|tag| tag.trim_start_matches('v')) {
            Some(version) if !version.is_empty() => version.to_owned(),
            _ => return Ok(UpdateCheckReply::failed(Message::LatestVersionUnknown.to_string())),
        };

        if !is_newer(&latest_version, &self.version) {
            let mut reply = UpdateCheckReply::up_to_date(&self.version);
            reply.latest_version = latest_version;
            return Ok(reply);
        }

        let platform_name = platform_asset_name(&self.name, &latest_version);
        let download_url = release
            .assets
            .iter()
            .find(|asset| asset.name.contains(&platform_name))
            .or_else(|| release.assets.first())
            .map(|asset| asset.browser_download_url.clone())
            .unwrap_or_default();
        info!(latest = %latest_version, url = %download_url, "newer release found");

        let mut reply = UpdateCheckReply::available(&self.version, &latest_version, &download_url);
        reply.release_notes = release.body;
        Ok(reply)
    }

    pub async fn download(&self, url: &str) -> Result<DownloadReply, BackendError> {
        let res = self.client.get(url).header("User-Agent", &self.name).send().await?;
        if !res.status().is_success() {
            return Ok(DownloadReply::failed(format!(
                "{} ({})",
                Message::UpdateDownloadFailed,
                res.status()
            )));
        }

        let dir = DataStorage::new()
            .get_dir(UPDATES_DIR)
            .map_err(|error| BackendError::Request(error.to_string()))?;
        let file_path = dir.join(artifact_file_name(url, &self.name));

        let content = res.bytes().await?;
        tokio::fs::write(&file_path, &content).await?;
        info!(path = %file_path.display(), bytes = content.len(), "update downloaded");

        Ok(DownloadReply::ok(file_path))
    }

    pub async fn install(&self, file_path: &Path) -> Result<AckReply, BackendError> {
        if !file_path.exists() {
            return Ok(AckReply::failed(Message::UpdateFileNotFound.to_string()));
        }

        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if file_name.ends_with(".tar.gz") || file_name.ends_with(".tgz") {
            let archive_path = file_path.to_path_buf();
            let replaced = tokio::task::spawn_blocking(move || extract_and_replace_binary(&archive_path))
                .await
                .map_err(|error| BackendError::Request(error.to_string()))??;
            if !replaced {
                return Ok(AckReply::failed(Message::UpdateBinaryNotFoundInArchive.to_string()));
            }
            info!("binary replaced");
            Ok(AckReply::ok())
        } else if file_name.ends_with(".exe") || file_name.ends_with(".msi") {
            installer_command(file_path).spawn()?;
            info!(path = %file_path.display(), "installer started, exiting");

            tokio::spawn(async {
                tokio::time::sleep(INSTALLER_EXIT_DELAY).await;
                std::process::exit(0);
            });
            Ok(AckReply::ok())
        } else {
            let extension = file_path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            warn!(%extension, "unsupported update artifact");
            Ok(AckReply::failed(Message::UnsupportedUpdateFileType(extension).to_string()))
        }
    }
}

/// Unattended installer invocation for an `.exe` or `.msi` artifact.
pub fn installer_command(file_path: &Path) -> Command {
    let is_msi = file_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("msi"));
    if is_msi {
        let mut msiexec = Command::new("msiexec");
        msiexec.arg("/i").arg(file_path).args(MSI_INSTALLER_ARGS);
        msiexec
    } else {
        let mut installer = Command::new(file_path);
        installer.args(EXE_INSTALLER_ARGS);
        installer
    }
}

/// `true` when `latest` is strictly newer than `current`.
pub fn is_newer(latest: &str, current: &str) -> bool {
    compare_versions(latest, current) == Ordering::Greater
}

/// Numeric comparison of dot-separated versions.
///
/// Missing parts are zero (`1.2` == `1.2.0`). Each part is read from its
/// leading digits, so a part with none counts as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a, b) = (version_parts(a), version_parts(b));
    let len = a.len().max(b.len());

    for i in 0..len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn version_parts(version: &str) -> Vec<u64> {
    version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

/// Release asset name for this platform, e.g. `tracklet-v1.2.0-x86_64-unknown-linux-musl`.
pub fn platform_asset_name(name: &str, version: &str) -> String {
    let arch = env::consts::ARCH;
    let os = match env::consts::OS {
        "windows" => "pc-windows-msvc",
        "macos" => "apple-darwin",
        _ => "unknown-linux-musl",
    };
    format!("{}-v{}-{}-{}", name, version, arch, os)
}

/// Last path segment of the URL without query or fragment, or
/// `{fallback}.tar.gz` when the URL has none.
pub fn artifact_file_name(url: &str, fallback: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("{}.tar.gz", fallback))
}

fn extract_and_replace_binary(tar_gz_path: &Path) -> Result<bool, BackendError> {
    let current_exe = env::current_exe()?;
    replace_binary_from_archive(tar_gz_path, &current_exe)
}

/// Installs the archive entry named like `target` over `target`, keeping
/// the old binary as `.bak`. Other entries are unpacked next to `target`.
///
/// The new binary is staged beside `target` first. `target` is only moved
/// aside once staging succeeded, and is moved back if the swap fails.
/// Returns `false` when the archive has no matching binary.
pub fn replace_binary_from_archive(tar_gz_path: &Path, target: &Path) -> Result<bool, BackendError> {
    let (Some(exe_name), Some(install_dir)) = (target.file_name(), target.parent()) else {
        return Ok(false);
    };
    let staged = install_dir.join(format!(".{}.new", exe_name.to_string_lossy()));
    let backup = target.with_extension("bak");

    match unpack_archive(tar_gz_path, exe_name, install_dir, &staged) {
        Ok(true) => {}
        Ok(false) => return Ok(false),
        Err(error) => {
            let _ = fs::remove_file(&staged);
            return Err(error.into());
        }
    }

    fs::rename(target, &backup)?;
    if let Err(error) = fs::rename(&staged, target) {
        warn!(%error, "binary swap failed, restoring previous binary");
        fs::rename(&backup, target)?;
        let _ = fs::remove_file(&staged);
        return Err(error.into());
    }
    Ok(true)
}

fn unpack_archive(tar_gz_path: &Path, exe_name: &OsStr, install_dir: &Path, staged: &Path) -> io::Result<bool> {
    let mut archive = Archive::new(GzDecoder::new(File::open(tar_gz_path)?));
    let mut found = false;

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();
        if entry_path.file_name() == Some(exe_name) {
            entry.unpack(staged)?;
            found = true;
        } else {
            entry.unpack_in(install_dir)?;
        }
    }

    Ok(found)
}
