use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{RatingError, Result};

/// Fetches the archive body. Anything but `200 OK` is an error.
pub async fn download(url: &str) -> Result<Vec<u8>> {
    info!("Downloading archive from {}", url);

    let response = reqwest::get(url).await?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(RatingError::Download {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await?;
    info!("Downloaded {} bytes", body.len());
    Ok(body.to_vec())
}

/// Unpacks a gzip-compressed tarball under `dest`.
///
/// Only directories and regular files are supported; any other entry type
/// (links, devices, fifos) aborts the extraction.
pub fn extract<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = Archive::new(GzDecoder::new(reader));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        let entry_type = entry.header().entry_type();

        if !stays_inside(&path) {
            return Err(RatingError::UnsupportedArchiveEntry {
                path: path.display().to_string(),
                kind: "path escaping the archive root".to_string(),
            });
        }

        let target = dest.join(&path);
        match entry_type {
            EntryType::Directory => fs::create_dir_all(&target)?,
            EntryType::Regular => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = File::create(&target)?;
                io::copy(&mut entry, &mut out)?;
            }
            other => {
                return Err(RatingError::UnsupportedArchiveEntry {
                    path: path.display().to_string(),
                    kind: format!("{:?}", other),
                })
            }
        }
        debug!("Extracted {}", path.display());
    }

    Ok(())
}

fn stays_inside(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Temporary directory holding the extracted tables.
///
/// The directory is removed when the workspace is dropped, whether the run
/// succeeded or not.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn create(prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        debug!("Created workspace at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn unpack<R: Read>(&self, reader: R) -> Result<()> {
        extract(reader, self.dir.path())
    }

    /// Directory inside the unpacked archive that holds the tables.
    pub fn data_dir(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Removes the directory now, reporting any failure.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!("Removed workspace {}", path.display());
        Ok(())
    }
}
