use crate::error::{Error, Result};
use log::{debug, info, warn};
use rust_htslib::bam;
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Created,
    AlreadyLinked,
    Replaced,
}

/// Makes an aligned BAM and its index available to the next pipeline stage
pub trait Linker: Send + Sync {
    fn link(&self, source: &Path, destination: &Path) -> Result<LinkStatus>;
}

/// Hard links the BAM and its `.bai` index.
/// Existing destinations are only replaced with `force`, unless they already are the source.
pub struct HardLinker {
    pub force: bool,
    /// open the BAM with htslib before linking it
    pub verify_index: bool,
}

impl Linker for HardLinker {
    fn link(&self, source: &Path, destination: &Path) -> Result<LinkStatus> {
        let source_index = index_path(source)?;
        if self.verify_index {
            verify_bam_index(source)?;
        }
        let destination_index = destination_index_path(source, &source_index, destination);
        // both destinations are checked before either is linked
        let bam_status = plan_link(source, destination, self.force)?;
        let index_status = plan_link(&source_index, &destination_index, self.force)?;
        apply_link(source, destination, bam_status)?;
        apply_link(&source_index, &destination_index, index_status)?;
        info!(
            "Linked {} -> {} ({bam_status:?}), index ({index_status:?})",
            source.display(),
            destination.display()
        );
        // the pair is only already linked when both files were
        Ok(match (bam_status, index_status) {
            (LinkStatus::AlreadyLinked, LinkStatus::AlreadyLinked) => LinkStatus::AlreadyLinked,
            (LinkStatus::Replaced, _) | (_, LinkStatus::Replaced) => LinkStatus::Replaced,
            _ => LinkStatus::Created,
        })
    }
}

fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(ext);
    PathBuf::from(s)
}

/// `sample.bam.bai` when present, otherwise `sample.bai`
pub fn index_path(bam: &Path) -> Result<PathBuf> {
    let appended = with_appended_extension(bam, ".bai");
    if appended.is_file() {
        return Ok(appended);
    }
    let replaced = bam.with_extension("bai");
    if replaced.is_file() {
        return Ok(replaced);
    }
    Err(Error::io(
        appended,
        std::io::Error::new(std::io::ErrorKind::NotFound, "BAM index not found"),
    ))
}

/// The destination index follows the naming style of the source index
fn destination_index_path(source: &Path, source_index: &Path, destination: &Path) -> PathBuf {
    if source_index == with_appended_extension(source, ".bai") {
        with_appended_extension(destination, ".bai")
    } else {
        destination.with_extension("bai")
    }
}

fn same_file(a: &fs::Metadata, b: &fs::Metadata) -> bool {
    a.dev() == b.dev() && a.ino() == b.ino()
}

/// Device of the closest existing directory that will hold `destination`
fn destination_device(destination: &Path) -> Option<u64> {
    destination
        .ancestors()
        .skip(1)
        .map(|dir| if dir.as_os_str().is_empty() { Path::new(".") } else { dir })
        .find_map(|dir| fs::metadata(dir).ok())
        .map(|meta| meta.dev())
}

/// What linking `source` to `destination` would do, without touching either file
fn plan_link(source: &Path, destination: &Path, force: bool) -> Result<LinkStatus> {
    let source_meta = fs::metadata(source).map_err(|e| Error::io(source, e))?;
    if destination_device(destination).is_some_and(|dev| dev != source_meta.dev()) {
        return Err(Error::CrossDevice {
            source_path: source.to_path_buf(),
            destination: destination.to_path_buf(),
        });
    }
    match fs::symlink_metadata(destination) {
        Ok(dest_meta) if same_file(&source_meta, &dest_meta) => Ok(LinkStatus::AlreadyLinked),
        Ok(_) if force => Ok(LinkStatus::Replaced),
        Ok(_) => Err(Error::LinkConflict {
            destination: destination.to_path_buf(),
        }),
        Err(_) => Ok(LinkStatus::Created),
    }
}

/// Hidden name next to `destination` used while replacing it
fn staging_path(destination: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(destination.file_name().unwrap_or_default());
    name.push(".karyocheck-tmp");
    destination.with_file_name(name)
}

/// An existing destination is only swapped out by a rename once the new link exists
fn apply_link(source: &Path, destination: &Path, status: LinkStatus) -> Result<()> {
    match status {
        LinkStatus::AlreadyLinked => {
            debug!("{} is already linked", destination.display());
            Ok(())
        }
        LinkStatus::Replaced => {
            warn!("Replacing existing {}", destination.display());
            let staging = staging_path(destination);
            if fs::symlink_metadata(&staging).is_ok() {
                fs::remove_file(&staging).map_err(|e| Error::io(&staging, e))?;
            }
            fs::hard_link(source, &staging).map_err(|e| Error::io(&staging, e))?;
            fs::rename(&staging, destination).map_err(|e| {
                let _ = fs::remove_file(&staging);
                Error::io(destination, e)
            })
        }
        LinkStatus::Created => {
            if let Some(parent) = destination.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                }
            }
            fs::hard_link(source, destination).map_err(|e| Error::io(destination, e))
        }
    }
}

/// Check that htslib can open the BAM together with its index before it is handed on
pub fn verify_bam_index(bam_path: &Path) -> Result<()> {
    bam::IndexedReader::from_path(bam_path).map_err(|e| Error::Bam {
        path: bam_path.to_path_buf(),
        msg: e.to_string(),
    })?;
    Ok(())
}
