//! Filesystem helpers behind `system::*`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::Serialize;

/// What `system::get_file_info` returns, as a script map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub modified: i64,
    pub size: i64,
}

pub fn file_info(path: &Path) -> io::Result<FileInfo> {
    let meta = fs::metadata(path)?;
    let modified = meta
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    Ok(FileInfo {
        kind: if meta.is_dir() { "dir" } else { "file" }.to_string(),
        modified,
        size: meta.len() as i64,
    })
}

/// Entry names, sorted
pub fn list_dir(path: &Path) -> io::Result<Vec<String>> {
    let mut names = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path)
}

/// Filesystem type of the mount holding `path`
pub fn fs_type(path: &Path) -> String {
    if !cfg!(target_os = "linux") {
        return "unknown".to_string();
    }
    let Ok(mounts) = fs::read_to_string("/proc/self/mounts") else {
        return "unknown".to_string();
    };
    let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    mount_type(&mounts, &path).unwrap_or_else(|| "unknown".to_string())
}

/// Longest mount point in a `/proc/self/mounts` listing that contains `path`.
fn mount_type(mounts: &str, path: &Path) -> Option<String> {
    mounts
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _device = fields.next()?;
            let mount_point = unescape_mount(fields.next()?);
            let fs_type = fields.next()?;
            Some((mount_point, fs_type))
        })
        .filter(|(mount_point, _)| path.starts_with(mount_point))
        .max_by_key(|(mount_point, _)| mount_point.len())
        .map(|(_, fs_type)| fs_type.to_string())
}

/// Mount points escape whitespace as octal, e.g. `\040` for a space.
fn unescape_mount(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut rest = field;
    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let code = rest
            .get(pos + 1..pos + 4)
            .and_then(|digits| u8::from_str_radix(digits, 8).ok());
        match code {
            Some(byte) => {
                out.push(byte as char);
                rest = &rest[pos + 4..];
            }
            None => {
                out.push('\\');
                rest = &rest[pos + 1..];
            }
        }
    }
    out.push_str(rest);
    out
}
