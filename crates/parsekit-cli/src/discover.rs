// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source file discovery.
//!
//! Walks the listed paths, forwarding every regular file whose name ends
//! with the wanted extension to the worker channel. Both the top-level
//! paths and the discovered files are deduplicated, so listing
//! overlapping directories never parses a file twice. Symlinks are
//! skipped to avoid circular recursion.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::sync::mpsc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use crate::stats;

/// Discovers files matching `extension` under `paths`, streaming their
/// paths to `sender`. Relative paths (other than `.`) resolve under
/// `project_root`. The channel closes when discovery completes.
pub fn find_files(
    paths: &[String],
    extension: &str,
    project_root: &Utf8Path,
    sender: &mpsc::Sender<Utf8PathBuf>,
) {
    let mut unique: HashSet<Utf8PathBuf> = HashSet::new();

    for listed in paths {
        let mut top = Utf8PathBuf::from(listed);
        if !top.is_absolute() && top != "." {
            top = project_root.join(top);
        }

        if !unique.insert(top.clone()) {
            stats::bump("files.duplicate_paths", 1);
            continue;
        }
        stats::bump("files.paths", 1);
        info!("crawling path: {top}");

        let mut walked = Ok(());
        stats::time("paths.walk", true, || {
            walked = walk(&top, extension, &mut unique, sender);
        });
        if let Err(error) = walked {
            warn!("cannot walk {top}: {error}");
        }
    }
}

/// Recursively collects matching files below `path`; `path` itself may
/// also be a single file.
fn walk(
    path: &Utf8Path,
    extension: &str,
    unique: &mut HashSet<Utf8PathBuf>,
    sender: &mpsc::Sender<Utf8PathBuf>,
) -> io::Result<()> {
    if path.is_file() {
        forward(path, extension, unique, sender);
        return Ok(());
    }

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            continue;
        }
        let Ok(entry_path) = Utf8PathBuf::from_path_buf(entry.path()) else {
            warn!("skipping non-UTF-8 path under {path}");
            continue;
        };
        if file_type.is_dir() {
            walk(&entry_path, extension, unique, sender)?;
        } else if file_type.is_file() {
            forward(&entry_path, extension, unique, sender);
        }
    }
    Ok(())
}

/// Matches one file against the extension, deduplicates, and dispatches.
fn forward(
    path: &Utf8Path,
    extension: &str,
    unique: &mut HashSet<Utf8PathBuf>,
    sender: &mpsc::Sender<Utf8PathBuf>,
) {
    if !path.as_str().ends_with(extension) {
        return;
    }
    if unique.insert(path.to_path_buf()) {
        stats::bump(&format!("files.ext{extension}"), 1);
        // A closed channel just means the pool is gone; nothing to do.
        let _ = sender.send(path.to_path_buf());
    } else {
        stats::bump("files.duplicate_paths", 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn utf8(path: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).expect("temp dirs are UTF-8")
    }

    fn touch(path: &Utf8Path) {
        File::create(path)
            .and_then(|mut f| f.write_all(b"x 1\n"))
            .expect("create test file");
    }

    fn collect(paths: &[String], extension: &str, root: &Utf8Path) -> Vec<Utf8PathBuf> {
        let (sender, receiver) = mpsc::channel();
        find_files(paths, extension, root, &sender);
        drop(sender);
        let mut found: Vec<_> = receiver.into_iter().collect();
        found.sort();
        found
    }

    #[test]
    fn finds_matching_files_recursively() {
        let temp = tempfile::tempdir().unwrap();
        let root = utf8(temp.path());
        std::fs::create_dir_all(root.join("sub/deeper")).unwrap();
        touch(&root.join("a.pk"));
        touch(&root.join("sub/b.pk"));
        touch(&root.join("sub/deeper/c.pk"));
        touch(&root.join("sub/ignored.txt"));

        let found = collect(&[root.to_string()], ".pk", &root);
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|p| p.as_str().ends_with(".pk")));
    }

    #[test]
    fn duplicate_listings_are_dropped() {
        let temp = tempfile::tempdir().unwrap();
        let root = utf8(temp.path());
        touch(&root.join("only.pk"));

        let before = stats::fetch("files.duplicate_paths");
        let found = collect(&[root.to_string(), root.to_string()], ".pk", &root);
        assert_eq!(found.len(), 1);
        assert!(stats::fetch("files.duplicate_paths") > before);
    }

    #[test]
    fn relative_paths_resolve_under_project_root() {
        let temp = tempfile::tempdir().unwrap();
        let root = utf8(temp.path());
        std::fs::create_dir_all(root.join("src")).unwrap();
        touch(&root.join("src/main.pk"));

        let found = collect(&["src".to_string()], ".pk", &root);
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with(&root));
    }

    #[test]
    fn a_single_file_path_is_forwarded() {
        let temp = tempfile::tempdir().unwrap();
        let root = utf8(temp.path());
        touch(&root.join("one.pk"));

        let found = collect(&[root.join("one.pk").to_string()], ".pk", &root);
        assert_eq!(found, vec![root.join("one.pk")]);
    }

    #[test]
    fn missing_path_is_not_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let root = utf8(temp.path());
        let found = collect(&[root.join("no-such-dir").to_string()], ".pk", &root);
        assert!(found.is_empty());
    }
}
