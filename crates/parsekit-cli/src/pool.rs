// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The per-file worker pool.
//!
//! Discovery runs on its own thread, streaming paths into a channel; a
//! fixed set of workers drain it, running the parse function once per
//! file. Each worker builds its own lexer/parser pair, so no parsing
//! state is shared; the only cross-thread state is the stats tables.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use camino::{Utf8Path, Utf8PathBuf};

use crate::discover;
use crate::stats;

/// Discovers files matching `extension` under `paths` and runs
/// `parse_fn` on each across `jobs` workers. Returns when discovery and
/// all workers have finished.
///
/// With `time_each` set, every file's parse duration is recorded under
/// its own path label.
pub fn parse_files<F>(
    extension: &str,
    paths: &[String],
    project_root: &Utf8Path,
    jobs: usize,
    time_each: bool,
    parse_fn: F,
) where
    F: Fn(&Utf8Path) + Send + Sync,
{
    let jobs = jobs.max(1);
    let (sender, receiver) = mpsc::channel::<Utf8PathBuf>();
    let receiver = Arc::new(Mutex::new(receiver));

    thread::scope(|scope| {
        scope.spawn(move || {
            stats::time("parsing.findfiles", true, || {
                discover::find_files(paths, extension, project_root, &sender);
            });
            // Dropping the sender closes the channel and releases the
            // workers.
        });

        for _ in 0..jobs {
            let receiver = Arc::clone(&receiver);
            let parse_fn = &parse_fn;
            scope.spawn(move || {
                loop {
                    // Hold the lock only to receive, never while parsing.
                    let next = {
                        let Ok(queue) = receiver.lock() else { break };
                        queue.recv()
                    };
                    let Ok(path) = next else { break };
                    if time_each {
                        stats::time(path.as_str(), false, || parse_fn(&path));
                    } else {
                        parse_fn(&path);
                    }
                }
            });
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs::File;
    use std::io::Write;

    fn touch(path: &Utf8Path) {
        File::create(path)
            .and_then(|mut f| f.write_all(b"1 2 3\n"))
            .expect("create test file");
    }

    #[test]
    fn every_discovered_file_is_parsed_exactly_once() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        for name in ["a.pk", "b.pk", "c.pk", "d.pk"] {
            touch(&root.join(name));
        }
        touch(&root.join("skipped.txt"));

        let parsed = Mutex::new(Vec::new());
        parse_files(".pk", &[root.to_string()], &root, 3, false, |path| {
            parsed.lock().unwrap().push(path.to_path_buf());
        });

        let parsed = parsed.into_inner().unwrap();
        assert_eq!(parsed.len(), 4);
        let unique: BTreeSet<_> = parsed.iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn zero_jobs_still_runs_one_worker() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        touch(&root.join("one.pk"));

        let parsed = Mutex::new(0usize);
        parse_files(".pk", &[root.to_string()], &root, 0, false, |_| {
            *parsed.lock().unwrap() += 1;
        });
        assert_eq!(parsed.into_inner().unwrap(), 1);
    }

    #[test]
    fn empty_tree_completes() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
        parse_files(".pk", &[root.to_string()], &root, 2, false, |_| {
            panic!("nothing to parse");
        });
    }
}
