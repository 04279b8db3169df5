use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::parser::{self, extract::Extractor, extract::MessageRecord};

/// All messages exchanged with one user, across every page of the dialog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMessages {
    pub user_id: String,
    pub messages: Vec<MessageRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub users: usize,
    pub pages: usize,
    pub messages: usize,
    pub undated: usize,
    pub dropped: usize,
    pub unrecognized_months: usize,
}

impl ArchiveStats {
    fn absorb(&mut self, other: &ArchiveStats) {
        self.users += other.users;
        self.pages += other.pages;
        self.messages += other.messages;
        self.undated += other.undated;
        self.dropped += other.dropped;
        self.unrecognized_months += other.unrecognized_months;
    }
}

pub struct ArchiveReport {
    pub users: Vec<UserMessages>,
    pub stats: ArchiveStats,
}

/// `<archive>/<dir_name>`, which must be a directory.
pub fn messages_dir(archive: &Path, dir_name: &str) -> Result<PathBuf> {
    let path = archive.join(dir_name);
    if !path.is_dir() {
        bail!("archive has no '{}' folder: {}", dir_name, path.display());
    }
    Ok(path)
}

/// One folder per user; plain files next to them are ignored.
pub fn user_folders(messages_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(messages_dir)
        .with_context(|| format!("Failed to list {}", messages_dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}

/// Trailing number of a page's file stem: `messages50.html` → 50.
fn page_number(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.len() - stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    stem[stem.len() - digits..].parse().ok()
}

/// HTML pages of a dialog in page order (`messages0`, `messages50`,
/// `messages100`, ...); unnumbered names sort first, by name.
pub fn html_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(folder).with_context(|| format!("Failed to list {}", folder.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "html") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| (page_number(a), a).cmp(&(page_number(b), b)));
    Ok(files)
}

fn user_id(folder: &Path) -> String {
    folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parse_user(
    folder: &Path,
    encoding: &str,
    extractor: &Extractor,
    pb: &ProgressBar,
) -> Result<(UserMessages, ArchiveStats)> {
    let user_id = user_id(folder);
    let mut messages = Vec::new();
    let mut stats = ArchiveStats {
        users: 1,
        ..ArchiveStats::default()
    };

    for file in html_files(folder)? {
        let bytes = fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
        let report = parser::process_page(&bytes, encoding, extractor)
            .with_context(|| format!("Failed to parse {}", file.display()))?;

        for failure in &report.failures {
            warn!(
                user = %user_id,
                page = %file.display(),
                index = failure.index,
                "Dropping message: {}",
                failure.error
            );
        }
        stats.pages += 1;
        stats.dropped += report.failures.len();
        stats.unrecognized_months += report
            .failures
            .iter()
            .filter(|f| f.error.is_unrecognized_month())
            .count();
        messages.extend(report.records);
        pb.inc(1);
    }

    stats.messages = messages.len();
    stats.undated = messages.iter().filter(|m| m.date.is_none()).count();
    Ok((UserMessages { user_id, messages }, stats))
}

/// Parse every dialog of an archive. Users come out in folder-name order and
/// each user's messages keep page order then document order.
pub fn parse_archive(
    archive: &Path,
    messages_dir_name: &str,
    encoding: &str,
    extractor: &Extractor,
    pb: &ProgressBar,
) -> Result<ArchiveReport> {
    let dir = messages_dir(archive, messages_dir_name)?;
    let folders = user_folders(&dir)?;
    info!("Found {} user folders in {}", folders.len(), dir.display());

    let page_count: usize = folders
        .iter()
        .map(|f| html_files(f).map(|files| files.len()))
        .sum::<Result<usize>>()?;
    pb.set_length(page_count as u64);

    let results: Vec<_> = folders
        .par_iter()
        .map(|folder| parse_user(folder, encoding, extractor, pb))
        .collect::<Result<_>>()?;

    let mut stats = ArchiveStats::default();
    let mut users = Vec::with_capacity(results.len());
    for (user, user_stats) in results {
        stats.absorb(&user_stats);
        users.push(user);
    }
    info!(
        "Parsed {} messages from {} pages ({} dropped)",
        stats.messages, stats.pages, stats.dropped
    );

    Ok(ArchiveReport { users, stats })
}

/// Stable chronological order; undated messages go last, keeping their order.
pub fn sort_by_date(messages: &mut [MessageRecord]) {
    messages.sort_by_key(|m| (m.date.is_none(), m.date));
}
