use crate::vrstats::dates::{extract_year, infer_month};
use crate::vrstats::harvest::ArchiveItem;
use crate::vrstats::naming::{canonical_name, resolve_collision};
use anyhow::{Context, Result};
use percent_encoding::percent_decode_str;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Anything that can hand back the bytes behind a document URL.
pub trait DocumentSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub written: Vec<PathBuf>,
    pub collisions: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RenormalizeOutcome {
    pub scanned: usize,
    pub renamed: Vec<(String, String)>,
    pub already_canonical: usize,
    pub unrecognized: usize,
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))
}

fn write_new_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let target = dir.join(name);
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("failed to write temp file for {}", target.display()))?;
    tmp.persist_noclobber(&target)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to persist {}", target.display()))?;
    Ok(target)
}

/// Download every item into `dir`. An existing file is never overwritten;
/// the item lands under the next free collision suffix instead. The first
/// fetch failure aborts the run.
pub fn fetch_all(
    source: &dyn DocumentSource,
    items: &[ArchiveItem],
    dir: &Path,
) -> Result<FetchOutcome> {
    ensure_dir(dir)?;
    let mut out = FetchOutcome::default();

    for item in items {
        let canonical = item.canonical_name();
        let Some(url) = item.url.as_deref() else {
            warn!(name = %canonical, "archive item has no source url; skipping");
            out.skipped += 1;
            continue;
        };

        let target_name = resolve_collision(dir, &canonical);
        if target_name != canonical {
            out.collisions += 1;
        }

        info!(name = %canonical, target = %target_name, url, "downloading archive document");
        let bytes = source
            .fetch(url)
            .with_context(|| format!("failed to download {canonical} from {url}"))?;
        let path = write_new_file(dir, &target_name, &bytes)?;
        out.written.push(path);
    }

    info!(count = out.written.len(), "finished downloading archive documents");
    Ok(out)
}

fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("pdf") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Canonical name for an on-disk file, if its year and month can be read
/// back out of the name. Only the year is read from the percent-decoded
/// name; the month comes from the name exactly as stored.
pub fn canonical_name_for_file(file_name: &str) -> Option<String> {
    let decoded = percent_decode_str(file_name).decode_utf8_lossy();
    let year = extract_year(&decoded)?;
    let month = infer_month(file_name, file_name, Some(year))?;
    Some(canonical_name(month.as_str(), year))
}

/// Rename every PDF in `dir` to its canonical name. Files already canonical
/// or whose year/month cannot be recovered are left alone.
pub fn renormalize_existing(dir: &Path) -> Result<RenormalizeOutcome> {
    ensure_dir(dir)?;
    let mut out = RenormalizeOutcome::default();

    for path in list_pdfs(dir)? {
        out.scanned += 1;

        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            warn!(path = %path.display(), "file name is not valid UTF-8; leaving it alone");
            out.unrecognized += 1;
            continue;
        };
        let Some(target) = canonical_name_for_file(&name) else {
            out.unrecognized += 1;
            continue;
        };
        if target == name {
            out.already_canonical += 1;
            continue;
        }

        let final_name = resolve_collision(dir, &target);
        info!(from = %name, to = %final_name, "renaming archive document");
        fs::rename(dir.join(&name), dir.join(&final_name))
            .with_context(|| format!("failed to rename {name} to {final_name}"))?;
        out.renamed.push((name, final_name));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vrstats::dates::Month;
    use std::collections::HashMap;
    use tempfile::tempdir;

    struct FakeSource {
        bodies: HashMap<String, Vec<u8>>,
    }

    impl DocumentSource for FakeSource {
        fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("{url} returned HTTP 404 Not Found"))
        }
    }

    fn item(url: &str, year: u16, month: Month) -> ArchiveItem {
        ArchiveItem {
            url: Some(url.to_string()),
            year,
            month,
        }
    }

    #[test]
    fn fetch_all_writes_canonical_names() {
        let tmp = tempdir().expect("tempdir");
        let source = FakeSource {
            bodies: HashMap::from([
                ("https://a.test/1.pdf".to_string(), b"one".to_vec()),
                ("https://a.test/2.pdf".to_string(), b"two".to_vec()),
            ]),
        };
        let items = vec![
            item("https://a.test/1.pdf", 2024, Month::April),
            item("https://a.test/2.pdf", 2023, Month::November),
        ];

        let out = fetch_all(&source, &items, tmp.path()).expect("fetch");
        assert_eq!(out.written.len(), 2);
        assert_eq!(out.collisions, 0);
        assert_eq!(fs::read(tmp.path().join("04-2024.pdf")).expect("read"), b"one");
        assert_eq!(fs::read(tmp.path().join("11-2023.pdf")).expect("read"), b"two");
    }

    #[test]
    fn fetch_all_never_overwrites_existing_files() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("04-2024.pdf"), b"old").expect("seed");
        let source = FakeSource {
            bodies: HashMap::from([("https://a.test/1.pdf".to_string(), b"new".to_vec())]),
        };

        let out = fetch_all(
            &source,
            &[item("https://a.test/1.pdf", 2024, Month::April)],
            tmp.path(),
        )
        .expect("fetch");

        assert_eq!(out.collisions, 1);
        assert_eq!(fs::read(tmp.path().join("04-2024.pdf")).expect("read"), b"old");
        assert_eq!(fs::read(tmp.path().join("04-2024-2.pdf")).expect("read"), b"new");
    }

    #[test]
    fn fetch_all_aborts_on_first_failure() {
        let tmp = tempdir().expect("tempdir");
        let source = FakeSource {
            bodies: HashMap::from([("https://a.test/3.pdf".to_string(), b"three".to_vec())]),
        };
        let items = vec![
            item("https://a.test/missing.pdf", 2022, Month::May),
            item("https://a.test/3.pdf", 2022, Month::November),
        ];

        let err = fetch_all(&source, &items, tmp.path()).expect_err("should fail");
        assert!(format!("{err:#}").contains("404"));
        assert!(!tmp.path().join("11-2022.pdf").exists());
    }

    #[test]
    fn canonical_name_for_file_reads_month_and_year() {
        assert_eq!(
            canonical_name_for_file("VR Stats November 2019.pdf").as_deref(),
            Some("11-2019.pdf")
        );
        assert_eq!(
            canonical_name_for_file("Primary%202020.pdf").as_deref(),
            Some("06-2020.pdf")
        );
        assert_eq!(canonical_name_for_file("11-2020.pdf"), None);
        assert_eq!(
            canonical_name_for_file("Voter%20Stats%20March%202019.pdf"),
            None
        );
        assert_eq!(canonical_name_for_file("notes.pdf"), None);
    }

    #[test]
    fn renormalize_renames_and_resolves_collisions() {
        let tmp = tempdir().expect("tempdir");
        let dir = tmp.path();
        fs::write(dir.join("05-2022.pdf"), b"existing").expect("seed");
        fs::write(dir.join("May 2022 stats.pdf"), b"incoming").expect("seed");
        fs::write(dir.join("General Election 2021.pdf"), b"general").expect("seed");
        fs::write(dir.join("11-2020.pdf"), b"canonical").expect("seed");
        fs::write(dir.join("readme.txt"), b"ignored").expect("seed");

        let out = renormalize_existing(dir).expect("renormalize");

        assert_eq!(out.scanned, 4);
        assert_eq!(out.renamed.len(), 2);
        assert_eq!(fs::read(dir.join("05-2022.pdf")).expect("read"), b"existing");
        assert_eq!(fs::read(dir.join("05-2022-2.pdf")).expect("read"), b"incoming");
        assert_eq!(fs::read(dir.join("11-2021.pdf")).expect("read"), b"general");
        assert_eq!(fs::read(dir.join("11-2020.pdf")).expect("read"), b"canonical");
        assert!(!dir.join("11-2020-2.pdf").exists());
        assert!(dir.join("readme.txt").exists());
    }

    #[test]
    fn renormalize_leaves_encoded_month_names_alone() {
        let tmp = tempdir().expect("tempdir");
        let encoded = "Voter%20Stats%20March%202019.pdf";
        fs::write(tmp.path().join(encoded), b"march").expect("seed");

        let out = renormalize_existing(tmp.path()).expect("renormalize");

        assert_eq!(out.scanned, 1);
        assert_eq!(out.unrecognized, 1);
        assert!(out.renamed.is_empty());
        assert!(tmp.path().join(encoded).exists());
        assert!(!tmp.path().join("03-2019.pdf").exists());
    }

    #[cfg(unix)]
    #[test]
    fn renormalize_counts_non_utf8_names_as_unrecognized() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempdir().expect("tempdir");
        let odd = OsStr::from_bytes(b"General \xff 2018.pdf");
        if fs::write(tmp.path().join(odd), b"odd").is_err() {
            // Some filesystems reject non-UTF-8 names outright.
            return;
        }
        fs::write(tmp.path().join("General Election 2021.pdf"), b"general").expect("seed");

        let out = renormalize_existing(tmp.path()).expect("renormalize");

        assert_eq!(out.scanned, 2);
        assert_eq!(out.unrecognized, 1);
        assert_eq!(out.renamed.len(), 1);
        assert!(tmp.path().join(odd).exists());
        assert!(tmp.path().join("11-2021.pdf").exists());
    }

    #[test]
    fn renormalize_is_idempotent() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("Voter Stats April 2016.pdf"), b"x").expect("seed");

        let first = renormalize_existing(tmp.path()).expect("first pass");
        assert_eq!(first.renamed.len(), 1);
        let second = renormalize_existing(tmp.path()).expect("second pass");
        assert!(second.renamed.is_empty());
        assert!(tmp.path().join("04-2016.pdf").exists());
    }
}
