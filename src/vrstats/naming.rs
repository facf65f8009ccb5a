use crate::vrstats::dates::Month;
use std::path::Path;

pub const DEFAULT_EXTENSION: &str = ".pdf";
const UNKNOWN_MONTH: &str = "00";

pub fn to_two_digit_month(month_word: &str) -> Option<&'static str> {
    Month::from_word(month_word).map(Month::two_digit)
}

pub fn canonical_name(month_word: &str, year: u16) -> String {
    canonical_name_with_ext(month_word, year, DEFAULT_EXTENSION)
}

/// `MM-YYYY{ext}`. An unrecognized month word becomes `00` so a document
/// with a known year is still kept.
pub fn canonical_name_with_ext(month_word: &str, year: u16, ext: &str) -> String {
    let mm = to_two_digit_month(month_word).unwrap_or(UNKNOWN_MONTH);
    format!("{mm}-{year}{ext}")
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// First free name in `dir`: `desired` itself, else `stem-2.ext`,
/// `stem-3.ext`, ... Check-then-act; callers must be the only writer.
pub fn resolve_collision(dir: &Path, desired: &str) -> String {
    if !dir.join(desired).exists() {
        return desired.to_string();
    }

    let (stem, ext) = split_extension(desired);
    let mut suffix = 2u64;
    loop {
        let candidate = format!("{stem}-{suffix}{ext}");
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn two_digit_month_lookup() {
        assert_eq!(to_two_digit_month("january"), Some("01"));
        assert_eq!(to_two_digit_month("November"), Some("11"));
        assert_eq!(to_two_digit_month("smarch"), None);
    }

    #[test]
    fn canonical_name_formats_month_and_year() {
        assert_eq!(canonical_name("april", 2024), "04-2024.pdf");
        assert_eq!(canonical_name("december", 1999), "12-1999.pdf");
        assert_eq!(canonical_name_with_ext("may", 2022, ".xls"), "05-2022.xls");
    }

    #[test]
    fn canonical_name_degrades_unknown_month_to_zero() {
        assert_eq!(canonical_name("", 2018), "00-2018.pdf");
        assert_eq!(canonical_name("fall", 2018), "00-2018.pdf");
    }

    #[test]
    fn resolve_collision_returns_free_name_unchanged() {
        let tmp = tempdir().expect("tempdir");
        assert_eq!(resolve_collision(tmp.path(), "04-2024.pdf"), "04-2024.pdf");
    }

    #[test]
    fn resolve_collision_probes_increasing_suffixes() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("04-2024.pdf"), b"a").expect("write");
        assert_eq!(resolve_collision(tmp.path(), "04-2024.pdf"), "04-2024-2.pdf");

        fs::write(tmp.path().join("04-2024-2.pdf"), b"b").expect("write");
        assert_eq!(resolve_collision(tmp.path(), "04-2024.pdf"), "04-2024-3.pdf");
    }

    #[test]
    fn resolve_collision_has_no_fixed_cap() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("11-2020.pdf"), b"x").expect("write");
        for i in 2..=40 {
            fs::write(tmp.path().join(format!("11-2020-{i}.pdf")), b"x").expect("write");
        }
        assert_eq!(resolve_collision(tmp.path(), "11-2020.pdf"), "11-2020-41.pdf");
    }

    #[test]
    fn resolve_collision_without_extension_appends_suffix() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("README"), b"x").expect("write");
        assert_eq!(resolve_collision(tmp.path(), "README"), "README-2");
    }
}
