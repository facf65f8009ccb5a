use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

static YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year pattern compiles"));

static MONTH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = Month::ALL
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({alternation})\b")).expect("month pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Month::January => "january",
            Month::February => "february",
            Month::March => "march",
            Month::April => "april",
            Month::May => "may",
            Month::June => "june",
            Month::July => "july",
            Month::August => "august",
            Month::September => "september",
            Month::October => "october",
            Month::November => "november",
            Month::December => "december",
        }
    }

    pub fn two_digit(self) -> &'static str {
        match self {
            Month::January => "01",
            Month::February => "02",
            Month::March => "03",
            Month::April => "04",
            Month::May => "05",
            Month::June => "06",
            Month::July => "07",
            Month::August => "08",
            Month::September => "09",
            Month::October => "10",
            Month::November => "11",
            Month::December => "12",
        }
    }

    pub fn from_word(word: &str) -> Option<Month> {
        let lowered = word.trim().to_ascii_lowercase();
        Month::ALL.into_iter().find(|m| m.as_str() == lowered)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Month of the Pennsylvania primary election, by election year.
///
/// Normally May; moved to April in presidential years and to June in 2020.
static PRIMARY_MONTH_BY_YEAR: &[(u16, Month)] = &[
    (1999, Month::May),
    (2000, Month::April),
    (2001, Month::May),
    (2002, Month::May),
    (2003, Month::May),
    (2004, Month::April),
    (2005, Month::May),
    (2006, Month::May),
    (2007, Month::May),
    (2008, Month::April),
    (2009, Month::May),
    (2010, Month::May),
    (2011, Month::May),
    (2012, Month::April),
    (2013, Month::May),
    (2014, Month::May),
    (2015, Month::May),
    (2016, Month::April),
    (2017, Month::May),
    (2018, Month::May),
    (2019, Month::May),
    (2020, Month::June),
    (2021, Month::May),
    (2022, Month::May),
    (2023, Month::May),
    (2024, Month::April),
    (2025, Month::May),
];

const NOVEMBER_KEYWORDS: &[&str] = &["general", "municipal"];
const NOVEMBER_FILE_TOKENS: &[&str] = &["electionnov", "nov"];
const PRIMARY_KEYWORD: &str = "primary";

// Order matters: first hit wins.
const FILE_NAME_MONTH_FRAGMENTS: &[(&str, Month)] = &[
    ("apr", Month::April),
    ("may", Month::May),
    ("jun", Month::June),
    ("nov", Month::November),
];

pub fn extract_year(text: &str) -> Option<u16> {
    YEAR_REGEX
        .find(text)
        .and_then(|m| m.as_str().parse::<u16>().ok())
}

pub fn extract_month_word(text: &str) -> Option<Month> {
    MONTH_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Month::from_word(m.as_str()))
}

pub fn primary_month_for_year(year: u16) -> Option<Month> {
    PRIMARY_MONTH_BY_YEAR
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, month)| *month)
}

/// Infer the reporting month of an archived document.
///
/// Rules are tried in a fixed order and the first hit wins: an explicit
/// month word in the link text, then in the file name, then election-type
/// keywords (general/municipal mean November, primary goes through the
/// primary-month table), then bare three-letter fragments of the file name.
pub fn infer_month(link_text: &str, file_name: &str, year: Option<u16>) -> Option<Month> {
    if let Some(month) = extract_month_word(link_text).or_else(|| extract_month_word(file_name)) {
        return Some(month);
    }

    let text = link_text.to_lowercase();
    let name = file_name.to_lowercase();
    let mentions = |needle: &str| text.contains(needle) || name.contains(needle);

    if NOVEMBER_KEYWORDS.iter().any(|kw| mentions(kw))
        || NOVEMBER_FILE_TOKENS.iter().any(|tok| name.contains(tok))
    {
        return Some(Month::November);
    }

    if mentions(PRIMARY_KEYWORD)
        && let Some(month) = year.and_then(primary_month_for_year)
    {
        return Some(month);
    }

    FILE_NAME_MONTH_FRAGMENTS
        .iter()
        .find(|(fragment, _)| name.contains(fragment))
        .map(|(_, month)| *month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_year_finds_first_nineteen_or_twenty_token() {
        assert_eq!(extract_year("Voter Stats 2019 and 2020"), Some(2019));
        assert_eq!(extract_year("November 1998 report"), Some(1998));
        assert_eq!(extract_year("11-2020.pdf"), Some(2020));
        assert_eq!(extract_year("FY 2019-20"), Some(2019));
    }

    #[test]
    fn extract_year_rejects_other_centuries_and_embedded_digits() {
        assert_eq!(extract_year("no year here"), None);
        assert_eq!(extract_year("1850 census"), None);
        assert_eq!(extract_year("2100"), None);
        assert_eq!(extract_year("id12020"), None);
        assert_eq!(extract_year("202"), None);
    }

    #[test]
    fn extract_month_word_is_case_insensitive_whole_word() {
        assert_eq!(extract_month_word("APRIL 2024 stats"), Some(Month::April));
        assert_eq!(
            extract_month_word("Voter Registration October 2016"),
            Some(Month::October)
        );
        assert_eq!(extract_month_word("Mayor race"), None);
        assert_eq!(extract_month_word("junebug"), None);
    }

    #[test]
    fn general_keyword_beats_primary_table() {
        assert_eq!(
            infer_month("General Election", "", Some(2022)),
            Some(Month::November)
        );
        assert_eq!(
            infer_month("Municipal Primary", "", Some(2021)),
            Some(Month::November)
        );
    }

    #[test]
    fn primary_uses_year_table() {
        assert_eq!(infer_month("Primary", "", Some(2020)), Some(Month::June));
        assert_eq!(infer_month("Primary", "", Some(2024)), Some(Month::April));
        assert_eq!(infer_month("", "Primary_VR_2022.pdf", Some(2022)), Some(Month::May));
    }

    #[test]
    fn primary_outside_table_falls_through_to_fragments() {
        assert_eq!(infer_month("Primary", "stats.pdf", Some(1990)), None);
        assert_eq!(
            infer_month("Primary", "junprimary.pdf", Some(1990)),
            Some(Month::June)
        );
        assert_eq!(infer_month("Primary", "", None), None);
    }

    #[test]
    fn explicit_month_word_outranks_keywords() {
        assert_eq!(
            infer_month("Primary Election May 2020", "", Some(2020)),
            Some(Month::May)
        );
        assert_eq!(
            infer_month("General Election", "October 2022 VR.pdf", Some(2022)),
            Some(Month::October)
        );
    }

    #[test]
    fn file_name_tokens_resolve_november() {
        assert_eq!(
            infer_month("Stats", "2019ElectionNov.pdf", Some(2019)),
            Some(Month::November)
        );
        assert_eq!(infer_month("", "vr_nov_2018.pdf", Some(2018)), Some(Month::November));
    }

    #[test]
    fn bare_fragments_apply_in_fixed_order() {
        assert_eq!(infer_month("", "vrstats_apr2012.pdf", None), Some(Month::April));
        assert_eq!(infer_month("", "vrstats_may2013.pdf", None), Some(Month::May));
        assert_eq!(infer_month("", "vrstats_jun2014.pdf", None), Some(Month::June));
        assert_eq!(infer_month("", "aprmay.pdf", None), Some(Month::April));
        assert_eq!(infer_month("", "stats.pdf", None), None);
    }

    #[test]
    fn primary_table_is_consistent() {
        for (year, month) in PRIMARY_MONTH_BY_YEAR {
            assert!((1999..=2025).contains(year));
            assert!(matches!(month, Month::April | Month::May | Month::June));
        }
        assert_eq!(primary_month_for_year(2026), None);
    }
}
