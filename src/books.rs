//! Static catalog of canonical book identities.
//!
//! Source files refer to books by a handful of spellings (USFM 3 codes,
//! older 2.x codes, full English names). Every one of them must resolve to
//! a single canonical id, display name, and position in the canonical
//! ordering, because chapter navigation and book listings are derived from
//! that ordering rather than from input order.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{Error, Result};

/// A single entry in the canon table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookInfo {
    /// Canonical USFM 3 identifier (e.g. `GEN`).
    pub id: &'static str,
    /// Display name (e.g. `Genesis`).
    pub common_name: &'static str,
    /// Position in the canonical ordering, starting at 0.
    pub order: usize,
}

/// (canonical id, common name, alternate spellings).
///
/// Array position defines canonical order: Old Testament, deuterocanon,
/// New Testament. Translations that omit the deuterocanon still sort
/// correctly since order comparisons are relative.
const CANON: &[(&str, &str, &[&str])] = &[
    ("GEN", "Genesis", &["GN"]),
    ("EXO", "Exodus", &["EX"]),
    ("LEV", "Leviticus", &["LV"]),
    ("NUM", "Numbers", &["NU", "NM"]),
    ("DEU", "Deuteronomy", &["DT", "DEUT"]),
    ("JOS", "Joshua", &["JSH"]),
    ("JDG", "Judges", &["JDGS", "JG"]),
    ("RUT", "Ruth", &["RTH", "RU"]),
    ("1SA", "1 Samuel", &["1SM", "1S"]),
    ("2SA", "2 Samuel", &["2SM", "2S"]),
    ("1KI", "1 Kings", &["1KG", "1KGS"]),
    ("2KI", "2 Kings", &["2KG", "2KGS"]),
    ("1CH", "1 Chronicles", &["1CHR"]),
    ("2CH", "2 Chronicles", &["2CHR"]),
    ("EZR", "Ezra", &[]),
    ("NEH", "Nehemiah", &["NE"]),
    ("EST", "Esther", &["ES"]),
    ("JOB", "Job", &["JB"]),
    ("PSA", "Psalms", &["PSM", "PSS", "PSALM"]),
    ("PRO", "Proverbs", &["PRV", "PR"]),
    ("ECC", "Ecclesiastes", &["QOH", "EC"]),
    ("SNG", "Song of Solomon", &["SOS", "SON", "SONG OF SONGS"]),
    ("ISA", "Isaiah", &["IS"]),
    ("JER", "Jeremiah", &["JR"]),
    ("LAM", "Lamentations", &["LM"]),
    ("EZK", "Ezekiel", &["EZE", "EZ"]),
    ("DAN", "Daniel", &["DN"]),
    ("HOS", "Hosea", &["HO"]),
    ("JOL", "Joel", &["JOE", "JL"]),
    ("AMO", "Amos", &["AM"]),
    ("OBA", "Obadiah", &["OB"]),
    ("JON", "Jonah", &["JNH"]),
    ("MIC", "Micah", &["MC"]),
    ("NAM", "Nahum", &["NAH", "NA"]),
    ("HAB", "Habakkuk", &["HB"]),
    ("ZEP", "Zephaniah", &["ZP"]),
    ("HAG", "Haggai", &["HG"]),
    ("ZEC", "Zechariah", &["ZC"]),
    ("MAL", "Malachi", &["ML"]),
    // Deuterocanon
    ("TOB", "Tobit", &["TB"]),
    ("JDT", "Judith", &["JDTH"]),
    ("ESG", "Esther (Greek)", &["ESTG", "ADE"]),
    ("WIS", "Wisdom", &["WS", "WISD"]),
    ("SIR", "Sirach", &["ECCLUS"]),
    ("BAR", "Baruch", &["BR"]),
    ("LJE", "Letter of Jeremiah", &["LJB"]),
    ("S3Y", "Song of the Three", &["PAZ"]),
    ("SUS", "Susanna", &[]),
    ("BEL", "Bel and the Dragon", &[]),
    ("1MA", "1 Maccabees", &["1MC", "1MACC"]),
    ("2MA", "2 Maccabees", &["2MC", "2MACC"]),
    ("1ES", "1 Esdras", &["1ESD"]),
    ("2ES", "2 Esdras", &["2ESD"]),
    ("MAN", "Prayer of Manasseh", &["PMA"]),
    // New Testament
    ("MAT", "Matthew", &["MT"]),
    ("MRK", "Mark", &["MAR", "MK"]),
    ("LUK", "Luke", &["LK"]),
    ("JHN", "John", &["JOH", "JN"]),
    ("ACT", "Acts", &["AC"]),
    ("ROM", "Romans", &["RM"]),
    ("1CO", "1 Corinthians", &["1COR"]),
    ("2CO", "2 Corinthians", &["2COR"]),
    ("GAL", "Galatians", &["GL"]),
    ("EPH", "Ephesians", &["EP"]),
    ("PHP", "Philippians", &["PHI", "PHIL"]),
    ("COL", "Colossians", &["CL"]),
    ("1TH", "1 Thessalonians", &["1THESS"]),
    ("2TH", "2 Thessalonians", &["2THESS"]),
    ("1TI", "1 Timothy", &["1TM", "1TIM"]),
    ("2TI", "2 Timothy", &["2TM", "2TIM"]),
    ("TIT", "Titus", &["TI"]),
    ("PHM", "Philemon", &["PHLM", "PHILEM"]),
    ("HEB", "Hebrews", &["HBR"]),
    ("JAS", "James", &["JAM", "JM"]),
    ("1PE", "1 Peter", &["1PT", "1PET"]),
    ("2PE", "2 Peter", &["2PT", "2PET"]),
    ("1JN", "1 John", &["1JO", "1JHN"]),
    ("2JN", "2 John", &["2JO", "2JHN"]),
    ("3JN", "3 John", &["3JO", "3JHN"]),
    ("JUD", "Jude", &["JD"]),
    ("REV", "Revelation", &["RV", "RE"]),
];

struct Catalog {
    books: Vec<BookInfo>,
    /// Uppercased alias -> index into `books`.
    index: HashMap<String, usize>,
}

static CATALOG: Lazy<Catalog> = Lazy::new(|| {
    let mut books = Vec::with_capacity(CANON.len());
    let mut index = HashMap::new();
    for (order, &(id, common_name, aliases)) in CANON.iter().enumerate() {
        books.push(BookInfo {
            id,
            common_name,
            order,
        });
        index.insert(id.to_string(), order);
        index.insert(common_name.to_uppercase(), order);
        for alias in aliases {
            index.insert(alias.to_string(), order);
        }
    }
    Catalog { books, index }
});

/// Resolve a raw book identifier token to its canonical entry.
///
/// Matching is case-insensitive and accepts canonical ids, common names,
/// and known alternate spellings. Unknown identifiers are a hard error:
/// every downstream link depends on a resolvable canonical identity.
pub fn lookup(raw: &str) -> Result<&'static BookInfo> {
    let key = raw.trim().to_uppercase();
    CATALOG
        .index
        .get(&key)
        .map(|&i| &CATALOG.books[i])
        .ok_or_else(|| Error::UnknownBook(raw.trim().to_string()))
}

/// All catalog entries in canonical order.
pub fn all() -> &'static [BookInfo] {
    &CATALOG.books
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_ids_resolve() {
        assert_eq!(lookup("GEN").unwrap().common_name, "Genesis");
        assert_eq!(lookup("REV").unwrap().common_name, "Revelation");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("gen").unwrap().id, "GEN");
        assert_eq!(lookup("Exo").unwrap().id, "EXO");
    }

    #[test]
    fn aliases_and_common_names_resolve() {
        assert_eq!(lookup("JOE").unwrap().id, "JOL");
        assert_eq!(lookup("Genesis").unwrap().id, "GEN");
        assert_eq!(lookup("song of songs").unwrap().id, "SNG");
        assert_eq!(lookup("1Sm").unwrap().id, "1SA");
    }

    #[test]
    fn unknown_id_is_an_error() {
        assert!(matches!(lookup("XYZ"), Err(Error::UnknownBook(_))));
    }

    #[test]
    fn order_is_total_and_matches_table() {
        let books = all();
        assert!(books.len() >= 66);
        for (i, b) in books.iter().enumerate() {
            assert_eq!(b.order, i);
        }
        assert!(lookup("GEN").unwrap().order < lookup("EXO").unwrap().order);
        assert!(lookup("MAL").unwrap().order < lookup("MAT").unwrap().order);
    }
}
