use chrono::NaiveDate;
use crate::core::error::{Error, Result};
use crate::core::types::{Author, Book};
use crate::inpx::field::{FieldKind, FieldStructure};

/// Separator between the fields of a record line.
pub const FIELD_SEPARATOR: u8 = 0x04;

/// Terminator of every element in author and genre lists.
pub const LIST_SEPARATOR: char = ':';

const NAME_SEPARATOR: char = ',';

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Builds a book from the raw fields of one record.
///
/// Numeric, boolean and date fields that fail to parse keep their zero value;
/// only a field count that disagrees with `structure` is an error.
pub fn decode(structure: &FieldStructure, fields: &[&[u8]]) -> Result<Book> {
    if structure.len() != fields.len() {
        return Err(Error::structure_mismatch(structure.len(), fields.len()));
    }

    let mut book = Book::default();
    let mut lib_id = 0i64;

    for (kind, raw) in structure.iter().zip(fields) {
        let value = String::from_utf8_lossy(raw);
        match kind {
            FieldKind::Author => book.authors = parse_authors(&value),
            FieldKind::Genre => book.genres = split_list(&value).map(String::from).collect(),
            FieldKind::Title => book.title = value.into_owned(),
            FieldKind::Series => book.series = value.into_owned(),
            FieldKind::SeriesNo => book.series_no = parse_int_or_zero(&value),
            FieldKind::LibId => lib_id = parse_int_or_zero(&value),
            FieldKind::FileSize => book.file.size = parse_int_or_zero(&value),
            FieldKind::Deleted => book.deleted = parse_bool_or_false(&value),
            FieldKind::PublishedDate => book.published = parse_date_or_none(&value),
            FieldKind::Language => book.language = value.into_owned(),
            FieldKind::FileName => book.file.name = value.into_owned(),
            FieldKind::Ext => book.file.ext = value.into_owned(),
            FieldKind::Folder => book.file.folder = value.into_owned(),
            FieldKind::LibRate => book.rating = value.into_owned(),
            FieldKind::Keywords => book.keywords = value.into_owned(),
            FieldKind::InsertionNo => book.insertion_no = value.into_owned(),
            FieldKind::Unknown => {}
        }
    }

    book.id = lib_id.to_string();
    Ok(book)
}

/// Splits a `:`-terminated list. Whatever follows the last separator is dropped.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    let mut parts: Vec<&str> = value.split(LIST_SEPARATOR).collect();
    parts.pop();
    parts.into_iter()
}

fn parse_authors(value: &str) -> Vec<Author> {
    let entries: Vec<&str> = split_list(value).collect();
    if entries.len() == 1 && entries[0].is_empty() {
        return Vec::new();
    }

    entries.into_iter().map(parse_author).collect()
}

/// `last`, `last,first` or `last,first,middle[,...]`.
pub fn parse_author(entry: &str) -> Author {
    let names: Vec<&str> = entry.split(NAME_SEPARATOR).collect();
    match names.as_slice() {
        [last] => Author::new(last, "", ""),
        [last, first] => Author::new(last, first, ""),
        [last, first, middle, ..] => Author::new(last, first, middle),
        [] => Author::default(),
    }
}

/// Decimal with an optional sign; anything else is the zero value.
pub fn parse_int_or_zero<T>(value: &str) -> T
where
    T: std::str::FromStr + Default,
{
    value.parse().unwrap_or_default()
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`; anything else is `false`.
pub fn parse_bool_or_false(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "TRUE" | "true" | "True")
}

/// `YYYY-MM-DD`; anything else is the zero date.
pub fn parse_date_or_none(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &[&str]) -> Vec<Vec<u8>> {
        values.iter().map(|v| v.as_bytes().to_vec()).collect()
    }

    fn as_slices(fields: &[Vec<u8>]) -> Vec<&[u8]> {
        fields.iter().map(|f| f.as_slice()).collect()
    }

    #[test]
    fn test_decode_default_structure_record() {
        let fields = raw(&[
            "Smith,John:", "sf:", "Foo", "", "2", "42", "1024", "42", "0", "fb2",
            "2020-01-05", "en", "", "",
        ]);
        let book = decode(&FieldStructure::default(), &as_slices(&fields)).unwrap();

        assert_eq!(book.authors, vec![Author::new("Smith", "John", "")]);
        assert_eq!(book.genres, vec!["sf".to_string()]);
        assert_eq!(book.title, "Foo");
        assert_eq!(book.series_no, 2);
        assert_eq!(book.id, "42");
        assert_eq!(book.file.name, "42");
        assert_eq!(book.file.size, 1024);
        assert_eq!(book.file.ext, "fb2");
        assert_eq!(book.published, NaiveDate::from_ymd_opt(2020, 1, 5));
        assert_eq!(book.language, "en");
        assert!(!book.deleted);
    }

    #[test]
    fn test_structure_mismatch() {
        let structure = FieldStructure::parse("AUTHOR;TITLE;LIBID;DEL;EXT;");
        let fields = raw(&["a:", "t", "1", "0"]);
        let err = decode(&structure, &as_slices(&fields)).unwrap_err();
        assert_eq!(err.kind, crate::core::error::ErrorKind::StructureMismatch);
    }

    #[test]
    fn test_author_name_parts() {
        let authors = parse_authors("Кинг,Стивен,:Вебер,Виктор,Анатольевич:Single:A,B,C,D:");
        assert_eq!(
            authors,
            vec![
                Author::new("Кинг", "Стивен", ""),
                Author::new("Вебер", "Виктор", "Анатольевич"),
                Author::new("Single", "", ""),
                Author::new("A", "B", "C"),
            ]
        );
    }

    #[test]
    fn test_empty_author_list() {
        assert!(parse_authors("").is_empty());
        assert!(parse_authors(":").is_empty());
    }

    #[test]
    fn test_genre_list_preserves_order_and_duplicates() {
        let genres: Vec<&str> = split_list("sci_tech:science:sci_tech:").collect();
        assert_eq!(genres, vec!["sci_tech", "science", "sci_tech"]);
        assert_eq!(split_list("").count(), 0);
    }

    #[test]
    fn test_lenient_numbers() {
        assert_eq!(parse_int_or_zero::<i32>("7"), 7);
        assert_eq!(parse_int_or_zero::<i32>("-3"), -3);
        assert_eq!(parse_int_or_zero::<i32>("x7"), 0);
        assert_eq!(parse_int_or_zero::<u64>(""), 0);
        assert_eq!(parse_int_or_zero::<u64>("12 "), 0);
    }

    #[test]
    fn test_lenient_bool() {
        for truthy in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(parse_bool_or_false(truthy), "{}", truthy);
        }
        for other in ["0", "f", "False", "", "yes", "2"] {
            assert!(!parse_bool_or_false(other), "{}", other);
        }
    }

    #[test]
    fn test_lenient_date() {
        assert_eq!(parse_date_or_none("2009-09-20"), NaiveDate::from_ymd_opt(2009, 9, 20));
        assert_eq!(parse_date_or_none("20.09.2009"), None);
        assert_eq!(parse_date_or_none(""), None);
    }

    #[test]
    fn test_signed_library_ids_are_kept() {
        let structure = FieldStructure::parse("LIBID;TITLE;");
        let negative = raw(&["-5", "Minus"]);
        assert_eq!(decode(&structure, &as_slices(&negative)).unwrap().id, "-5");

        let explicit_plus = raw(&["+7", "Plus"]);
        assert_eq!(decode(&structure, &as_slices(&explicit_plus)).unwrap().id, "7");
    }

    #[test]
    fn test_malformed_fields_do_not_fail_record() {
        let structure = FieldStructure::parse("LIBID;SERNO;SIZE;DEL;DATE;");
        let fields = raw(&["abc", "two", "-1", "maybe", "yesterday"]);
        let book = decode(&structure, &as_slices(&fields)).unwrap();
        assert_eq!(book.id, "0");
        assert_eq!(book.series_no, 0);
        assert_eq!(book.file.size, 0);
        assert!(!book.deleted);
        assert_eq!(book.published, None);
    }

    #[test]
    fn test_unknown_columns_and_folder() {
        let structure = FieldStructure::parse("LIBID;MYSTERY;FOLDER;INSNO;KEYWORDS;LIBRATE;");
        let fields = raw(&["9", "ignored", "2017\\05\\13\\", "17", "war,peace", "5"]);
        let book = decode(&structure, &as_slices(&fields)).unwrap();
        assert_eq!(book.id, "9");
        assert_eq!(book.file.folder, "2017\\05\\13\\");
        assert_eq!(book.insertion_no, "17");
        assert_eq!(book.keywords, "war,peace");
        assert_eq!(book.rating, "5");
    }

    #[test]
    fn test_list_order_round_trips() {
        let raw = "Adams,Douglas:Pratchett,Terry:Gaiman,Neil:";
        let encoded: String = parse_authors(raw)
            .iter()
            .map(|a| format!("{},{}{}", a.last_name, a.first_name, LIST_SEPARATOR))
            .collect();
        assert_eq!(encoded, raw);
    }
}
