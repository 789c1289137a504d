/// Semantic meaning of one position in a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Unknown,
    Author,
    Genre,
    Title,
    Series,
    SeriesNo,
    FileName,
    FileSize,
    LibId,
    Deleted,
    Ext,
    PublishedDate,
    Language,
    LibRate,
    Keywords,
    InsertionNo,
    Folder,
}

impl FieldKind {
    /// Maps a structure token to its field. Tokens are case-sensitive.
    pub fn from_name(name: &str) -> Self {
        match name {
            "AUTHOR" => FieldKind::Author,
            "GENRE" => FieldKind::Genre,
            "TITLE" => FieldKind::Title,
            "SERIES" => FieldKind::Series,
            "SERNO" => FieldKind::SeriesNo,
            "FILE" => FieldKind::FileName,
            "SIZE" => FieldKind::FileSize,
            "LIBID" => FieldKind::LibId,
            "DEL" => FieldKind::Deleted,
            "EXT" => FieldKind::Ext,
            "DATE" => FieldKind::PublishedDate,
            "INSNO" => FieldKind::InsertionNo,
            "FOLDER" => FieldKind::Folder,
            "LANG" => FieldKind::Language,
            "LIBRATE" => FieldKind::LibRate,
            "KEYWORDS" => FieldKind::Keywords,
            _ => FieldKind::Unknown,
        }
    }
}

/// Ordered list naming the field held at each record position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStructure {
    pub fields: Vec<FieldKind>,
}

impl FieldStructure {
    /// Parses a `;`-separated descriptor such as `AUTHOR;TITLE;LIBID;`.
    /// Falls back to the default ordering when the descriptor is empty.
    pub fn parse(descriptor: &str) -> Self {
        let mut names: Vec<&str> = descriptor.split(';').map(str::trim).collect();
        if names.last().is_some_and(|last| last.is_empty()) {
            names.pop();
        }

        if names.iter().all(|name| name.is_empty()) {
            return FieldStructure::default();
        }

        FieldStructure {
            fields: names.into_iter().map(FieldKind::from_name).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldKind> {
        self.fields.iter()
    }
}

impl Default for FieldStructure {
    /// Layout used by collections shipped without `structure.info`.
    fn default() -> Self {
        FieldStructure {
            fields: vec![
                FieldKind::Author,
                FieldKind::Genre,
                FieldKind::Title,
                FieldKind::Series,
                FieldKind::SeriesNo,
                FieldKind::FileName,
                FieldKind::FileSize,
                FieldKind::LibId,
                FieldKind::Deleted,
                FieldKind::Ext,
                FieldKind::PublishedDate,
                FieldKind::Language,
                FieldKind::LibRate,
                FieldKind::Keywords,
            ],
        }
    }
}
