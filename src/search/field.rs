use std::cmp::Ordering;
use crate::index::inverted::IndexedField;
use crate::search::results::RankedHit;

/// Field a query runs against. Each one carries its own tie-break policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Title,
    Authors,
    Series,
    All,
}

impl SearchField {
    /// Case-sensitive; anything unrecognised searches every field.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Title" => SearchField::Title,
            "Authors" => SearchField::Authors,
            "Series" => SearchField::Series,
            _ => SearchField::All,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchField::Title => "Title",
            SearchField::Authors => "Authors",
            SearchField::Series => "Series",
            SearchField::All => "All",
        }
    }

    pub fn indexed_fields(&self) -> &'static [IndexedField] {
        match self {
            SearchField::Title => &[IndexedField::Title],
            SearchField::Authors => &[IndexedField::Authors],
            SearchField::Series => &[IndexedField::Series],
            SearchField::All => &IndexedField::ALL,
        }
    }

    /// Result order for this field. Equal keys fall back to insertion order.
    pub fn compare(&self, a: &RankedHit<'_>, b: &RankedHit<'_>) -> Ordering {
        let by_score = b.score.total_cmp(&a.score);
        let keys = match self {
            SearchField::Title => by_score
                .then_with(|| b.published.cmp(&a.published))
                .then_with(|| b.series_no.cmp(&a.series_no)),
            SearchField::Authors => by_score
                .then_with(|| b.published.cmp(&a.published)),
            SearchField::Series => by_score
                .then_with(|| a.series_key.cmp(b.series_key))
                .then_with(|| b.series_no.cmp(&a.series_no)),
            SearchField::All => by_score,
        };
        keys.then_with(|| a.ord.cmp(&b.ord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hit(ord: u32, score: f32, published: Option<NaiveDate>, series_key: &str, series_no: i32) -> RankedHit<'_> {
        RankedHit { ord, score, published, series_key, series_no }
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_from_name() {
        assert_eq!(SearchField::from_name("Title"), SearchField::Title);
        assert_eq!(SearchField::from_name("Authors"), SearchField::Authors);
        assert_eq!(SearchField::from_name("Series"), SearchField::Series);
        assert_eq!(SearchField::from_name("title"), SearchField::All);
        assert_eq!(SearchField::from_name(""), SearchField::All);
    }

    #[test]
    fn test_title_ties_break_on_date_then_series_no() {
        let mut hits = vec![
            hit(0, 1.0, date(2019, 1, 1), "", 1),
            hit(1, 1.0, date(2020, 1, 1), "", 1),
            hit(2, 1.0, date(2020, 1, 1), "", 5),
            hit(3, 2.0, None, "", 0),
            hit(4, 1.0, None, "", 9),
        ];
        hits.sort_by(|a, b| SearchField::Title.compare(a, b));
        let order: Vec<u32> = hits.iter().map(|h| h.ord).collect();
        assert_eq!(order, vec![3, 2, 1, 0, 4]);
    }

    #[test]
    fn test_series_ties_break_on_name_then_number_desc() {
        let mut hits = vec![
            hit(0, 1.0, None, "foundation", 1),
            hit(1, 1.0, None, "dune", 2),
            hit(2, 1.0, None, "foundation", 3),
            hit(3, 1.0, None, "dune", 6),
        ];
        hits.sort_by(|a, b| SearchField::Series.compare(a, b));
        let order: Vec<u32> = hits.iter().map(|h| h.ord).collect();
        assert_eq!(order, vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_all_uses_score_then_insertion_order() {
        let mut hits = vec![
            hit(2, 1.0, date(2020, 1, 1), "", 0),
            hit(1, 1.0, date(2021, 1, 1), "", 0),
            hit(0, 0.5, None, "", 0),
        ];
        hits.sort_by(|a, b| SearchField::All.compare(a, b));
        let order: Vec<u32> = hits.iter().map(|h| h.ord).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }
}
