use std::collections::{BTreeMap, HashMap};
use chrono::NaiveDate;
use roaring::RoaringBitmap;
use crate::index::posting::{DocOrd, Posting, PostingList};
use crate::index::projection::IndexedBook;
use crate::scoring::scorer::{BM25Scorer, DocStats, Scorer};
use crate::search::field::SearchField;
use crate::search::results::RankedHit;

/// Text fields that get their own postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexedField {
    Title = 0,
    Authors = 1,
    Series = 2,
}

impl IndexedField {
    pub const ALL: [IndexedField; 3] = [IndexedField::Title, IndexedField::Authors, IndexedField::Series];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Term representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term(String);

impl Term {
    pub fn new(text: &str) -> Self {
        Term(text.to_string())
    }
}

/// Analyzed terms of one entry, per indexed field.
#[derive(Debug, Clone, Default)]
pub struct AnalyzedBook {
    pub fields: [Vec<String>; 3],
}

/// Postings and length statistics of one field
#[derive(Debug, Default)]
pub struct FieldIndex {
    pub postings: HashMap<Term, PostingList>,
    pub doc_lengths: Vec<u32>,   // Indexed by ordinal
    pub total_tokens: u64,
}

impl FieldIndex {
    fn add(&mut self, doc: DocOrd, terms: &[String]) {
        let mut freqs: HashMap<&str, u32> = HashMap::new();
        for term in terms {
            *freqs.entry(term.as_str()).or_insert(0) += 1;
        }

        for (term, term_freq) in freqs {
            self.postings
                .entry(Term::new(term))
                .or_default()
                .add_posting(Posting { doc, term_freq });
        }

        self.doc_lengths.push(terms.len() as u32);
        self.total_tokens += terms.len() as u64;
    }

    fn avg_doc_length(&self) -> f32 {
        if self.doc_lengths.is_empty() {
            return 0.0;
        }
        self.total_tokens as f32 / self.doc_lengths.len() as f32
    }

    /// Adds BM25 contributions of `terms` into `scores`.
    fn score_into(&self, terms: &[String], scorer: &impl Scorer, scores: &mut HashMap<DocOrd, f32>) {
        let total_docs = self.doc_lengths.len();
        let avg_doc_length = self.avg_doc_length();

        for term in terms {
            let Some(list) = self.postings.get(&Term::new(term)) else {
                continue;
            };
            let idf = scorer.idf(list.doc_freq(), total_docs);
            for posting in list.iter() {
                let stats = DocStats {
                    doc_length: self.doc_lengths[posting.doc as usize],
                    avg_doc_length,
                };
                *scores.entry(posting.doc).or_insert(0.0) += scorer.score(posting, idf, &stats);
            }
        }
    }
}

/// Sort keys and identity of an indexed entry
#[derive(Debug, Clone)]
pub struct DocEntry {
    pub id: String,
    pub series_key: String,   // Lowercased series name, the sort key
    pub series_no: i32,
    pub published: Option<NaiveDate>,
}

/// In-memory inverted index over book projections.
///
/// Every indexed entry gets the next ordinal. Indexing an id again tombstones
/// its previous ordinal, so only the latest version of a book can match.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    pub fields: [FieldIndex; 3],
    pub docs: Vec<DocEntry>,
    pub by_id: HashMap<String, DocOrd>,
    pub dates: BTreeMap<NaiveDate, Vec<DocOrd>>,
    pub tombstones: RoaringBitmap,
    scorer: BM25Scorer,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, book: &IndexedBook, analyzed: &AnalyzedBook) -> DocOrd {
        let ord = self.docs.len() as DocOrd;

        if let Some(previous) = self.by_id.insert(book.id.clone(), ord) {
            self.tombstones.insert(previous);
        }

        for field in IndexedField::ALL {
            self.fields[field.slot()].add(ord, &analyzed.fields[field.slot()]);
        }

        if let Some(date) = book.published {
            self.dates.entry(date).or_default().push(ord);
        }

        self.docs.push(DocEntry {
            id: book.id.clone(),
            series_key: book.series.to_lowercase(),
            series_no: book.series_no,
            published: book.published,
        });

        ord
    }

    pub fn is_live(&self, ord: DocOrd) -> bool {
        !self.tombstones.contains(ord)
    }

    /// Number of distinct ids currently searchable.
    pub fn live_count(&self) -> usize {
        self.by_id.len()
    }

    pub fn doc(&self, ord: DocOrd) -> Option<&DocEntry> {
        self.docs.get(ord as usize)
    }

    /// Live entries matching any of `terms` in the fields behind `field`,
    /// in `field`'s result order.
    pub fn search(&self, field: SearchField, terms: &[String]) -> Vec<RankedHit<'_>> {
        let mut scores: HashMap<DocOrd, f32> = HashMap::new();
        for indexed in field.indexed_fields() {
            self.fields[indexed.slot()].score_into(terms, &self.scorer, &mut scores);
        }

        let mut hits: Vec<RankedHit<'_>> = scores
            .into_iter()
            .filter(|(ord, _)| self.is_live(*ord))
            .filter_map(|(ord, score)| {
                let entry = self.doc(ord)?;
                Some(RankedHit {
                    ord,
                    score,
                    published: entry.published,
                    series_key: &entry.series_key,
                    series_no: entry.series_no,
                })
            })
            .collect();

        hits.sort_by(|a, b| field.compare(a, b));
        hits
    }

    /// Live entries published within `[from, to]`, newest first.
    pub fn date_range(&self, from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = DocOrd> + '_ {
        let range = if from <= to { Some(self.dates.range(from..=to)) } else { None };
        range
            .into_iter()
            .flat_map(|range| range.rev())
            .flat_map(|(_, ords)| ords.iter().copied())
            .filter(move |ord| self.is_live(*ord))
    }
}
