use crate::index::posting::Posting;

/// Scorer trait
pub trait Scorer: Send + Sync {
    fn score(&self, posting: &Posting, idf: f32, doc_stats: &DocStats) -> f32;

    fn idf(&self, doc_freq: u32, total_docs: usize) -> f32;

    fn name(&self) -> &str;
}

/// Field statistics for scoring
#[derive(Debug, Clone)]
pub struct DocStats {
    pub doc_length: u32,      // Number of terms in the field
    pub avg_doc_length: f32,  // Average field length in the index
}

/// BM25 Scorer
#[derive(Debug, Clone)]
pub struct BM25Scorer {
    pub k1: f32,  // Term frequency saturation (default: 1.2)
    pub b: f32,   // Length normalization strength (default: 0.75)
}

impl Default for BM25Scorer {
    fn default() -> Self {
        BM25Scorer {
            k1: 1.2,
            b: 0.75,
        }
    }
}

impl Scorer for BM25Scorer {
    fn score(&self, posting: &Posting, idf: f32, doc_stats: &DocStats) -> f32 {
        let tf = posting.term_freq as f32;
        let doc_len = doc_stats.doc_length as f32;
        let avg_doc_len = doc_stats.avg_doc_length.max(1.0);

        let numerator = idf * tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * (doc_len / avg_doc_len));

        numerator / denominator
    }

    /// Always positive, even for terms present in every entry.
    fn idf(&self, doc_freq: u32, total_docs: usize) -> f32 {
        let n = total_docs as f32;
        let df = doc_freq as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    fn name(&self) -> &str {
        "bm25"
    }
}
