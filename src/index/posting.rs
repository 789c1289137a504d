/// Insertion ordinal of an indexed entry. Re-indexing an id allocates a new one.
pub type DocOrd = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc: DocOrd,
    pub term_freq: u32,       // Term frequency in the field
}

/// Posting list for a term
/// Note: Sorted by ordinal
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    pub fn add_posting(&mut self, posting: Posting) {
        // Ordinals only grow, so this is almost always a push
        match self.postings.last() {
            Some(last) if last.doc >= posting.doc => {
                match self.postings.binary_search_by_key(&posting.doc, |p| p.doc) {
                    Ok(pos) => self.postings[pos] = posting,
                    Err(pos) => self.postings.insert(pos, posting),
                }
            }
            _ => self.postings.push(posting),
        }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn iter(&self) -> impl Iterator<Item = &Posting> {
        self.postings.iter()
    }
}
