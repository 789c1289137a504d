use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use inpxdb::index::search_index::SegmentedSearchIndex;
use inpxdb::inpx::decoder::decode;
use inpxdb::inpx::field::FieldStructure;
use inpxdb::storage::document_store::MemoryDocumentStore;
use inpxdb::{Author, Book, Database, ImportOptions, Importer, SearchField};
use rand::Rng;

const WORDS: [&str; 12] = [
    "night", "river", "empire", "stone", "garden", "winter", "shadow", "city", "storm", "glass",
    "harbor", "crown",
];

fn random_title(rng: &mut impl Rng) -> String {
    (0..rng.gen_range(2..6))
        .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn create_books(count: usize) -> Vec<Book> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            let mut book = Book::new(i.to_string(), random_title(&mut rng));
            book.authors = vec![Author::new("Writer", WORDS[i % WORDS.len()], "")];
            book.series = format!("{} saga", WORDS[rng.gen_range(0..WORDS.len())]);
            book.series_no = rng.gen_range(1..20);
            book.published = chrono::NaiveDate::from_ymd_opt(2000 + (i % 25) as i32, 1 + (i % 12) as u32, 1);
            book
        })
        .collect()
}

fn memory_db() -> Database {
    Database::with_backends(
        Box::new(MemoryDocumentStore::new()),
        Box::new(SegmentedSearchIndex::in_memory("en")),
    )
}

fn bench_decode(c: &mut Criterion) {
    let structure = FieldStructure::default();
    let line = "Tolkien,John,Ronald:Lewis,C.,S.:\u{4}sf_fantasy:\u{4}The Lord of the Rings\u{4}Middle-earth\u{4}1\u{4}lotr\u{4}1024\u{4}4242\u{4}0\u{4}fb2\u{4}2021-03-04\u{4}en\u{4}5\u{4}ring:quest\u{4}";
    let mut fields: Vec<&[u8]> = line.as_bytes().split(|&b| b == 0x04).collect();
    fields.pop();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(line.len() as u64));
    group.bench_function("default_structure_record", |b| {
        b.iter(|| decode(black_box(&structure), black_box(&fields)).unwrap());
    });
    group.finish();
}

fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("import");
    group.sample_size(10);

    for count in [1_000usize, 10_000] {
        let books = create_books(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &books, |b, books| {
            b.iter(|| {
                let mut db = memory_db();
                let mut importer = Importer::new(&mut db, ImportOptions::default());
                importer.run(books.iter().cloned()).unwrap();
                black_box(importer.stats().imported)
            });
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut db = memory_db();
    db.add_books(&create_books(20_000), false).unwrap();

    let mut group = c.benchmark_group("search");
    for field in [SearchField::Title, SearchField::Series, SearchField::All] {
        group.bench_with_input(BenchmarkId::new("field", field.name()), &field, |b, &field| {
            b.iter(|| db.search_by_field(field, black_box("winter storm"), 0, 10).unwrap());
        });
    }
    group.bench_function("most_recent", |b| {
        let today = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        b.iter(|| db.get_most_recent_at(today, 10).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_decode, bench_import, bench_search);
criterion_main!(benches);
