use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use fuzzy_substring::{
    Bytes, SearchLimits, find_near_matches, find_near_matches_in_reader,
    find_near_matches_substitutions,
};
use std::hint::black_box;

const DNA_PATTERN: &[u8] = b"TGCACTGTAGGGATAACAAT";

fn dna_text() -> Vec<u8> {
    let unit: &[u8] = b"GACTAGCACTGTAGGGATAACAATTTCACACAGGTGGACAATTACATTGAAAATCACAGATTGGT\
        CACACACACATTGGACATACATAGAAACACACACACATACATTAGATACGAACATAGAAACACAC\
        ATTAGACGCGTACATAGACACAAACACATTGACAGGCAGTTCAGATGATGACGCCCGACTGATAC\
        TCGCGTAGTCGTGGGAGGCAAGGCACACAGGGGATAGG";
    unit.repeat(50)
}

fn benchmark_dna_levenshtein(c: &mut Criterion) {
    let text = dna_text();
    let mut group = c.benchmark_group("dna_levenshtein");
    for max_l_dist in [1usize, 2] {
        group.bench_with_input(
            BenchmarkId::new("max_l_dist", max_l_dist),
            &max_l_dist,
            |b, &max_l_dist| {
                b.iter(|| {
                    find_near_matches(
                        Bytes(DNA_PATTERN),
                        Bytes(black_box(&text)),
                        SearchLimits::new().total(max_l_dist),
                    )
                    .unwrap()
                });
            },
        );
    }
    group.finish();
}

fn benchmark_substitutions(c: &mut Criterion) {
    let text = dna_text();
    let mut group = c.benchmark_group("substitutions");
    // max_subs 1 tiles long q-grams, max_subs 6 falls back to the ring scan
    for max_subs in [1usize, 6] {
        group.bench_with_input(
            BenchmarkId::new("max_subs", max_subs),
            &max_subs,
            |b, &max_subs| {
                b.iter(|| {
                    find_near_matches_substitutions(
                        Bytes(DNA_PATTERN),
                        Bytes(black_box(&text)),
                        max_subs,
                    )
                    .unwrap()
                });
            },
        );
    }
    group.finish();
}

fn benchmark_generic(c: &mut Criterion) {
    let text = dna_text();
    c.bench_function("generic_independent_limits", |b| {
        b.iter(|| {
            find_near_matches(
                Bytes(DNA_PATTERN),
                Bytes(black_box(&text)),
                SearchLimits::new().substitutions(2).insertions(1).deletions(1),
            )
            .unwrap()
        });
    });
}

fn benchmark_chunked_reader(c: &mut Criterion) {
    let text = dna_text();
    c.bench_function("chunked_reader", |b| {
        b.iter(|| {
            find_near_matches_in_reader(
                DNA_PATTERN,
                black_box(text.as_slice()),
                SearchLimits::new().total(1),
            )
            .unwrap()
        });
    });
}

criterion_group!(
    benches,
    benchmark_dna_levenshtein,
    benchmark_substitutions,
    benchmark_generic,
    benchmark_chunked_reader
);
criterion_main!(benches);
