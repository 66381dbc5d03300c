//! Benchmarks for matching, substitution and scanning

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use oregex::{MatchData, Regex};

fn bench_find(c: &mut Criterion) {
    let input = "The answer is 42 and the question is 6 times 7";
    let re = Regex::new(r"\d+").unwrap();

    c.bench_function("find_first", |b| {
        b.iter(|| {
            let m = re.find(black_box(input)).unwrap();
            black_box(m.map(|m| m.start()))
        })
    });
}

fn bench_gsub_template(c: &mut Criterion) {
    let input = "Dates: 2024-01-15, 2024-02-20, 2024-03-25, 2024-04-30";
    let re = Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap();

    c.bench_function("gsub_template", |b| {
        b.iter(|| {
            let out = re.gsub(black_box(input), r"\3/\2/\1").unwrap();
            black_box(out)
        })
    });
}

fn bench_gsub_closure(c: &mut Criterion) {
    let input = "word ".repeat(10000);
    let re = Regex::new(r"\w+").unwrap();

    c.bench_function("gsub_closure_10k_words", |b| {
        b.iter(|| {
            let out = re
                .gsub(black_box(&input), |m: &MatchData<'_>| m.as_bytes().len().to_string())
                .unwrap();
            black_box(out)
        })
    });
}

fn bench_scan(c: &mut Criterion) {
    let input = "word ".repeat(10000);
    let re = Regex::new(r"\b\w+\b").unwrap();

    c.bench_function("scan_10k_words", |b| {
        b.iter(|| {
            let count = re.matches(black_box(&input)).count();
            black_box(count)
        })
    });
}

fn bench_scan_multibyte_empty(c: &mut Criterion) {
    let input = "日本語のテキスト".repeat(500);
    let re = Regex::with_shortcuts("", "", Some("utf8"), None).unwrap();

    c.bench_function("scan_empty_matches_utf8", |b| {
        b.iter(|| {
            let count = re.matches(black_box(&input)).count();
            black_box(count)
        })
    });
}

fn bench_pattern_compilation(c: &mut Criterion) {
    let patterns = vec![
        r"\d+",
        r"\b[A-Za-z]+\b",
        r"(?<year>\d{4})-(?<month>\d{2})",
        r"(?<=\$)\d+(?=\.)",
    ];

    let mut group = c.benchmark_group("pattern_compilation");
    for pattern in patterns {
        group.bench_with_input(BenchmarkId::new("compile", pattern), pattern, |b, p| {
            b.iter(|| {
                let re = Regex::with_shortcuts(black_box(p), "i", Some("utf8"), None).unwrap();
                black_box(re)
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_find,
    bench_gsub_template,
    bench_gsub_closure,
    bench_scan,
    bench_scan_multibyte_empty,
    bench_pattern_compilation,
);

criterion_main!(benches);
