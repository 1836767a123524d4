//! Criterion benchmarks for wordbag.
//!
//! Covers vocabulary fitting, count transforms, featurizer training and
//! BILOU tagging.

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use wordbag::analysis::token::Token;
use wordbag::features::config::{Analyzer, CountVectorsConfig};
use wordbag::features::featurizer::CountVectorsFeaturizer;
use wordbag::features::normalizer::TextNormalizer;
use wordbag::features::vectorizer::{CountVectorizer, Vectorizer};
use wordbag::message::{EntitySpan, Message, TrainingData};
use wordbag::tagging::bilou::bilou_tags;

/// Generate test utterances for benchmarking.
fn generate_test_utterances(count: usize) -> Vec<String> {
    let words = [
        "book", "a", "table", "for", "two", "at", "seven", "cancel", "my", "flight", "to",
        "berlin", "what", "is", "the", "weather", "in", "paris", "tomorrow", "play", "some",
        "jazz", "music", "set", "an", "alarm", "42", "minutes", "remind", "me", "call", "mom",
    ];

    (0..count)
        .map(|i| {
            let length = 4 + (i % 8);
            (0..length)
                .map(|j| words[(i * 7 + j * 13) % words.len()]) // Pseudo-random distribution
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn vectorizer(config: &CountVectorsConfig) -> CountVectorizer {
    CountVectorizer::from_config(config, TextNormalizer::from_config(config)).unwrap()
}

/// Benchmark vocabulary fitting and count transforms.
fn bench_vectorizers(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorizers");
    let corpus = generate_test_utterances(1000);

    let word = CountVectorsConfig {
        max_ngram: 2,
        ..Default::default()
    };
    let char_wb = CountVectorsConfig {
        analyzer: Analyzer::CharWb,
        min_ngram: 2,
        max_ngram: 4,
        ..Default::default()
    };

    group.throughput(Throughput::Elements(corpus.len() as u64));
    for (name, config) in [("word", &word), ("char_wb", &char_wb)] {
        group.bench_function(format!("fit_{name}"), |b| {
            b.iter_with_setup(
                || vectorizer(config),
                |mut v| {
                    v.fit(black_box(&corpus)).unwrap();
                    black_box(v)
                },
            )
        });

        let mut fitted = vectorizer(config);
        fitted.fit(&corpus).unwrap();
        group.bench_function(format!("transform_{name}"), |b| {
            b.iter(|| black_box(fitted.transform(black_box(&corpus)).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark end-to-end featurizer training.
fn bench_featurizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("featurizer");
    group.sample_size(20);

    let utterances = generate_test_utterances(500);
    let training_data = TrainingData::new(
        utterances
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let intent = format!("intent_{}", i % 10);
                Message::builder(text.as_str())
                    .intent(intent.as_str())
                    .intent_tokens(vec![Token::new(intent.as_str(), 0, intent.len())])
                    .build()
            })
            .collect(),
    );

    for sequence in [false, true] {
        let config = CountVectorsConfig {
            sequence,
            ..Default::default()
        };
        group.bench_function(format!("train_sequence_{sequence}"), |b| {
            b.iter_with_setup(
                || {
                    (
                        CountVectorsFeaturizer::new(config.clone()).unwrap(),
                        training_data.clone(),
                    )
                },
                |(mut featurizer, mut data)| {
                    featurizer.train(&mut data, None).unwrap();
                    black_box(data)
                },
            )
        });
    }

    group.finish();
}

/// Benchmark BILOU tag assignment.
fn bench_bilou(c: &mut Criterion) {
    let mut group = c.benchmark_group("bilou");

    let text = generate_test_utterances(200).join(" ");
    let mut offset = 0;
    let tokens: Vec<Token> = text
        .split(' ')
        .map(|word| {
            let token = Token::new(word, offset, offset + word.len());
            offset = token.end + 1;
            token
        })
        .collect();
    let entities: Vec<EntitySpan> = tokens
        .windows(2)
        .step_by(5)
        .map(|pair| EntitySpan::new(pair[0].start, pair[1].end, "span"))
        .collect();

    group.throughput(Throughput::Elements(tokens.len() as u64));
    group.bench_function("bilou_tags", |b| {
        b.iter(|| black_box(bilou_tags(black_box(&tokens), black_box(&entities))))
    });

    group.finish();
}

criterion_group!(benches, bench_vectorizers, bench_featurizer, bench_bilou);
criterion_main!(benches);
