use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use voxfuse::{
    ChunkResult, Config, CutRules, DiarizationTurn, SegmenterParams, TimedToken, Waveform, fuse,
    resplit_for_subtitles, segment_audio,
};

const SENTENCE: &str = "今天我們來聊聊車輛安全審驗，以及相關的規範。";
const CHUNK_SECS: f64 = 120.0;

/// Synthetic transcript: `chunks` chunks of repeated sentences, one token per
/// non-punctuation character, 0.25s each.
fn synthetic_transcript(chunks: usize) -> (Vec<ChunkResult>, Vec<f64>) {
    let mut results = Vec::with_capacity(chunks);
    let mut starts = Vec::with_capacity(chunks);
    for index in 0..chunks {
        let text = SENTENCE.repeat(20);
        let tokens = text
            .chars()
            .filter(|ch| *ch != '，' && *ch != '。')
            .enumerate()
            .map(|(i, ch)| {
                let start = i as f64 * 0.25;
                TimedToken::new(ch.to_string(), start, start + 0.25)
            })
            .collect();
        results.push(ChunkResult::new(text, tokens));
        starts.push(index as f64 * CHUNK_SECS);
    }
    (results, starts)
}

/// Two speakers alternating every 7.5 seconds over the whole recording.
fn alternating_turns(total_secs: f64) -> Vec<DiarizationTurn> {
    let mut turns = Vec::new();
    let mut start = 0.0;
    let mut index = 0;
    while start < total_secs {
        let speaker = if index % 2 == 0 { "SPEAKER_00" } else { "SPEAKER_01" };
        turns.push(DiarizationTurn::new(start, start + 7.5, speaker));
        start += 7.5;
        index += 1;
    }
    turns
}

/// Tone with a half-second pause every 30 seconds.
fn synthetic_waveform(total_secs: usize, sample_rate: u32) -> Option<Waveform> {
    let rate = sample_rate as usize;
    let mut samples = vec![0.3f32; total_secs * rate];
    for pause in (30..total_secs).step_by(30) {
        let from = pause * rate;
        let to = (from + rate / 2).min(samples.len());
        samples[from..to].fill(0.0);
    }
    Waveform::new(samples, sample_rate).ok()
}

fn bench_fuse(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("fuse");
    group.sample_size(20);

    for chunks in [1usize, 10, 50] {
        let (results, starts) = synthetic_transcript(chunks);
        let turns = alternating_turns(chunks as f64 * CHUNK_SECS);

        group.bench_with_input(
            BenchmarkId::from_parameter(chunks),
            &(results, starts, turns),
            |b, (results, starts, turns)| {
                b.iter(|| fuse(black_box(results), black_box(starts), black_box(turns), &config));
            },
        );
    }

    group.finish();
}

fn bench_resplit(c: &mut Criterion) {
    let (results, starts) = synthetic_transcript(10);
    let turns = alternating_turns(10.0 * CHUNK_SECS);
    let Ok(merged) = fuse(&results, &starts, &turns, &Config::default()) else {
        eprintln!("Skipping resplit benchmark: fusion failed");
        return;
    };
    let rules = CutRules::default();

    c.bench_function("resplit_for_subtitles", |b| {
        b.iter(|| resplit_for_subtitles(black_box(&merged), &rules));
    });
}

fn bench_segment_audio(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_audio");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    let params = SegmenterParams::default();
    for minutes in [10usize, 60] {
        let Some(waveform) = synthetic_waveform(minutes * 60, 16000) else {
            eprintln!("Skipping {minutes} min recording: invalid waveform");
            continue;
        };

        group.bench_with_input(
            BenchmarkId::new("minutes", minutes),
            &waveform,
            |b, waveform| {
                b.iter(|| segment_audio(black_box(waveform), &params));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_fuse, bench_resplit, bench_segment_audio);
criterion_main!(benches);
