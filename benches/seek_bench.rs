//! Liu 定位与读取性能基准测试.
//!
//! 覆盖固定块长 (PCM) 与定位表 (分帧重叠块流) 两种寻址的随机定位加短读取,
//! 以及顺序读取.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use liu::codec::{CodecId, LappedHeader};
use liu::{AudioSource, PcmParams, SourceOptions};

const RATE: u32 = 44100;

/// 伪随机序列 (线性同余)
fn next_random(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407);
    *state >> 33
}

/// 10 秒立体声 S16LE PCM
fn make_pcm() -> Vec<u8> {
    (0..RATE as usize * 10 * 2)
        .flat_map(|i| (((i * 37) % 20000) as i16 - 10000).to_le_bytes())
        .collect()
}

/// 分帧重叠块流, 块帧数在 [256, 2048) 之间变化
fn make_framed() -> Vec<u8> {
    let mut state = 7;
    let mut data = Vec::new();
    let mut frames_total = 0u64;
    while frames_total < u64::from(RATE) * 10 {
        let frames = 256 + (next_random(&mut state) % 1792) as u16;
        let overlap = 32u8;
        let values = (frames as usize + overlap as usize) * 2;
        let payload: Vec<u8> = (0..values)
            .flat_map(|i| (((i * 13) % 8000) as i16 - 4000).to_le_bytes())
            .collect();
        let header = LappedHeader::for_payload(2, overlap, frames, RATE, &payload);
        data.extend_from_slice(&header.to_bytes());
        data.extend_from_slice(&payload);
        frames_total += u64::from(frames);
    }
    data
}

fn bench_random_seek<S: AudioSource>(source: &mut S, state: &mut u64, buf: &mut [f32]) {
    let frame_count = source.properties().frame_count;
    let target = next_random(state) % frame_count;
    source.seek_frame(black_box(target));
    black_box(source.read_frames(256, Some(buf)));
}

fn bench_fixed_seek(c: &mut Criterion) {
    c.bench_function("fixed_pcm_random_seek_read_256", |b| {
        let params = PcmParams {
            codec_id: CodecId::PcmS16le,
            channels: 2,
            sample_rate: RATE,
            block_frames: 1024,
        };
        let mut source = liu::open_pcm(make_pcm(), params, SourceOptions::fixed()).unwrap();
        let mut buf = vec![0.0f32; 256 * 2];
        let mut state = 1;
        b.iter(|| bench_random_seek(&mut source, &mut state, &mut buf));
    });
}

fn bench_tabled_seek(c: &mut Criterion) {
    c.bench_function("tabled_lapped_random_seek_read_256", |b| {
        let mut source = liu::open_framed(make_framed(), SourceOptions::tabled()).unwrap();
        let mut buf = vec![0.0f32; 256 * 2];
        let mut state = 1;
        b.iter(|| bench_random_seek(&mut source, &mut state, &mut buf));
    });
}

fn bench_sequential_read(c: &mut Criterion) {
    c.bench_function("tabled_lapped_sequential_read_10s", |b| {
        let mut source = liu::open_framed(make_framed(), SourceOptions::tabled()).unwrap();
        let mut buf = vec![0.0f32; 4096 * 2];
        b.iter(|| {
            source.seek_frame(0);
            let mut total = 0;
            loop {
                let read = source.read_frames(4096, Some(&mut buf));
                if read == 0 {
                    break;
                }
                total += read;
            }
            black_box(total)
        });
    });
}

fn bench_open_framed(c: &mut Criterion) {
    c.bench_function("tabled_lapped_open_scan_10s", |b| {
        let data = bytes::Bytes::from(make_framed());
        b.iter(|| {
            let source = liu::open_framed(black_box(data.clone()), SourceOptions::tabled()).unwrap();
            black_box(source.properties().frame_count)
        });
    });
}

criterion_group!(
    benches,
    bench_fixed_seek,
    bench_tabled_seek,
    bench_sequential_read,
    bench_open_framed,
);
criterion_main!(benches);
