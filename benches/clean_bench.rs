//! Qing 性能基准测试.
//!
//! 覆盖标签剥离、帧链遍历与 Xing 头合成等核心路径.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use qing::core::BitWriter;
use qing::mp3::{Frame, add_xing_header, frame_offsets, remove_tags_and_xing};

/// 生成 MPEG-1 Layer III 44100Hz 立体声 VBR 码流, 前后带 ID3 标签
fn make_tagged_stream(frames: usize) -> Vec<u8> {
    let mut data = b"ID3\x04\x00\x00\x00\x00\x01\x00".to_vec();
    data.resize(10 + 128, 0);
    for i in 0..frames {
        let mut bw = BitWriter::new();
        bw.write_bits(0x7FF, 11);
        bw.write_bits(0b11, 2);
        bw.write_bits(0b01, 2);
        bw.write_bits(1, 1);
        bw.write_bits(5 + (i % 10) as u32, 4);
        bw.write_bits(0, 16 - 4 - 2);
        let header = bw.finish();
        let len = Frame::new(&header, 0)
            .ok()
            .and_then(|f| f.frame_length())
            .unwrap_or(417);
        let start = data.len();
        data.resize(start + len, 0);
        data[start..start + 4].copy_from_slice(&header);
    }
    let mut tag = b"TAG".to_vec();
    tag.resize(128, b' ');
    data.extend_from_slice(&tag);
    data
}

fn bench_remove_tags(c: &mut Criterion) {
    c.bench_function("remove_tags_and_xing_5000", |b| {
        let data = make_tagged_stream(5000);
        b.iter(|| {
            let _out = remove_tags_and_xing(black_box(data.clone())).unwrap();
        });
    });
}

fn bench_frame_offsets(c: &mut Criterion) {
    c.bench_function("frame_offsets_5000", |b| {
        let data = remove_tags_and_xing(make_tagged_stream(5000)).unwrap();
        b.iter(|| {
            let _scan = frame_offsets(black_box(&data), 0).unwrap();
        });
    });
}

fn bench_add_xing(c: &mut Criterion) {
    c.bench_function("add_xing_header_5000", |b| {
        let data = remove_tags_and_xing(make_tagged_stream(5000)).unwrap();
        b.iter(|| {
            let _out = add_xing_header(black_box(data.clone())).unwrap();
        });
    });
}

criterion_group!(benches, bench_remove_tags, bench_frame_offsets, bench_add_xing);
criterion_main!(benches);
