//! End-to-end decode tests over synthetic on-disk fixtures

use std::fs::File;
use std::sync::atomic::AtomicBool;

use adxplay::{
    detect_format, AdxDecoder, AudioDecoder, AudioFormat, LoopMode, MemorySink, WavSink,
};

const SIGNATURE: &[u8; 6] = b"(c)CRI";

/// Frame whose decode with zero history and taps (7334, -3284) is known.
const KNOWN_FRAME: [u8; 18] = [
    0x00, 0x0E, 0x39, 0x10, 0x21, 0xCE, 0xE1, 0x11, 0x3F, 0xFF, 0xEF, 0x00, 0x4E, 0xAF, 0xF1,
    0x60, 0xDD, 0x27,
];

const KNOWN_SAMPLES: [i16; 32] = [
    45, -25, -66, -99, -95, -76, -120, -184, -264, -311, -331, -329, -279, -251, -241, -246,
    -278, -316, -343, -361, -312, -300, -378, -452, -522, -558, -491, -432, -425, -460, -453,
    -338,
];

/// Build a complete v3 ADX file: 0x32-byte header then the given frames.
fn build_adx(
    channel_count: u8,
    sample_count: u32,
    loop_pts: Option<(u32, u32)>,
    frames: &[&[u8]],
) -> Vec<u8> {
    let stream_offset: u16 = 0x32;
    let mut data = Vec::new();
    data.extend_from_slice(&0x8000u16.to_be_bytes());
    data.extend_from_slice(&(stream_offset - 4).to_be_bytes());
    data.push(0x03); // standard encoding
    data.push(18); // frame size
    data.push(channel_count);
    data.push(0);
    data.extend_from_slice(&44100u32.to_be_bytes());
    data.extend_from_slice(&sample_count.to_be_bytes());
    data.extend_from_slice(&500u16.to_be_bytes());
    data.extend_from_slice(&0x0300u16.to_be_bytes());
    data.resize(0x18, 0);
    let (enabled, start, end) = match loop_pts {
        Some((s, e)) => (1u32, s, e),
        None => (0, 0, 0),
    };
    data.extend_from_slice(&enabled.to_be_bytes());
    data.extend_from_slice(&start.to_be_bytes());
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(&end.to_be_bytes());
    data.resize(usize::from(stream_offset) - 6, 0);
    data.extend_from_slice(SIGNATURE);
    for frame in frames {
        data.extend_from_slice(frame);
    }
    data
}

fn write_fixture(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, data).unwrap();
    path
}

#[test]
fn known_frame_decodes_through_file_api() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_adx(1, 32, None, &[&KNOWN_FRAME]);
    let path = write_fixture(&dir, "known.adx", &data);

    let mut decoder = AdxDecoder::new(File::open(&path).unwrap(), LoopMode::Count(1)).unwrap();
    assert_eq!(decoder.coefficients(), (7334, -3284));

    let chunk = decoder.next_chunk().unwrap().unwrap();
    assert_eq!(chunk.as_slice(), &KNOWN_SAMPLES);
    assert_eq!(decoder.next_chunk().unwrap(), None);
}

#[test]
fn full_decode_emits_declared_sample_count() {
    let dir = tempfile::tempdir().unwrap();
    // 3 frames of content, 70 declared samples: last frame clipped.
    let frame = [0u8; 18];
    let data = build_adx(1, 70, None, &[&KNOWN_FRAME, &frame, &frame]);
    let path = write_fixture(&dir, "clip.adx", &data);

    let mut decoder = AdxDecoder::new(File::open(&path).unwrap(), LoopMode::Count(1)).unwrap();
    let stop = AtomicBool::new(false);
    let mut sink = MemorySink::new();
    let written = decoder.decode_to(&mut sink, &stop).unwrap();
    assert_eq!(written, 70);
    assert_eq!(sink.samples().len(), 70);
}

#[test]
fn stereo_decode_doubles_interleaved_output() {
    let dir = tempfile::tempdir().unwrap();
    let silent = [0u8; 18];
    let data = build_adx(
        2,
        64,
        None,
        &[&KNOWN_FRAME, &silent, &KNOWN_FRAME, &silent],
    );
    let path = write_fixture(&dir, "stereo.adx", &data);

    let mut decoder = AdxDecoder::new(File::open(&path).unwrap(), LoopMode::Count(1)).unwrap();
    let stop = AtomicBool::new(false);
    let mut sink = MemorySink::new();
    let written = decoder.decode_to(&mut sink, &stop).unwrap();
    assert_eq!(written, 128);

    // Left channel carries the known frame, right the silent one.
    let samples = sink.samples();
    for i in 0..32 {
        assert_eq!(samples[2 * i], KNOWN_SAMPLES[i]);
        assert_eq!(samples[2 * i + 1], 0);
    }
}

#[test]
fn decode_twice_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_adx(1, 64, Some((0, 40)), &[&KNOWN_FRAME, &KNOWN_FRAME]);
    let path = write_fixture(&dir, "loop.adx", &data);

    let decode = || {
        let mut decoder =
            AdxDecoder::new(File::open(&path).unwrap(), LoopMode::Count(1)).unwrap();
        let stop = AtomicBool::new(false);
        let mut sink = MemorySink::new();
        decoder.decode_to(&mut sink, &stop).unwrap();
        sink.into_samples()
    };

    assert_eq!(decode(), decode());
}

#[test]
fn wav_render_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let data = build_adx(1, 32, None, &[&KNOWN_FRAME]);
    let path = write_fixture(&dir, "render.adx", &data);
    let wav_path = dir.path().join("render.wav");

    let mut decoder = AdxDecoder::new(File::open(&path).unwrap(), LoopMode::Count(1)).unwrap();
    let mut sink = WavSink::create(&wav_path, decoder.sample_rate(), decoder.channels()).unwrap();
    let stop = AtomicBool::new(false);
    decoder.decode_to(&mut sink, &stop).unwrap();
    sink.finalize().unwrap();

    let mut reader = hound::WavReader::open(&wav_path).unwrap();
    assert_eq!(reader.spec().sample_rate, 44100);
    assert_eq!(reader.spec().channels, 1);
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.as_slice(), &KNOWN_SAMPLES);
}

#[test]
fn sniffing_routes_adx_and_rejects_noise() {
    let data = build_adx(1, 32, None, &[&KNOWN_FRAME]);
    assert_eq!(detect_format(&data, Some("bgm01.adx")), AudioFormat::Adx);
    assert_eq!(detect_format(&[0u8; 64], None), AudioFormat::Unknown);
}
