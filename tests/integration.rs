use chimp::bitbuffer::BitReader;
use chimp::{
    ChimpDecoder, ChimpEncoder, ChimpNDecoder, ChimpNEncoder, CompressedBlock, Decoder, Encoder,
    Error, Window, Word,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Round-trip: encode then decode, verify exact equality.
fn roundtrip<W: Word>(input: &[W], window: Option<Window>) -> Vec<W> {
    let mut enc = Encoder::<W>::new(window);
    for w in input {
        enc.push(*w);
    }
    let block = enc.into_compressed();
    Decoder::<W>::decode(&block, window).expect("decode failed")
}

fn encode<W: Word>(input: &[W], window: Option<Window>) -> (CompressedBlock, usize) {
    let mut enc = Encoder::<W>::new(window);
    for w in input {
        enc.push(*w);
    }
    enc.close();
    let size = enc.size_bits();
    (enc.into_compressed(), size)
}

fn variants() -> [Option<Window>; 3] {
    [None, Some(Window::new(32).unwrap()), Some(Window::DEFAULT)]
}

#[test]
fn test_empty_block() {
    init_logger();
    for window in variants() {
        let block = Encoder::<u64>::new(window).into_compressed();
        assert_eq!(block.count, 0);
        let mut dec = Decoder::<u64>::new(&block, window);
        assert_eq!(dec.next_word(), Ok(None));

        let block = Encoder::<u32>::new(window).into_compressed();
        let mut dec = Decoder::<u32>::new(&block, window);
        assert_eq!(dec.next_word(), Ok(None));
    }
}

#[test]
fn test_single_value_roundtrip() {
    for window in variants() {
        let input = vec![std::f64::consts::PI.to_bits()];
        assert_eq!(roundtrip(&input, window), input);
    }
}

#[test]
fn test_one_one_two_scenario() {
    init_logger();
    let input: Vec<u64> = [1.0f64, 1.0, 2.0].iter().map(|v| v.to_bits()).collect();
    let block = {
        let mut enc = ChimpEncoder::<u64>::new();
        for w in &input {
            enc.push(*w);
        }
        enc.into_compressed()
    };

    let mut reader = BitReader::from_raw(&block.bytes, block.total_bits);
    assert_eq!(reader.read_bits(64), Ok(1.0f64.to_bits()));
    assert_eq!(reader.read_bits(2), Ok(0b00));

    let mut dec = ChimpDecoder::<u64>::new(&block);
    assert_eq!(dec.next_float(), Ok(Some(1.0)));
    assert_eq!(dec.next_float(), Ok(Some(1.0)));
    assert_eq!(dec.next_float(), Ok(Some(2.0)));
    assert_eq!(dec.next_float(), Ok(None));
}

#[test]
fn test_float_scenario_bit_exact() {
    let input: Vec<u32> = [1.0f32, -2.0, -2.5].iter().map(|v| v.to_bits()).collect();
    for window in variants() {
        let output = roundtrip(&input, window);
        assert_eq!(output, input, "window={window:?}");
    }
}

#[test]
fn test_exact_repeats_cost_two_bits() {
    let n = 500;
    let input = vec![42.125f64.to_bits(); n];
    let (_, size) = encode(&input, None);
    // Raw first value, then 2 bits per repeat, then the sentinel codeword.
    let (_, empty_tail) = encode(&input[..1], None);
    assert_eq!(size - empty_tail, 2 * (n - 1));

    let input32 = vec![42.125f32.to_bits(); n];
    let (_, size) = encode(&input32, None);
    let (_, empty_tail) = encode(&input32[..1], None);
    assert_eq!(size - empty_tail, 2 * (n - 1));
}

#[test]
fn test_exact_repeats_windowed_cost() {
    let n = 500;
    for size in [2, 32, 128] {
        let window = Window::new(size).unwrap();
        let mut enc = ChimpNEncoder::<u64>::new(window);
        enc.push_float(-17.0);
        let first = enc.size_bits();
        for _ in 1..n {
            enc.push_float(-17.0);
        }
        assert_eq!(
            enc.size_bits() - first,
            (2 + window.log2() as usize) * (n - 1),
            "window={size}"
        );
    }
}

#[test]
fn test_special_float_values() {
    let input: Vec<u64> = [
        f64::MIN,
        f64::MAX,
        f64::EPSILON,
        f64::MIN_POSITIVE,
        f64::INFINITY,
        f64::NEG_INFINITY,
        0.0,
        -0.0,
        5e-324,
    ]
    .iter()
    .map(|v| v.to_bits())
    .collect();
    for window in variants() {
        assert_eq!(roundtrip(&input, window), input);
    }
}

#[test]
fn test_non_canonical_nan_survives() {
    // Only the canonical quiet NaN is reserved.
    let input = vec![
        1.0f64.to_bits(),
        0x7ff8_0000_0000_0001,
        0xfff8_0000_0000_0000,
        2.0f64.to_bits(),
    ];
    for window in variants() {
        assert_eq!(roundtrip(&input, window), input);
    }
}

#[test]
fn test_canonical_nan_sample_truncates_stream() {
    init_logger();
    // Known limitation: a genuine sample equal to the marker ends the block.
    let input = vec![1.0f64.to_bits(), u64::END_OF_STREAM, 2.0f64.to_bits()];
    for window in variants() {
        let (block, _) = encode(&input, window);
        assert_eq!(block.count, 3);
        let output = Decoder::<u64>::decode(&block, window).unwrap();
        assert_eq!(output, vec![1.0f64.to_bits()]);
    }
}

#[test]
fn test_slowly_varying_series() {
    let input: Vec<u64> = (0..10_000)
        .map(|i| (20.0 + 5.0 * ((i as f64) * 0.01).sin() + (i as f64) * 0.001).to_bits())
        .collect();
    for window in variants() {
        assert_eq!(roundtrip(&input, window), input);
    }
}

#[test]
fn test_decimal_series_compresses() {
    let input: Vec<u64> = (0..10_000)
        .map(|i| (42.0 + (i % 10) as f64 * 0.5).to_bits())
        .collect();
    let (block, _) = encode(&input, None);
    let ratio = (input.len() * 8) as f64 / block.bytes.len() as f64;
    assert!(ratio > 2.0, "compression ratio too low: {ratio:.2}x");
}

#[test]
fn test_windowed_beats_single_on_periodic_series() {
    let mut rng = StdRng::seed_from_u64(0xC41F);
    let period = 24;
    let base: Vec<u64> = (0..period)
        .map(|_| (1.0 + rng.gen::<f64>()).to_bits())
        .collect();
    // Every other period flips a high mantissa bit.
    let input: Vec<u64> = (0..100 * period)
        .map(|i| base[i % period] ^ (((i / period) as u64 % 2) << 40))
        .collect();

    let (single_block, single) = encode(&input, None);
    let (windowed_block, windowed) = encode(&input, Some(Window::DEFAULT));
    assert!(
        windowed * 2 < single,
        "windowed {windowed} bits vs single {single} bits"
    );
    assert_eq!(Decoder::<u64>::decode(&single_block, None).unwrap(), input);
    assert_eq!(
        Decoder::<u64>::decode(&windowed_block, Some(Window::DEFAULT)).unwrap(),
        input
    );
}

#[test]
fn test_large_random_float_block() {
    let mut rng = StdRng::seed_from_u64(42);
    let input: Vec<u32> = (0..100_000)
        .map(|_| rng.gen_range(-1000.0f32..1000.0).to_bits())
        .collect();
    for window in variants() {
        // Small initial capacity forces the buffer to grow many times.
        let mut enc = Encoder::<u32>::with_capacity(window, 1);
        for w in &input {
            enc.push(*w);
        }
        let block = enc.into_compressed();
        assert_eq!(block.count, 100_000);
        let output: Vec<u32> = Decoder::<u32>::new(&block, window)
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(output.len(), input.len());
        assert_eq!(output, input, "window={window:?}");
    }
}

#[test]
fn test_large_random_double_block() {
    let mut rng = StdRng::seed_from_u64(7);
    let input: Vec<u64> = (0..20_000)
        .map(|_| rng.gen_range(-1e6f64..1e6).to_bits())
        .collect();
    for window in variants() {
        assert_eq!(roundtrip(&input, window), input);
    }
}

#[test]
fn test_decode_from_bytes_without_block() {
    let input: Vec<u32> = (0..50).map(|i| (i as f32 * 0.25).to_bits()).collect();
    let window = Window::new(32).unwrap();
    let (block, _) = encode(&input, Some(window));
    let bytes = block.bytes.clone();
    let output: Vec<u32> = ChimpNDecoder::<u32>::from_bytes(&bytes, window)
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(output, input);
}

#[test]
fn test_truncated_block_is_an_error() {
    let input: Vec<u64> = (0..100).map(|i| (i as f64 * 1.1).to_bits()).collect();
    for window in variants() {
        let (block, _) = encode(&input, window);
        let cut = &block.bytes[..block.bytes.len() / 2];
        let results: Vec<_> = Decoder::<u64>::from_bytes(cut, window).collect();
        let last = results.last().expect("at least one result");
        assert!(
            matches!(last, Err(Error::UnexpectedEnd { .. })),
            "window={window:?}"
        );
        assert!(results[..results.len() - 1].iter().all(|r| r.is_ok()));
    }
}

#[test]
fn test_window_size_is_validated() {
    assert_eq!(Window::new(100), Err(Error::InvalidWindow(100)));
    assert!(Window::try_from(64usize).is_ok());
}

#[test]
fn test_independent_streams_in_parallel() {
    let handles: Vec<_> = (0..4u64)
        .map(|seed| {
            std::thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let input: Vec<u64> = (0..5_000)
                    .map(|_| rng.gen_range(0.0f64..100.0).to_bits())
                    .collect();
                let window = Some(Window::DEFAULT);
                assert_eq!(roundtrip(&input, window), input);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn test_iterator_matches_decode() {
    let input: Vec<u64> = (0..200).map(|i| (i as f64).sqrt().to_bits()).collect();
    let window = Some(Window::new(32).unwrap());
    let (block, _) = encode(&input, window);

    let decoded = Decoder::<u64>::decode(&block, window).unwrap();
    let iterated: Vec<u64> = ChimpNDecoder::<u64>::new(&block, Window::new(32).unwrap())
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(decoded, iterated);
    assert_eq!(decoded, input);
}
