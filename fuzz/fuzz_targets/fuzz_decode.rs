#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Packed streams can ask for huge buffers; keep the fuzzer's RSS sane
    let limits = zentrs::Limits {
        max_memory_bytes: Some(64 * 1024 * 1024),
        ..Default::default()
    };

    // None of these may panic, whatever the input
    let _ = zentrs::decode(data, enough::Unstoppable);
    let _ = zentrs::DecodeRequest::new(data)
        .with_limits(&limits)
        .decode_each(enough::Unstoppable);
    let _ = zentrs::ContainerInfo::from_bytes(data);
});
