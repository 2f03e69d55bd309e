#![no_main]
use libfuzzer_sys::fuzz_target;
use zentrs::*;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode and decode to identical pixels
    let Ok(decoded) = decode(data, enough::Unstoppable) else {
        return;
    };
    // an empty container decodes fine but has nothing to re-encode
    if decoded.is_empty() {
        return;
    }

    let images: Vec<(&[u8], u32, u32)> = decoded
        .iter()
        .map(|img| (img.pixels(), img.width, img.height))
        .collect();
    let reencoded = encode_rgb8(&images, enough::Unstoppable).expect("decoded images must re-encode");
    let decoded2 = decode(&reencoded, enough::Unstoppable).expect("re-encoded data must decode");

    assert_eq!(decoded.len(), decoded2.len());
    for (a, b) in decoded.iter().zip(&decoded2) {
        assert_eq!((a.width, a.height), (b.width, b.height));
        assert_eq!(a.pixels(), b.pixels(), "roundtrip pixel mismatch");
    }
});
