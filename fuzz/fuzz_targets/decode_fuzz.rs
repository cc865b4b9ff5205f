#![no_main]
use libfuzzer_sys::fuzz_target;
use tagfile::Container;
use tagfile::tag::offset;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail, never panic.
    let _ = Container::decode(data);

    // Patch the length word so the input gets past the first check.
    if data.len() >= 8 && data.len() <= offset::OFFSET_MASK as usize {
        let mut fixed = data.to_vec();
        if let Ok(word) = offset::encode(data.len() as u32, true) {
            fixed[..4].copy_from_slice(&word);
            fixed[4..8].copy_from_slice(b"TAG0");
            if let Ok(c) = Container::decode(&fixed) {
                assert!(c.types.is_closed());
                let _ = tagfile::dump::types_xml_string(&c.types);
            }
        }
    }
});
