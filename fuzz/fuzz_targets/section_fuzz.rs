#![no_main]
use libfuzzer_sys::fuzz_target;
use tagfile::tag::{Tag, frame, index, type_table};

fuzz_target!(|data: &[u8]| {
    let _ = frame(Tag::TAG0, data);

    // First half as a TYPE payload, second half as INDX against it.
    let (type_part, index_part) = data.split_at(data.len() / 2);
    let types = type_table::decode(type_part).unwrap_or_default();
    if let Ok((items, patches)) = index::decode(index_part, &types) {
        for item in &items {
            assert!(item.type_ref.is_none() || types.resolve(item.type_ref).is_some());
        }
        for patch in &patches {
            assert!(patch.type_ref.is_none() || types.resolve(patch.type_ref).is_some());
        }
    }
});
