//! Fuzz target for decompressing arbitrary bytes.
//!
//! Run with: cargo +nightly fuzz run inflate

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use zpack::{CodecOptions, Format, decompress_stream};

fuzz_target!(|data: &[u8]| {
    // First byte picks framing and buffer size so small chunks get coverage too.
    let Some((&selector, body)) = data.split_first() else {
        return;
    };
    let format = if selector & 1 == 0 {
        Format::Zlib
    } else {
        Format::Raw
    };
    let chunk = usize::from(selector >> 1) + 1;
    let Ok(options) = CodecOptions::new().format(format).chunk_size(chunk) else {
        return;
    };

    let mut out = Vec::new();
    let _ = decompress_stream(&mut Cursor::new(body), &mut out, &options);
});
