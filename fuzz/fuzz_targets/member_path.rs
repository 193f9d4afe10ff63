//! Fuzz target for mapping member names to output paths.
//!
//! Key properties being tested:
//! - Strict and relaxed names never leave the output directory
//! - Strict names are a single path component
//! - Names need not be UTF-8
//!
//! Run with: cargo +nightly fuzz run member_path

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::{Component, Path};
use zpack::MemberName;
use zpack::safety::{PathSafety, resolve_member_path};

fuzz_target!(|data: &[u8]| {
    let Ok(name) = MemberName::from_bytes(data) else {
        return;
    };
    let out_dir = Path::new("/fuzz/out");

    if let Ok(path) = resolve_member_path(&name, out_dir, PathSafety::Strict) {
        let rest = path.strip_prefix(out_dir).expect("strict path escaped output dir");
        assert_eq!(rest.components().count(), 1, "strict path nested: {:?}", rest);
    }

    if let Ok(path) = resolve_member_path(&name, out_dir, PathSafety::Relaxed) {
        let rest = path.strip_prefix(out_dir).expect("relaxed path escaped output dir");
        assert!(
            rest.components().all(|c| matches!(c, Component::Normal(_))),
            "relaxed path has non-normal component: {:?}",
            rest
        );
    }
});
