//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng, rngs::StdRng};
use zpack::{ContainerWriter, PackResult};

/// Builds an in-memory container from `(name, payload)` pairs.
///
/// Payloads are stored as given; nothing is compressed.
pub fn create_container(members: &[(&str, &[u8])]) -> zpack::Result<Vec<u8>> {
    create_container_with_result(members).map(|(bytes, _)| bytes)
}

/// Like [`create_container`], also returning the writer's summary.
pub fn create_container_with_result(
    members: &[(&str, &[u8])],
) -> zpack::Result<(Vec<u8>, PackResult)> {
    let mut bytes = Vec::new();
    let result = {
        let mut writer = ContainerWriter::new(&mut bytes);
        for (name, data) in members {
            writer.append_bytes(name, data)?;
        }
        writer.finish()?
    };
    Ok((bytes, result))
}

/// Writes `data` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("Failed to write fixture file");
    path
}

/// Deterministic pseudo-random bytes, effectively incompressible.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill(&mut data[..]);
    data
}

/// Repetitive text that compresses well, similar to markup documents.
pub fn markup_bytes(pages: usize) -> Vec<u8> {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<document>\n");
    for i in 0..pages {
        out.push_str(&format!(
            "  <page id=\"{i}\"><title>Page {i}</title><body>Lorem ipsum dolor sit amet.</body></page>\n"
        ));
    }
    out.push_str("</document>\n");
    out.into_bytes()
}

/// Builds the bytes of one record by hand, bypassing name validation.
pub fn raw_record(name_field: &[u8; 20], size: u64, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(28 + payload.len());
    out.extend_from_slice(name_field);
    out.extend_from_slice(&size.to_ne_bytes());
    out.extend_from_slice(payload);
    out
}

/// Zero-pads `name` into a name field.
pub fn name_field(name: &str) -> [u8; 20] {
    let mut field = [0u8; 20];
    field[..name.len()].copy_from_slice(name.as_bytes());
    field
}
