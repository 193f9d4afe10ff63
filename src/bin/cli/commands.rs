//! Command implementations for the CLI tool.

use std::path::Path;

use zpack::{
    CodecOptions, ContainerReader, Format, MemberSource, PackOptions, PathSafety, UnpackOptions,
    UnpackResult,
};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::create_formatter;
use crate::progress::CliProgress;

/// Configuration for the compress command.
pub struct CompressConfig<'a> {
    pub source: &'a Path,
    pub dest: &'a Path,
    pub level: u32,
    pub raw: bool,
    pub format: OutputFormat,
}

/// Configuration for the pack command.
pub struct PackConfig<'a> {
    pub archive_path: &'a Path,
    pub files: &'a [String],
    pub level: u32,
    pub max_buffered: Option<u64>,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Configuration for the unpack command.
pub struct UnpackConfig<'a> {
    pub archive_path: &'a Path,
    pub output_dir: &'a Path,
    pub first: bool,
    pub path_safety: PathSafety,
    pub format: OutputFormat,
    pub quiet: bool,
}

fn stream_format(raw: bool) -> Format {
    if raw { Format::Raw } else { Format::Zlib }
}

fn print_output(text: &str) {
    println!("{}", text.trim_end());
}

/// Compress command implementation
pub fn compress(config: &CompressConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let options = match CodecOptions::new().level(config.level) {
        Ok(opts) => opts.format(stream_format(config.raw)),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    match zpack::compress_file_with(config.source, config.dest, &options) {
        Ok(stats) => {
            print_output(&formatter.format_stats("Compressed", config.source, config.dest, &stats));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}

/// Decompress command implementation
pub fn decompress(source: &Path, dest: &Path, raw: bool, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);
    let options = CodecOptions::new().format(stream_format(raw));

    match zpack::decompress_file_with(source, dest, &options) {
        Ok(stats) => {
            print_output(&formatter.format_stats("Decompressed", source, dest, &stats));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}

/// Parses a `FILE[=NAME]` argument.
///
/// An argument naming an existing file is always taken as a path, so file
/// names containing `=` still work without a rename.
pub fn parse_member_arg(arg: &str) -> zpack::Result<MemberSource> {
    if !Path::new(arg).exists() {
        if let Some((path, name)) = arg.rsplit_once('=') {
            return Ok(MemberSource::new(path, name));
        }
    }
    MemberSource::from_path(arg)
}

/// Pack command implementation
pub fn pack(config: &PackConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);

    let codec = match CodecOptions::new().level(config.level) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };
    let mut options = PackOptions::new().codec(codec);
    if let Some(limit) = config.max_buffered {
        options = options.max_buffered_member(limit);
    }

    let mut sources = Vec::with_capacity(config.files.len());
    for arg in config.files {
        match parse_member_arg(arg) {
            Ok(source) => sources.push(source),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::BadArgs;
            }
        }
    }

    let mut progress = CliProgress::new(config.quiet);
    progress.set_message("Packing...");

    let result = match zpack::build_archive(config.archive_path, &sources, &options, &mut progress)
    {
        Ok(r) => r,
        Err(e) => {
            progress.finish_with_message("Failed");
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    progress.finish();
    print_output(&formatter.format_pack_result(config.archive_path, &result));

    if progress.warnings() > 0 {
        ExitCode::Warning
    } else {
        ExitCode::Success
    }
}

/// Unpack command implementation
pub fn unpack(config: &UnpackConfig<'_>) -> ExitCode {
    let formatter = create_formatter(config.format);
    let options = UnpackOptions::new().path_safety(config.path_safety);

    let result = if config.first {
        unpack_first(config.archive_path, config.output_dir, &options)
    } else {
        let mut progress = CliProgress::new(config.quiet);
        progress.set_message("Unpacking...");
        let result =
            zpack::extract_archive(config.archive_path, config.output_dir, &options, &mut progress);
        match &result {
            Ok(_) => progress.finish(),
            Err(_) => progress.finish_with_message("Failed"),
        }
        result
    };

    match result {
        Ok(result) if result.members.is_empty() => {
            eprintln!("Warning: {} contains no members", config.archive_path.display());
            print_output(&formatter.format_unpack_result(&result));
            ExitCode::Warning
        }
        Ok(result) => {
            print_output(&formatter.format_unpack_result(&result));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}

fn unpack_first(
    archive_path: &Path,
    output_dir: &Path,
    options: &UnpackOptions,
) -> zpack::Result<UnpackResult> {
    std::fs::create_dir_all(output_dir).map_err(|source| zpack::Error::OpenFailed {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let mut reader = ContainerReader::open_path(archive_path)?;
    let mut result = UnpackResult::default();
    if let Some(info) = reader.read_next_member_with(output_dir, options)? {
        result.bytes_written = info.size;
        result.members.push(info);
    }
    Ok(result)
}

/// List command implementation
pub fn list(archive_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    match zpack::list_archive(archive_path) {
        Ok(members) => {
            print_output(&formatter.format_list(&members));
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}
