//! Output formatting for CLI operations.

use serde_json::json;
use std::path::Path;
use zpack::{MemberInfo, PackResult, StreamStats, UnpackResult};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the result of a single-file compress or decompress
    fn format_stats(&self, operation: &str, source: &Path, dest: &Path, stats: &StreamStats)
    -> String;

    /// Formats a list of members
    fn format_list(&self, members: &[MemberInfo]) -> String;

    /// Formats pack results
    fn format_pack_result(&self, archive: &Path, result: &PackResult) -> String;

    /// Formats unpack results
    fn format_unpack_result(&self, result: &UnpackResult) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_stats(
        &self,
        operation: &str,
        source: &Path,
        dest: &Path,
        stats: &StreamStats,
    ) -> String {
        format!(
            "{} {} -> {} ({} -> {}, ratio {:.1}%)\n",
            operation,
            source.display(),
            dest.display(),
            humanize_bytes(stats.bytes_in),
            humanize_bytes(stats.bytes_out),
            stats.ratio() * 100.0
        )
    }

    fn format_list(&self, members: &[MemberInfo]) -> String {
        let mut output = String::new();

        output.push_str(&format!("{:>12} {:>12} {}\n", "Offset", "Size", "Name"));
        output.push_str(&"-".repeat(50));
        output.push('\n');

        let mut total_size: u64 = 0;
        for member in members {
            total_size += member.size;
            output.push_str(&format!(
                "{:>12} {:>12} {}\n",
                member.offset,
                humanize_bytes(member.size),
                member.name
            ));
        }

        output.push_str(&"-".repeat(50));
        output.push('\n');
        output.push_str(&format!(
            "{} members, {} total\n",
            members.len(),
            humanize_bytes(total_size)
        ));

        output
    }

    fn format_pack_result(&self, archive: &Path, result: &PackResult) -> String {
        format!(
            "Created {} with {} members ({} payload, {} on disk)\n",
            archive.display(),
            result.members.len(),
            humanize_bytes(result.payload_bytes()),
            humanize_bytes(result.bytes_written)
        )
    }

    fn format_unpack_result(&self, result: &UnpackResult) -> String {
        format!(
            "Extracted {} members ({})\n",
            result.members.len(),
            humanize_bytes(result.bytes_written)
        )
    }
}

/// JSON output formatter
pub struct JsonFormatter;

fn member_json(member: &MemberInfo) -> serde_json::Value {
    json!({
        "name": member.name.to_string_lossy(),
        "size": member.size,
        "offset": member.offset,
    })
}

impl OutputFormatter for JsonFormatter {
    fn format_stats(
        &self,
        operation: &str,
        source: &Path,
        dest: &Path,
        stats: &StreamStats,
    ) -> String {
        let obj = json!({
            "operation": operation,
            "source": source.display().to_string(),
            "dest": dest.display().to_string(),
            "bytes_in": stats.bytes_in,
            "bytes_out": stats.bytes_out,
            "ratio": stats.ratio(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_list(&self, members: &[MemberInfo]) -> String {
        let items: Vec<_> = members.iter().map(member_json).collect();
        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_pack_result(&self, archive: &Path, result: &PackResult) -> String {
        let obj = json!({
            "archive": archive.display().to_string(),
            "members": result.members.iter().map(member_json).collect::<Vec<_>>(),
            "payload_bytes": result.payload_bytes(),
            "bytes_written": result.bytes_written,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_unpack_result(&self, result: &UnpackResult) -> String {
        let obj = json!({
            "members": result.members.iter().map(member_json).collect::<Vec<_>>(),
            "bytes_written": result.bytes_written,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    zpack::progress::format_bytes_iec(bytes)
}
