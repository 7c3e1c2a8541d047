//! Output formatting for CLI operations.

use serde_json::json;
use std::path::Path;

use mapsmith::{MissionSettings, TechList, TechnologyPartition, WorkingSetState};

/// Outcome of an unpack or pack run.
pub struct BuildReport<'a> {
    pub target: &'a Path,
    pub produced_path: &'a Path,
    pub produced: bool,
    pub state: WorkingSetState,
    pub injected: usize,
}

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the result of an unpack
    fn format_unpack(&self, report: &BuildReport<'_>) -> String;

    /// Formats the result of a pack
    fn format_pack(&self, report: &BuildReport<'_>) -> String;

    /// Formats a single resource injection
    fn format_inject(&self, location: &Path, bytes: u64) -> String;

    /// Formats mission settings
    fn format_settings(&self, settings: &MissionSettings) -> String;

    /// Formats a technology move and the resulting partition
    fn format_move(
        &self,
        id: &str,
        from: TechList,
        to: TechList,
        partition: &TechnologyPartition,
    ) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_unpack(&self, report: &BuildReport<'_>) -> String {
        if report.produced {
            format!(
                "Unpacked {} into {}\n",
                report.target.display(),
                report.produced_path.display()
            )
        } else {
            format!(
                "Packer finished but {} was not created\n",
                report.produced_path.display()
            )
        }
    }

    fn format_pack(&self, report: &BuildReport<'_>) -> String {
        let mut output = String::new();
        if report.injected > 0 {
            output.push_str(&format!("Injected {} resources\n", report.injected));
        }
        if report.produced {
            output.push_str(&format!(
                "Packed {} into {}\n",
                report.target.display(),
                report.produced_path.display()
            ));
        } else {
            output.push_str(&format!(
                "Packer finished but {} was not created; {} was kept\n",
                report.produced_path.display(),
                report.target.display()
            ));
        }
        output
    }

    fn format_inject(&self, location: &Path, bytes: u64) -> String {
        format!("Wrote {} ({})\n", location.display(), humanize_bytes(bytes))
    }

    fn format_settings(&self, settings: &MissionSettings) -> String {
        let world = settings.world();
        let player = settings.player();
        let techs = settings.technologies();
        let mut output = String::new();

        output.push_str("Mission Settings:\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');

        output.push_str(&format!(
            "  Debug flags:    {}\n",
            player
                .debug_flags
                .iter()
                .map(|&f| if f { "on" } else { "off" })
                .collect::<Vec<_>>()
                .join(", ")
        ));

        output.push_str("  Start resources:\n");
        for (name, amount) in world.resource_names.iter().zip(&player.start_resources) {
            output.push_str(&format!("    {:<14} {:>8}\n", name, amount));
        }

        output.push_str("  Players:\n");
        output.push_str(&format!(
            "    {:>2}  {:<20} {:<14} {}\n",
            "#", "Name", "Diplomacy", "Color"
        ));
        for slot in 0..player.player_names.len() {
            let diplomacy = world
                .diplomacy_states
                .get(player.player_diplomacy[slot])
                .map(String::as_str)
                .unwrap_or("-");
            let color = world
                .player_colors
                .get(player.player_colors[slot])
                .map(String::as_str)
                .unwrap_or("-");
            output.push_str(&format!(
                "    {:>2}  {:<20} {:<14} {}\n",
                slot + 1,
                player.player_names[slot],
                diplomacy,
                color
            ));
        }

        output.push_str(&format_partition(techs));
        output
    }

    fn format_move(
        &self,
        id: &str,
        from: TechList,
        to: TechList,
        partition: &TechnologyPartition,
    ) -> String {
        let mut output = format!("Moved {} from {} to {}\n", id, from, to);
        output.push_str(&format_partition(partition));
        output
    }
}

fn format_partition(partition: &TechnologyPartition) -> String {
    let mut output = String::new();
    for list in TechList::ALL {
        let ids = partition.list(list);
        output.push_str(&format!(
            "  {:<11} ({:>3}): {}\n",
            list.as_str(),
            ids.len(),
            ids.join(", ")
        ));
    }
    output
}

/// JSON output formatter
pub struct JsonFormatter;

impl JsonFormatter {
    fn build(report: &BuildReport<'_>, output_key: &str) -> serde_json::Value {
        let mut obj = json!({
            "success": report.produced,
            "target": report.target.display().to_string(),
            "state": report.state,
        });
        obj[output_key] = json!(report.produced_path.display().to_string());
        obj
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_unpack(&self, report: &BuildReport<'_>) -> String {
        let obj = Self::build(report, "staging");
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_pack(&self, report: &BuildReport<'_>) -> String {
        let mut obj = Self::build(report, "archive");
        obj["injected"] = json!(report.injected);
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_inject(&self, location: &Path, bytes: u64) -> String {
        let obj = json!({
            "path": location.display().to_string(),
            "bytes_written": bytes,
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_settings(&self, settings: &MissionSettings) -> String {
        let obj = json!({
            "world": settings.world(),
            "player": settings.player(),
            "technologies": settings.technologies(),
        });
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_move(
        &self,
        id: &str,
        from: TechList,
        to: TechList,
        partition: &TechnologyPartition,
    ) -> String {
        let obj = json!({
            "id": id,
            "from": from,
            "to": to,
            "technologies": partition,
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
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
