use crate::display::{Dashboard, Surface};
use crate::snapshot::{FanEntry, Snapshot, TempEntry, VoltageEntry};
use indexmap::IndexMap;
use std::fmt::Write as _;

/// Writes every field of `snapshot` into its surface. Grouped blocks and the
/// process table are rebuilt from scratch so repeated renders never append.
pub fn render_snapshot<D: Dashboard + ?Sized>(snapshot: &Snapshot, dash: &mut D) {
    dash.set_text(Surface::CpuUsage, &number(snapshot.cpu.usage));
    dash.set_text(Surface::CpuCount, &snapshot.cpu.count.to_string());

    dash.set_text(Surface::MemoryUsage, &number(snapshot.memory.usage));
    dash.set_text(Surface::MemoryTotal, &number(snapshot.memory.total));
    dash.set_text(Surface::MemoryUsed, &number(snapshot.memory.used));

    dash.set_text(Surface::DiskUsage, &number(snapshot.disk.usage));
    dash.set_text(Surface::DiskTotal, &number(snapshot.disk.total));
    dash.set_text(Surface::DiskUsed, &number(snapshot.disk.used));

    dash.set_text(Surface::UptimeDays, &number(snapshot.uptime_days));

    dash.set_text(Surface::Temps, &temps_block(&snapshot.temps));

    dash.set_text(Surface::NetSent, &number(snapshot.network.sent));
    dash.set_text(Surface::NetRecv, &number(snapshot.network.recv));

    let rows = snapshot
        .processes
        .iter()
        .map(|p| vec![p.pid.to_string(), p.name.clone(), number(p.cpu_percent)])
        .collect();
    dash.replace_rows(Surface::Processes, rows);

    dash.set_text(Surface::Fans, &fans_block(&snapshot.fan_speeds));
    dash.set_text(Surface::Voltages, &voltages_block(&snapshot.voltages));
}

pub fn temps_block(groups: &IndexMap<String, Vec<TempEntry>>) -> String {
    grouped_block(groups, |name, entry| {
        format!(
            "{}: {} °C (high = {}, critical = {})",
            entry.display_label(name),
            number(entry.current),
            optional(entry.high),
            optional(entry.critical)
        )
    })
}

pub fn fans_block(groups: &IndexMap<String, Vec<FanEntry>>) -> String {
    grouped_block(groups, |_, entry| {
        format!("{}: {} RPM", entry.label, number(entry.speed))
    })
}

pub fn voltages_block(groups: &IndexMap<String, Vec<VoltageEntry>>) -> String {
    grouped_block(groups, |_, entry| {
        format!("{}: {} V", entry.label, number(entry.voltage))
    })
}

fn grouped_block<T>(
    groups: &IndexMap<String, Vec<T>>,
    line: impl Fn(&str, &T) -> String,
) -> String {
    let mut out = String::new();
    for (name, entries) in groups {
        let _ = writeln!(out, "{name}:");
        for entry in entries {
            let _ = writeln!(out, "    {}", line(name, entry));
        }
    }
    out
}

// Plain decimal, never exponent notation: 8.0 prints as "8", 1e21 as all 22 digits.
fn number(value: f64) -> String {
    value.to_string()
}

fn optional(value: Option<f64>) -> String {
    value.map(number).unwrap_or_else(|| "null".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemoryDashboard;
    use crate::snapshot::sample_json;

    fn sample() -> Snapshot {
        serde_json::from_value(sample_json()).expect("sample decodes")
    }

    #[test]
    fn scalars_use_plain_string_form() {
        let mut dash = MemoryDashboard::default();
        render_snapshot(&sample(), &mut dash);

        assert_eq!(dash.text(Surface::CpuUsage), Some("12.5"));
        assert_eq!(dash.text(Surface::CpuCount), Some("8"));
        assert_eq!(dash.text(Surface::MemoryUsage), Some("41.2"));
        assert_eq!(dash.text(Surface::MemoryTotal), Some("15.55"));
        assert_eq!(dash.text(Surface::MemoryUsed), Some("6.41"));
        assert_eq!(dash.text(Surface::DiskUsage), Some("63"));
        assert_eq!(dash.text(Surface::DiskTotal), Some("467.89"));
        assert_eq!(dash.text(Surface::DiskUsed), Some("294.77"));
        assert_eq!(dash.text(Surface::UptimeDays), Some("3.27"));
        assert_eq!(dash.text(Surface::NetSent), Some("120.44"));
        assert_eq!(dash.text(Surface::NetRecv), Some("1024.9"));
    }

    #[test]
    fn temps_block_groups_and_falls_back_to_chip_name() {
        let mut dash = MemoryDashboard::default();
        render_snapshot(&sample(), &mut dash);

        assert_eq!(
            dash.text(Surface::Temps),
            Some(
                "coretemp:\n\
                 \x20   Package id 0: 54 °C (high = 100, critical = 100)\n\
                 \x20   coretemp: 51 °C (high = 100, critical = 100)\n\
                 acpitz:\n\
                 \x20   acpitz: 27.8 °C (high = null, critical = null)\n"
            )
        );
    }

    #[test]
    fn fan_and_voltage_blocks() {
        let mut dash = MemoryDashboard::default();
        render_snapshot(&sample(), &mut dash);

        assert_eq!(
            dash.text(Surface::Fans),
            Some("thinkpad:\n    fan1: 2100 RPM\n")
        );
        assert_eq!(
            dash.text(Surface::Voltages),
            Some("nct6775:\n    Vcore: 1.2 V\n    +12V: 12.1 V\n")
        );
    }

    #[test]
    fn grouped_block_keeps_group_then_entry_order() {
        let mut groups = IndexMap::new();
        groups.insert(
            "A".to_string(),
            vec![
                FanEntry { label: "x".to_string(), speed: 1.0 },
                FanEntry { label: "y".to_string(), speed: 2.0 },
            ],
        );
        groups.insert(
            "B".to_string(),
            vec![FanEntry { label: "z".to_string(), speed: 3.0 }],
        );

        assert_eq!(
            fans_block(&groups),
            "A:\n    x: 1 RPM\n    y: 2 RPM\nB:\n    z: 3 RPM\n"
        );
    }

    #[test]
    fn numbers_print_in_plain_decimal() {
        assert_eq!(number(8.0), "8");
        assert_eq!(number(12.5), "12.5");
        assert_eq!(number(1e21), "1000000000000000000000");
        assert_eq!(number(1e-7), "0.0000001");
    }

    #[test]
    fn linux_payload_renders_without_fans_or_voltages() {
        let mut value = sample_json();
        let fields = value.as_object_mut().expect("sample is an object");
        fields.remove("fan_speeds");
        fields.remove("voltages");
        let snapshot: Snapshot = serde_json::from_value(value).expect("decodes");

        let mut dash = MemoryDashboard::default();
        render_snapshot(&snapshot, &mut dash);

        assert_eq!(dash.text(Surface::CpuUsage), Some("12.5"));
        assert_eq!(dash.rows(Surface::Processes).map(<[_]>::len), Some(2));
        assert_eq!(dash.text(Surface::Fans), Some(""));
        assert_eq!(dash.text(Surface::Voltages), Some(""));
    }

    #[test]
    fn empty_groups_render_empty_text() {
        assert_eq!(voltages_block(&IndexMap::new()), "");
    }

    #[test]
    fn process_rows_follow_received_order() {
        let mut dash = MemoryDashboard::default();
        render_snapshot(&sample(), &mut dash);

        let rows = dash.rows(Surface::Processes).expect("table written");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == 3));
        assert_eq!(rows[0], vec!["1234", "firefox", "17.3"]);
        assert_eq!(rows[1], vec!["1", "systemd", "0"]);
    }

    #[test]
    fn empty_process_list_clears_table() {
        let mut dash = MemoryDashboard::default();
        render_snapshot(&sample(), &mut dash);

        let mut snapshot = sample();
        snapshot.processes.clear();
        render_snapshot(&snapshot, &mut dash);

        assert_eq!(dash.rows(Surface::Processes).map(<[_]>::len), Some(0));
    }

    #[test]
    fn rendering_twice_is_idempotent() {
        let snapshot = sample();
        let mut dash = MemoryDashboard::default();

        render_snapshot(&snapshot, &mut dash);
        let first_texts = dash.texts.clone();
        let first_tables = dash.tables.clone();

        render_snapshot(&snapshot, &mut dash);
        assert_eq!(dash.texts, first_texts);
        assert_eq!(dash.tables, first_tables);
    }
}
