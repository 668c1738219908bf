use indexmap::IndexMap;
use serde::Deserialize;

/// One telemetry payload as served by the backend. Decoded per poll, rendered
/// once, then dropped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    pub cpu: CpuStat,
    pub memory: UsageStat,
    pub disk: UsageStat,
    pub uptime_days: f64,
    pub temps: IndexMap<String, Vec<TempEntry>>,
    pub network: NetStat,
    pub processes: Vec<ProcessEntry>,
    // Linux hosts report no fan or voltage sensors and leave these out.
    #[serde(default)]
    pub fan_speeds: IndexMap<String, Vec<FanEntry>>,
    #[serde(default)]
    pub voltages: IndexMap<String, Vec<VoltageEntry>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CpuStat {
    pub usage: f64,
    pub count: u32,
}

/// Memory and disk share a shape: percent usage plus totals in GiB.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UsageStat {
    pub usage: f64,
    pub total: f64,
    pub used: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetStat {
    pub sent: f64,
    pub recv: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TempEntry {
    pub label: Option<String>,
    pub current: f64,
    pub high: Option<f64>,
    pub critical: Option<f64>,
}

impl TempEntry {
    /// Label to show for this sensor. Missing and empty labels fall back to
    /// the chip name.
    pub fn display_label<'a>(&'a self, group: &'a str) -> &'a str {
        match self.label.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => group,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FanEntry {
    pub label: String,
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VoltageEntry {
    pub label: String,
    pub voltage: f64,
}

impl Snapshot {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

#[cfg(test)]
pub(crate) fn sample_json() -> serde_json::Value {
    serde_json::json!({
        "cpu": { "usage": 12.5, "count": 8 },
        "memory": { "usage": 41.2, "total": 15.55, "used": 6.41 },
        "disk": { "usage": 63.0, "total": 467.89, "used": 294.77 },
        "uptime_days": 3.27,
        "temps": {
            "coretemp": [
                { "label": "Package id 0", "current": 54.0, "high": 100.0, "critical": 100.0 },
                { "label": "", "current": 51.0, "high": 100.0, "critical": 100.0 }
            ],
            "acpitz": [
                { "current": 27.8, "high": null, "critical": null }
            ]
        },
        "network": { "sent": 120.44, "recv": 1024.9 },
        "processes": [
            { "pid": 1234, "name": "firefox", "cpu_percent": 17.3 },
            { "pid": 1, "name": "systemd", "cpu_percent": 0.0 }
        ],
        "fan_speeds": {
            "thinkpad": [ { "label": "fan1", "speed": 2100.0 } ]
        },
        "voltages": {
            "nct6775": [
                { "label": "Vcore", "voltage": 1.2 },
                { "label": "+12V", "voltage": 12.1 }
            ]
        }
    })
}
