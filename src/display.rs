use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use std::collections::HashMap;
use std::io::{self, Write};
use std::time::SystemTime;
use tracing::trace;

/// Named places in the layout that the renderer writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    CpuUsage,
    CpuCount,
    MemoryUsage,
    MemoryTotal,
    MemoryUsed,
    DiskUsage,
    DiskTotal,
    DiskUsed,
    UptimeDays,
    Temps,
    NetSent,
    NetRecv,
    Processes,
    Fans,
    Voltages,
}

impl Surface {
    pub fn id(self) -> &'static str {
        match self {
            Self::CpuUsage => "cpu-usage",
            Self::CpuCount => "cpu-count",
            Self::MemoryUsage => "memory-usage",
            Self::MemoryTotal => "memory-total",
            Self::MemoryUsed => "memory-used",
            Self::DiskUsage => "disk-usage",
            Self::DiskTotal => "disk-total",
            Self::DiskUsed => "disk-used",
            Self::UptimeDays => "uptime-days",
            Self::Temps => "temps",
            Self::NetSent => "net-sent",
            Self::NetRecv => "net-recv",
            Self::Processes => "processes",
            Self::Fans => "fans",
            Self::Voltages => "voltages",
        }
    }
}

/// Presentation layer the poller renders into. Writes replace whatever the
/// surface held before; nothing is appended.
pub trait Dashboard: Send {
    /// Toggles the `loading-progress` indicator.
    fn set_busy(&mut self, busy: bool);
    fn set_text(&mut self, surface: Surface, text: &str);
    fn replace_rows(&mut self, surface: Surface, rows: Vec<Vec<String>>);
    /// Pushes pending writes to the output, if the implementation buffers.
    fn commit(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fixed-layout dashboard redrawn in full on every commit.
pub struct TerminalDashboard<W: Write + Send> {
    out: W,
    title: String,
    busy: bool,
    texts: HashMap<Surface, String>,
    tables: HashMap<Surface, Vec<Vec<String>>>,
    dirty: bool,
    last_updated: Option<SystemTime>,
}

impl TerminalDashboard<io::Stdout> {
    pub fn stdout(title: impl Into<String>) -> Self {
        Self::new(io::stdout(), title)
    }
}

impl<W: Write + Send> TerminalDashboard<W> {
    pub fn new(out: W, title: impl Into<String>) -> Self {
        Self {
            out,
            title: title.into(),
            busy: false,
            texts: HashMap::new(),
            tables: HashMap::new(),
            dirty: false,
            last_updated: None,
        }
    }

    fn text(&self, surface: Surface) -> &str {
        self.texts.get(&surface).map(String::as_str).unwrap_or("-")
    }

    /// Builds the whole screen as plain text.
    pub fn layout(&self) -> String {
        let mut screen = String::new();
        let status = if self.busy { "[loading...]" } else { "" };
        screen.push_str(&format!("sysboard  {}  {}\n\n", self.title, status));

        screen.push_str(&format!(
            "CPU       usage: {} %   cores: {}\n",
            self.text(Surface::CpuUsage),
            self.text(Surface::CpuCount)
        ));
        screen.push_str(&format!(
            "Memory    usage: {} %   used: {} / {} GB\n",
            self.text(Surface::MemoryUsage),
            self.text(Surface::MemoryUsed),
            self.text(Surface::MemoryTotal)
        ));
        screen.push_str(&format!(
            "Disk      usage: {} %   used: {} / {} GB\n",
            self.text(Surface::DiskUsage),
            self.text(Surface::DiskUsed),
            self.text(Surface::DiskTotal)
        ));
        screen.push_str(&format!(
            "Uptime    {} days\n",
            self.text(Surface::UptimeDays)
        ));
        screen.push_str(&format!(
            "Network   sent: {} MB   recv: {} MB\n",
            self.text(Surface::NetSent),
            self.text(Surface::NetRecv)
        ));

        for (heading, surface) in [
            ("Temperatures", Surface::Temps),
            ("Fans", Surface::Fans),
            ("Voltages", Surface::Voltages),
        ] {
            screen.push_str(&format!("\n{heading}\n"));
            screen.push_str(self.texts.get(&surface).map(String::as_str).unwrap_or(""));
        }

        screen.push_str(&format!("\n{:<8} {:<32} {:>6}\n", "PID", "NAME", "CPU%"));
        if let Some(rows) = self.tables.get(&Surface::Processes) {
            for row in rows {
                let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
                screen.push_str(&format!("{:<8} {:<32} {:>6}\n", cell(0), cell(1), cell(2)));
            }
        }

        if let Some(ts) = self.last_updated {
            screen.push_str(&format!(
                "\nlast updated: {}\n",
                humantime::format_rfc3339_seconds(ts)
            ));
        }
        screen
    }
}

impl<W: Write + Send> Dashboard for TerminalDashboard<W> {
    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn set_text(&mut self, surface: Surface, text: &str) {
        trace!(surface = surface.id(), len = text.len(), "set text");
        self.texts.insert(surface, text.to_string());
        self.dirty = true;
    }

    fn replace_rows(&mut self, surface: Surface, rows: Vec<Vec<String>>) {
        trace!(surface = surface.id(), rows = rows.len(), "replace rows");
        self.tables.insert(surface, rows);
        self.dirty = true;
    }

    fn commit(&mut self) -> io::Result<()> {
        if self.dirty {
            self.last_updated = Some(SystemTime::now());
            self.dirty = false;
        }
        let screen = self.layout();
        queue!(self.out, MoveTo(0, 0), Clear(ClearType::All))?;
        self.out.write_all(screen.as_bytes())?;
        self.out.flush()
    }
}

/// Records every write so tests can inspect what a poll produced.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryDashboard {
    pub busy: bool,
    pub busy_history: Vec<bool>,
    pub texts: HashMap<Surface, String>,
    pub tables: HashMap<Surface, Vec<Vec<String>>>,
    pub writes: usize,
    pub commits: usize,
}

#[cfg(test)]
impl MemoryDashboard {
    pub fn text(&self, surface: Surface) -> Option<&str> {
        self.texts.get(&surface).map(String::as_str)
    }

    pub fn rows(&self, surface: Surface) -> Option<&[Vec<String>]> {
        self.tables.get(&surface).map(Vec::as_slice)
    }
}

#[cfg(test)]
impl Dashboard for MemoryDashboard {
    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
        self.busy_history.push(busy);
    }

    fn set_text(&mut self, surface: Surface, text: &str) {
        self.texts.insert(surface, text.to_string());
        self.writes += 1;
    }

    fn replace_rows(&mut self, surface: Surface, rows: Vec<Vec<String>>) {
        self.tables.insert(surface, rows);
        self.writes += 1;
    }

    fn commit(&mut self) -> io::Result<()> {
        self.commits += 1;
        Ok(())
    }
}
