//! crates/logging/src/levels.rs
//! Flag enums and level structures for info and debug verbosity.

/// Info flags for diagnostic categories.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InfoFlag {
    /// Snapshot transfers (full, incremental, resumed).
    Send,
    /// Snapshot and dataset deletion.
    Del,
    /// Interrupted receive handling.
    Resume,
    /// Miscellaneous progress messages.
    Misc,
    /// End-of-run statistics.
    Stats,
    /// Lines relayed from the send/receive processes.
    Stream,
}

/// Debug flags for diagnostic categories.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DebugFlag {
    /// Command lines issued to the snapshot engine.
    Cmd,
    /// Capability probes and pool feature checks.
    Probe,
    /// Planner decisions.
    Plan,
    /// Retry coordinator transitions.
    Retry,
}

/// Info verbosity levels for each flag.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct InfoLevels {
    /// Transfer reporting level.
    pub send: u8,
    /// Deletion reporting level.
    pub del: u8,
    /// Resume handling level.
    pub resume: u8,
    /// Miscellaneous messages level.
    pub misc: u8,
    /// Statistics level.
    pub stats: u8,
    /// Relayed stream output level.
    pub stream: u8,
}

impl InfoLevels {
    /// Get the level for a specific flag.
    pub fn get(&self, flag: InfoFlag) -> u8 {
        match flag {
            InfoFlag::Send => self.send,
            InfoFlag::Del => self.del,
            InfoFlag::Resume => self.resume,
            InfoFlag::Misc => self.misc,
            InfoFlag::Stats => self.stats,
            InfoFlag::Stream => self.stream,
        }
    }

    /// Set the level for a specific flag.
    pub fn set(&mut self, flag: InfoFlag, level: u8) {
        match flag {
            InfoFlag::Send => self.send = level,
            InfoFlag::Del => self.del = level,
            InfoFlag::Resume => self.resume = level,
            InfoFlag::Misc => self.misc = level,
            InfoFlag::Stats => self.stats = level,
            InfoFlag::Stream => self.stream = level,
        }
    }

    /// Set all flags to the specified level.
    pub fn set_all(&mut self, level: u8) {
        self.send = level;
        self.del = level;
        self.resume = level;
        self.misc = level;
        self.stats = level;
        self.stream = level;
    }
}

/// Debug verbosity levels for each flag.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct DebugLevels {
    /// Command line tracing level.
    pub cmd: u8,
    /// Probe tracing level.
    pub probe: u8,
    /// Planner tracing level.
    pub plan: u8,
    /// Retry tracing level.
    pub retry: u8,
}

impl DebugLevels {
    /// Get the level for a specific flag.
    pub fn get(&self, flag: DebugFlag) -> u8 {
        match flag {
            DebugFlag::Cmd => self.cmd,
            DebugFlag::Probe => self.probe,
            DebugFlag::Plan => self.plan,
            DebugFlag::Retry => self.retry,
        }
    }

    /// Set the level for a specific flag.
    pub fn set(&mut self, flag: DebugFlag, level: u8) {
        match flag {
            DebugFlag::Cmd => self.cmd = level,
            DebugFlag::Probe => self.probe = level,
            DebugFlag::Plan => self.plan = level,
            DebugFlag::Retry => self.retry = level,
        }
    }

    /// Set all flags to the specified level.
    pub fn set_all(&mut self, level: u8) {
        self.cmd = level;
        self.probe = level;
        self.plan = level;
        self.retry = level;
    }
}
