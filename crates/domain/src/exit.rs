//! Process exit statuses understood by the orchestrator.
//!
//! The orchestrator reads an adapter's exit code to tell a voluntary stop
//! from a crash or a device problem.

/// Why an adapter process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Normal completion.
    Success,
    /// Unclassified failure (including bad startup input).
    Unknown,
    /// Clean shutdown requested through a termination signal.
    ManualIntervention,
    /// The device could not be reached.
    DeviceOffline,
    /// The device answered but is not what the adapter expects.
    DeviceMisconfigured,
}

impl ExitStatus {
    /// Numeric process exit code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Unknown => 1,
            Self::ManualIntervention => 2,
            Self::DeviceOffline => 44,
            Self::DeviceMisconfigured => 113,
        }
    }

    /// Map a numeric exit code back to a status.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::Unknown),
            2 => Some(Self::ManualIntervention),
            44 => Some(Self::DeviceOffline),
            113 => Some(Self::DeviceMisconfigured),
            _ => None,
        }
    }

    /// Short description shown by the orchestrator.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Success => "",
            Self::Unknown => "unknown",
            Self::ManualIntervention => "manual intervention",
            Self::DeviceOffline => "device offline",
            Self::DeviceMisconfigured => "device misconfigured",
        }
    }
}
