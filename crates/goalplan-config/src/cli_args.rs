use std::path::PathBuf;

/// Configuration overrides collected from the command line.
///
/// Every field is optional; `None` leaves the value to the environment,
/// config file, or defaults.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub phase_count: Option<usize>,
    pub strict_phase_count: Option<bool>,
    pub state_dir: Option<PathBuf>,
    pub verbose: Option<bool>,
}
