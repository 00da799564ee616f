// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::ffi::{CStr, CString};
use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of launches per strategy.
pub const DEFAULT_ITERATIONS: u32 = 10_000;
/// Default simulated resident-set size: 16 MiB.
pub const DEFAULT_RSS_SIZE: u32 = 16 * 1024 * 1024;
/// Trivial executable launched by every strategy.
pub const DEFAULT_TARGET: &str = "/bin/true";

/// Parse a command-line or profile value as an unsigned 32-bit integer.
///
/// Only plain decimal digits are accepted; signs, whitespace and values
/// above `u32::MAX` are rejected.
pub fn parse_u32(flag: &'static str, value: &str) -> Result<u32, ConfigError> {
    if value.starts_with('+') {
        return Err(ConfigError::InvalidNumber {
            flag,
            value: value.to_string(),
            reason: "sign prefix is not allowed".to_string(),
        });
    }
    value
        .parse::<u32>()
        .map_err(|e| ConfigError::InvalidNumber {
            flag,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Validated iteration count.
/// Must be greater than zero so the average is always defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct IterationCount(NonZeroU32);

impl IterationCount {
    /// Create a new IterationCount with validation.
    pub fn new(count: u32) -> Result<Self, ConfigError> {
        NonZeroU32::new(count)
            .map(Self)
            .ok_or(ConfigError::ZeroIterations)
    }

    /// Parse from a string argument supplied for `flag`.
    pub fn parse(flag: &'static str, value: &str) -> Result<Self, ConfigError> {
        Self::new(parse_u32(flag, value)?)
    }

    /// Get the inner count.
    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl Default for IterationCount {
    fn default() -> Self {
        Self(NonZeroU32::new(DEFAULT_ITERATIONS).unwrap_or(NonZeroU32::MIN))
    }
}

impl fmt::Display for IterationCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for IterationCount {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IterationCount> for u32 {
    fn from(count: IterationCount) -> Self {
        count.get()
    }
}

/// Simulated resident-set size in bytes.
/// Zero is accepted and means no working set is mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResidentSetSize(u32);

impl ResidentSetSize {
    pub fn new(bytes: u32) -> Self {
        Self(bytes)
    }

    /// Parse from a string argument supplied for `flag`.
    pub fn parse(flag: &'static str, value: &str) -> Result<Self, ConfigError> {
        parse_u32(flag, value).map(Self)
    }

    /// Create from mebibytes, failing if the result does not fit in 32 bits.
    pub fn from_mib(mib: u32) -> Result<Self, ConfigError> {
        mib.checked_mul(1024 * 1024)
            .map(Self)
            .ok_or_else(|| ConfigError::InvalidNumber {
                flag: "rss_size",
                value: format!("{}MiB", mib),
                reason: "number too large to fit in target type".to_string(),
            })
    }

    pub fn bytes(&self) -> u32 {
        self.0
    }

    pub fn mebibytes(&self) -> f64 {
        f64::from(self.0) / (1024.0 * 1024.0)
    }
}

impl Default for ResidentSetSize {
    fn default() -> Self {
        Self(DEFAULT_RSS_SIZE)
    }
}

impl fmt::Display for ResidentSetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}B", self.0)
    }
}

/// Executable launched by the strategies.
///
/// Holds the NUL-terminated strings the launch primitives need, built once
/// up front so that no allocation happens between duplicating the process
/// and replacing its image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProgram {
    path: PathBuf,
    c_path: CString,
    /// argv[0] handed to the image-replace call in the child branch.
    c_exec_arg0: CString,
}

impl TargetProgram {
    /// Create a new TargetProgram.
    ///
    /// The path is not checked for existence: the first launch is also the
    /// first validation.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        use std::os::unix::ffi::OsStrExt;

        let path = path.into();
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| ConfigError::InvalidTargetPath { path: path.clone() })?;

        Ok(Self {
            path,
            c_path,
            c_exec_arg0: CString::default(),
        })
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn c_path(&self) -> &CStr {
        &self.c_path
    }

    pub fn c_exec_arg0(&self) -> &CStr {
        &self.c_exec_arg0
    }
}

impl Default for TargetProgram {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_TARGET),
            c_path: CString::new(DEFAULT_TARGET).unwrap_or_default(),
            c_exec_arg0: CString::default(),
        }
    }
}

impl fmt::Display for TargetProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Process-creation strategy under measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Combined create-and-load primitive.
    PosixSpawn,
    /// Full copy-on-write duplicate, then image replace.
    ForkExec,
    /// Address-space-sharing duplicate, then image replace.
    VforkExec,
}

impl Strategy {
    /// All strategies, in the order they are always run.
    pub const ALL: [Strategy; 3] = [Strategy::PosixSpawn, Strategy::ForkExec, Strategy::VforkExec];

    /// Parse a command-line name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "posix_spawn" => Some(Strategy::PosixSpawn),
            "fork_exec" => Some(Strategy::ForkExec),
            "vfork_exec" => Some(Strategy::VforkExec),
            _ => None,
        }
    }

    /// Name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::PosixSpawn => "posix_spawn",
            Strategy::ForkExec => "fork_exec",
            Strategy::VforkExec => "vfork_exec",
        }
    }

    /// Title printed above the report block.
    pub fn title(&self) -> &'static str {
        match self {
            Strategy::PosixSpawn => "posix_spawn",
            Strategy::ForkExec => "fork",
            Strategy::VforkExec => "vfork",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Strategy::PosixSpawn => 0x1,
            Strategy::ForkExec => 0x2,
            Strategy::VforkExec => 0x4,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Set of strategies selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategySelection(u8);

impl StrategySelection {
    pub fn all() -> Self {
        Self(0x7)
    }

    pub fn none() -> Self {
        Self(0)
    }

    /// Selection for a single command-line name.
    ///
    /// An unrecognized name selects nothing; it is not an error.
    pub fn from_name(name: &str) -> Self {
        Strategy::from_name(name).map_or(Self::none(), Self::only)
    }

    /// Union of the selections for several names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .fold(Self::none(), |acc, name| Self(acc.0 | Self::from_name(name.as_ref()).0))
    }

    pub fn only(strategy: Strategy) -> Self {
        Self(strategy.bit())
    }

    pub fn contains(&self, strategy: Strategy) -> bool {
        self.0 & strategy.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Selected strategies in the fixed run order.
    pub fn iter(&self) -> impl Iterator<Item = Strategy> + '_ {
        Strategy::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl Default for StrategySelection {
    fn default() -> Self {
        Self::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u32_valid() {
        assert_eq!(parse_u32("-i", "0").unwrap(), 0);
        assert_eq!(parse_u32("-i", "10000").unwrap(), 10_000);
        assert_eq!(parse_u32("-r", "4294967295").unwrap(), u32::MAX);
    }

    #[test]
    fn test_parse_u32_invalid() {
        assert!(parse_u32("-i", "4294967296").is_err());
        assert!(parse_u32("-i", "abc").is_err());
        assert!(parse_u32("-i", "").is_err());
        assert!(parse_u32("-i", "-1").is_err());
        assert!(parse_u32("-i", "+5").is_err());
        assert!(parse_u32("-i", " 5").is_err());
    }

    #[test]
    fn test_iteration_count() {
        assert_eq!(IterationCount::default().get(), DEFAULT_ITERATIONS);
        assert_eq!(IterationCount::parse("-i", "5").unwrap().get(), 5);
        assert!(matches!(
            IterationCount::new(0),
            Err(ConfigError::ZeroIterations)
        ));
    }

    #[test]
    fn test_resident_set_size() {
        assert_eq!(ResidentSetSize::default().bytes(), 16 * 1024 * 1024);
        assert_eq!(ResidentSetSize::from_mib(50).unwrap().bytes(), 50 * 1024 * 1024);
        assert!(ResidentSetSize::from_mib(4096).is_err());
        assert_eq!(ResidentSetSize::parse("-r", "0").unwrap().bytes(), 0);
    }

    #[test]
    fn test_target_program() {
        let target = TargetProgram::default();
        assert_eq!(target.as_path(), Path::new("/bin/true"));
        assert_eq!(target.c_path().to_bytes(), b"/bin/true");
        assert!(target.c_exec_arg0().to_bytes().is_empty());

        assert!(TargetProgram::new("/usr/bin/true").is_ok());
        assert!(TargetProgram::new("/bin/\0true").is_err());
    }

    #[test]
    fn test_strategy_names() {
        for strategy in Strategy::ALL {
            assert_eq!(Strategy::from_name(strategy.name()), Some(strategy));
        }
        assert_eq!(Strategy::ForkExec.title(), "fork");
        assert_eq!(Strategy::VforkExec.title(), "vfork");
        assert_eq!(Strategy::from_name("fork"), None);
    }

    #[test]
    fn test_selection_order_is_fixed() {
        let selection = StrategySelection::from_names(["vfork_exec", "posix_spawn", "fork_exec"]);
        let order: Vec<_> = selection.iter().collect();
        assert_eq!(order, Strategy::ALL.to_vec());
        assert_eq!(StrategySelection::all(), selection);
    }

    #[test]
    fn test_selection_unknown_name_is_empty() {
        let selection = StrategySelection::from_name("clone3");
        assert!(selection.is_empty());
        assert_eq!(selection.iter().count(), 0);
    }

    #[test]
    fn test_selection_single() {
        let selection = StrategySelection::from_name("fork_exec");
        assert!(selection.contains(Strategy::ForkExec));
        assert!(!selection.contains(Strategy::PosixSpawn));
        assert!(!selection.contains(Strategy::VforkExec));
    }
}
