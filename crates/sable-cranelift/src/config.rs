//! Build configuration.

use std::str::FromStr;

use cranelift_codegen::settings::{self, Configurable};
use derive_more::Display;
use target_lexicon::Triple;

use crate::errors::{CompilationError, CompilationResult};

/// Cranelift optimization level.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum OptLevel {
    #[default]
    #[display("none")]
    None,
    #[display("speed")]
    Speed,
    #[display("speed_and_size")]
    SpeedAndSize,
}

impl FromStr for OptLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(OptLevel::None),
            "speed" => Ok(OptLevel::Speed),
            "speed_and_size" => Ok(OptLevel::SpeedAndSize),
            other => Err(format!(
                "unknown optimization level `{other}` (expected none, speed or speed_and_size)"
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Target for artifact builds. `None` means the host.
    pub target: Option<Triple>,
    pub opt_level: OptLevel,
    /// Symbol of the synthesized program entry function.
    pub entry_symbol: String,
    /// Emit constant arithmetic as a single `iconst`.
    pub fold_constants: bool,
    /// Artifact builds also write a native object file next to the IR text.
    pub emit_object: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            target: None,
            opt_level: OptLevel::None,
            entry_symbol: "main".to_string(),
            fold_constants: true,
            emit_object: false,
        }
    }
}

impl BuildConfig {
    pub fn target_triple(&self) -> Triple {
        self.target.clone().unwrap_or_else(Triple::host)
    }

    /// Shared Cranelift flags for every executable kind.
    pub fn flags(&self) -> CompilationResult<settings::Flags> {
        let mut flag_builder = settings::builder();
        flag_builder
            .set("use_colocated_libcalls", "false")
            .map_err(CompilationError::other)?;
        flag_builder
            .set("is_pic", "false")
            .map_err(CompilationError::other)?;
        flag_builder
            .set("opt_level", &self.opt_level.to_string())
            .map_err(CompilationError::other)?;
        Ok(settings::Flags::new(flag_builder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opt_level_round_trips_through_setting_names() {
        for level in [OptLevel::None, OptLevel::Speed, OptLevel::SpeedAndSize] {
            assert_eq!(level.to_string().parse::<OptLevel>(), Ok(level));
        }
        assert!("fast".parse::<OptLevel>().is_err());
    }

    #[test]
    fn test_flags_carry_opt_level() {
        let config = BuildConfig {
            opt_level: OptLevel::Speed,
            ..BuildConfig::default()
        };
        let flags = config.flags().unwrap();
        assert_eq!(flags.opt_level(), settings::OptLevel::Speed);
        assert!(!flags.is_pic());
    }
}
