//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use std::path::PathBuf;

use bevy::prelude::*;
use tour_engine::DEFAULT_SMOOTHING_TIME_CONSTANT;

/// Launch parameters for the viewer.
#[derive(Resource, Debug, Clone)]
pub struct LaunchParams {
    /// Tour to start as soon as the scene is ready.
    pub tour: Option<String>,
    /// JSON tour catalog to use instead of the built-in one.
    pub catalog: Option<PathBuf>,
    /// Camera smoothing time constant in seconds.
    pub smoothing: f32,
    /// Whether the terrain and water layer is shown.
    pub terrain: bool,
    /// Whether the switchyard layer is shown.
    pub switchyard: bool,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            tour: None,
            catalog: None,
            smoothing: DEFAULT_SMOOTHING_TIME_CONSTANT,
            terrain: true,
            switchyard: true,
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    /// Parse a smoothing time constant, rejecting negative and non-finite values.
    fn parse_smoothing(s: &str) -> Result<f32, String> {
        let value = s
            .parse::<f32>()
            .map_err(|e| format!("invalid smoothing time constant: {e}"))?;
        if !value.is_finite() || value < 0.0 {
            return Err(format!("smoothing time constant must be >= 0, got {value}"));
        }
        Ok(value)
    }

    #[derive(Parser)]
    #[command(about = "Guided camera tours of a nuclear power plant")]
    pub(super) struct CliArgs {
        /// Tour id to start immediately (e.g. reactor-core).
        #[arg(long)]
        pub(super) tour: Option<String>,

        /// Path to a JSON tour catalog replacing the built-in tours.
        #[arg(long)]
        pub(super) catalog: Option<PathBuf>,

        /// Camera smoothing time constant in seconds (0 snaps to the tour path).
        #[arg(
            long,
            default_value_t = DEFAULT_SMOOTHING_TIME_CONSTANT,
            value_parser = parse_smoothing
        )]
        pub(super) smoothing: f32,

        /// Hide the terrain and water.
        #[arg(long)]
        pub(super) no_terrain: bool,

        /// Hide the switchyard.
        #[arg(long)]
        pub(super) no_switchyard: bool,
    }

    impl From<CliArgs> for LaunchParams {
        fn from(args: CliArgs) -> Self {
            Self {
                tour: args.tour,
                catalog: args.catalog,
                smoothing: args.smoothing,
                terrain: !args.no_terrain,
                switchyard: !args.no_switchyard,
            }
        }
    }

    pub fn parse() -> LaunchParams {
        CliArgs::parse().into()
    }

}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
