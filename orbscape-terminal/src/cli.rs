/// Command-line interface for the terminal host
use clap::Parser;

use crate::AppOptions;

#[derive(Parser, Debug, Clone)]
#[command(name = "orbscape-terminal")]
#[command(about = "Animated orb scene rendered in the terminal", long_about = None)]
pub struct Cli {
    /// Seed for shard rotations and star placement (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Target frames per second
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    /// Stop after rendering this many frames
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub frames: Option<u64>,
}

impl Cli {
    pub fn app_options(&self) -> AppOptions {
        AppOptions {
            target_fps: self.fps,
            max_frames: self.frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["orbscape-terminal"]).unwrap();
        assert_eq!(cli.seed, None);
        assert_eq!(cli.fps, 30);
        assert_eq!(cli.frames, None);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from(["orbscape-terminal", "--seed", "42", "--fps", "60", "--frames", "300"])
            .unwrap();
        let options = cli.app_options();
        assert_eq!(cli.seed, Some(42));
        assert_eq!(options.target_fps, 60);
        assert_eq!(options.max_frames, Some(300));
    }

    #[test]
    fn test_rejects_zero_fps() {
        assert!(Cli::try_parse_from(["orbscape-terminal", "--fps", "0"]).is_err());
    }

    #[test]
    fn test_rejects_zero_frames() {
        assert!(Cli::try_parse_from(["orbscape-terminal", "--frames", "0"]).is_err());
        let cli = Cli::try_parse_from(["orbscape-terminal", "--frames", "1"]).unwrap();
        assert_eq!(cli.app_options().max_frames, Some(1));
    }
}
