//! CLI argument parsing for the dostavka-planner binary.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dostavka-planner", about = "Delivery route construction worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build optimized vehicle routes from a destinations CSV, print JSON
    Optimize {
        /// Destinations CSV (header: company,address,weight,delivery_date,manager)
        #[arg(long)]
        input: String,
    },
    /// Geocode a single address and print the coordinates
    Geocode {
        /// Address text
        address: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_optimize_command_parses() {
        let cli = Cli::parse_from(["dostavka-planner", "optimize", "--input", "dest.csv"]);
        assert!(matches!(cli.command, Command::Optimize { input } if input == "dest.csv"));
    }

    #[test]
    fn test_cli_geocode_command_parses() {
        let cli = Cli::parse_from(["dostavka-planner", "geocode", "Невский пр. 28"]);
        assert!(matches!(cli.command, Command::Geocode { address } if address == "Невский пр. 28"));
    }

    #[test]
    fn test_cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["dostavka-planner"]).is_err());
    }
}
