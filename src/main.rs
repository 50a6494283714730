// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use fixturedef::config::Settings;
use fixturedef::loader::Loader;
use fixturedef::model::{Axis, Channel, Fixture, Resolution};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Resolves lighting fixture definitions."
)]
struct Cli {
    /// The path to a settings file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// The fixture library to read from. Overrides the settings file.
    #[arg(short, long, global = true)]
    library: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the manufacturers of the library.
    Manufacturers {},
    /// Lists the fixtures of a manufacturer.
    Fixtures {
        /// The manufacturer key.
        manufacturer: String,
    },
    /// Prints every mode of a fixture with its resolved channel list.
    Modes {
        /// The fixture, in the form <MANUFACTURER>/<FIXTURE>.
        fixture: String,
    },
    /// Prints every channel of a fixture with the DMX ranges of its capabilities.
    Channels {
        /// The fixture, in the form <MANUFACTURER>/<FIXTURE>.
        fixture: String,
        /// The DMX resolution in bytes to print ranges at. Defaults to each channel's
        /// finest resolution.
        #[arg(short, long)]
        resolution: Option<Resolution>,
    },
    /// Prints the pixel keys and pixel groups of a fixture's matrix.
    Matrix {
        /// The fixture, in the form <MANUFACTURER>/<FIXTURE>.
        fixture: String,
        /// The axis order to list pixel keys in, slowest axis last.
        #[arg(short, long, default_value = "XYZ")]
        order: String,
    },
}

fn load(loader: &Loader, reference: &str) -> Result<Fixture, Box<dyn Error>> {
    let Some((manufacturer, fixture)) = reference.split_once('/') else {
        return Err(format!(
            "malformed fixture '{}', should be in the form <MANUFACTURER>/<FIXTURE>",
            reference
        )
        .into());
    };
    Ok(loader.load_fixture(manufacturer, fixture)?)
}

fn print_channels(fixture: &Fixture, resolution: Option<Resolution>) -> Result<(), Box<dyn Error>> {
    for channel in fixture.all_channels()? {
        println!("- {} ({})", channel.key(), channel.channel_type()?);
        if let Channel::Fine(fine) = channel {
            println!("    fine channel of {}", fine.coarse_channel().key());
            continue;
        }
        for capability in channel.capabilities()? {
            let range = match resolution {
                Some(resolution) => match capability.get_dmx_range_with_resolution(resolution) {
                    Ok(range) => range,
                    Err(e) => {
                        println!("    {}", e);
                        break;
                    }
                },
                None => capability.dmx_range(),
            };
            println!("    {}: {}", range, capability.name());
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(library) = cli.library {
        settings = settings.with_library(library);
    }
    let loader = Loader::new(&settings);

    match cli.command {
        Commands::Manufacturers {} => {
            let manufacturers = loader.load_manufacturers()?;
            if manufacturers.is_empty() {
                println!("No manufacturers found.");
                return Ok(());
            }

            println!("Manufacturers (count: {}):", manufacturers.len());
            for manufacturer in manufacturers {
                println!("- {} ({})", manufacturer.name(), manufacturer.key());
            }
        }
        Commands::Fixtures { manufacturer } => {
            let fixtures = loader.list_fixtures(&manufacturer)?;
            if fixtures.is_empty() {
                println!("No fixtures found for {}.", manufacturer);
                return Ok(());
            }

            println!("Fixtures (count: {}):", fixtures.len());
            for fixture in fixtures {
                println!("- {}/{}", manufacturer, fixture);
            }
        }
        Commands::Modes { fixture } => {
            let fixture = load(&loader, &fixture)?;
            for mode in fixture.modes()? {
                println!("{} ({} channels):", mode.name(), mode.channels().len());
                for (index, channel) in mode.channels().iter().enumerate() {
                    match channel {
                        Some(channel) => println!(
                            "{:>4}  {}  [{}]",
                            index + 1,
                            fixture
                                .unique_channel_name(channel.key())?
                                .unwrap_or(channel.key()),
                            channel.channel_type()?
                        ),
                        None => println!(
                            "{:>4}  unknown channel {}",
                            index + 1,
                            mode.channel_keys()[index].as_deref().unwrap_or("")
                        ),
                    }
                }
            }
        }
        Commands::Channels {
            fixture,
            resolution,
        } => {
            let fixture = load(&loader, &fixture)?;
            print_channels(&fixture, resolution)?;
        }
        Commands::Matrix { fixture, order } => {
            let fixture = load(&loader, &fixture)?;
            let Some(matrix) = fixture.matrix()? else {
                println!("{} has no matrix.", fixture.name());
                return Ok(());
            };

            let [a, b, c] = Axis::parse_order(&order)?;
            let [x, y, z] = matrix.pixel_count();
            println!("Pixels ({}x{}x{}):", x, y, z);
            for key in matrix.get_pixel_keys_by_order(a, b, c) {
                println!("- {}", key);
            }

            if !matrix.pixel_groups().is_empty() {
                println!("\nPixel groups:");
                for (name, keys) in matrix.pixel_groups() {
                    println!("- {}: {}", name, keys.join(", "));
                }
            }
        }
    }

    Ok(())
}
