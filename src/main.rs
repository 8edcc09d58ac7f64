mod client;
mod config;
mod filter;
mod scene;

use crate::client::HaClient;
use crate::config::ConfigError;
use crate::scene::{ColorType, OutputOptions};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "scenegen",
    version,
    about = "Generate Home Assistant scene definitions from the current entity states"
)]
struct Cli {
    #[arg(short = 'u', long, help = "URL of the Home Assistant instance")]
    url: Option<String>,

    #[arg(
        short = 'k',
        long,
        help = "API key of the Home Assistant instance (sent as x-ha-access)"
    )]
    key: Option<String>,

    #[arg(
        short = 's',
        long,
        default_value = "My New Scene",
        help = "Name of the scene to generate"
    )]
    scenename: String,

    #[arg(
        short = 'm',
        long,
        value_name = "FILE",
        help = "Ini mapfile of device groups; enables filtering"
    )]
    mapfile: Option<PathBuf>,

    #[arg(
        short = 'e',
        long,
        value_name = "FILE",
        help = "Ini secrets file ([HA] api_key/ha_url) to keep credentials off the command line"
    )]
    secrets: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_name = "GROUP1,GROUP2",
        use_value_delimiter = true,
        value_delimiter = ',',
        help = "Device groups (as named in the mapfile) to include"
    )]
    filter: Option<Vec<String>>,

    #[arg(
        short = 'c',
        long,
        value_enum,
        default_value_t = ColorType::ColorTemp,
        help = "Color attribute to carry into the scene"
    )]
    colortype: ColorType,

    #[arg(
        short = 't',
        long,
        value_name = "TYPE1,TYPE2",
        use_value_delimiter = true,
        value_delimiter = ',',
        default_value = "light,switch",
        help = "Device types to include"
    )]
    types: Vec<String>,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.url.is_none() && cli.secrets.is_none() {
        return Err(ConfigError::MissingSource.into());
    }

    let devices = cli
        .mapfile
        .as_deref()
        .map(config::load_device_map)
        .transpose()?;

    let filters = cli.filter.unwrap_or_default();
    if !filters.is_empty() && devices.is_none() {
        return Err(ConfigError::FilterWithoutMapfile.into());
    }

    let effective = config::resolve(cli.url, cli.key, cli.secrets.as_deref())?;
    let ha = HaClient::new(&effective.url, effective.key.as_deref())?;
    let states = ha.get_states()?;

    let opts = OutputOptions {
        types: cli.types,
        color: cli.colortype,
    };

    // Accumulate the whole document before printing so a failing record
    // cannot leave a half-written scene on stdout.
    let mut document = format!("name: {}\nentities:\n", cli.scenename);
    for state in &states {
        let forwarded = filter::match_count(devices.as_ref(), &filters, &state.entity_id);
        if forwarded > 0 {
            let block = scene::format_entity(state, &opts)?;
            for _ in 0..forwarded {
                document.push_str(&block);
            }
        }
    }

    print!("{document}");
    Ok(())
}
