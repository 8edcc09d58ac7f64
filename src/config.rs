// scenegen - generate Home Assistant scenes from live entity states
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Result, anyhow};
use ini::Ini;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Section of the secrets file holding the connection settings.
pub const SECRETS_SECTION: &str = "HA";

/// Operator-authored grouping of entity IDs: group name -> entries, where an
/// entity is in a group iff its `entity_id` is a key of that group. Keys are
/// lowercased on load, matching ini option semantics.
pub type DeviceMap = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("You must specify either a url or secrets file")]
    MissingSource,
    #[error("Must specify a mapfile if using filters")]
    FilterWithoutMapfile,
    #[error("secrets file has no [{SECRETS_SECTION}] section")]
    MissingSecretsSection,
    #[error("secrets file is missing `{0}` under [{SECRETS_SECTION}]")]
    MissingSecret(&'static str),
}

/// Final url/key pair the fetcher will use.
#[derive(Debug)]
pub struct EffectiveConfig {
    pub url: String,
    pub key: Option<String>,
}

/// Resolve the connection settings. A secrets file, when given, wins over
/// both command-line values; without one the url flag is required and the
/// key flag is passed through as-is.
pub fn resolve(
    url: Option<String>,
    key: Option<String>,
    secrets: Option<&Path>,
) -> Result<EffectiveConfig> {
    if let Some(path) = secrets {
        let ini = Ini::load_from_file(path)
            .map_err(|err| anyhow!("reading secrets file {}: {err}", path.display()))?;
        let section = ini
            .section(Some(SECRETS_SECTION))
            .ok_or(ConfigError::MissingSecretsSection)?;
        let key = section
            .get("api_key")
            .ok_or(ConfigError::MissingSecret("api_key"))?;
        let url = section
            .get("ha_url")
            .ok_or(ConfigError::MissingSecret("ha_url"))?;

        return Ok(EffectiveConfig {
            url: url.to_string(),
            key: Some(key.to_string()),
        });
    }

    let url = url.ok_or(ConfigError::MissingSource)?;
    Ok(EffectiveConfig { url, key })
}

/// Parse a mapfile into a [`DeviceMap`]. Any read or parse failure aborts
/// the run.
pub fn load_device_map(path: &Path) -> Result<DeviceMap> {
    let ini = Ini::load_from_file(path)
        .map_err(|err| anyhow!("reading mapfile {}: {err}", path.display()))?;

    let mut devices = DeviceMap::new();
    for (section, properties) in ini.iter() {
        // Keys outside any [section] have no group to belong to.
        let Some(name) = section else { continue };
        let group = devices.entry(name.to_string()).or_default();
        for (key, value) in properties.iter() {
            group.insert(key.to_ascii_lowercase(), value.to_string());
        }
    }

    Ok(devices)
}
