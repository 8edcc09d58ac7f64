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

//! Rendering of one entity state into a scene block.
//!
//! Output is literal indented text shaped like a YAML mapping; no YAML
//! emitter is involved.

use crate::client::StateRecord;
use anyhow::{Result, anyhow};
use clap::ValueEnum;
use serde_json::Value;

/// Numeric light attributes, emitted rounded and in this order.
const LIGHT_ATTRS: [&str; 4] = ["transition", "profile", "brightness", "flash"];

/// Which color attribute to carry into the scene. One enum feeds both the
/// CLI validator and the formatter so the two cannot drift.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ColorType {
    XyColor,
    RgbColor,
    ColorTemp,
    ColorName,
}

impl ColorType {
    pub fn attr_name(self) -> &'static str {
        match self {
            ColorType::XyColor => "xy_color",
            ColorType::RgbColor => "rgb_color",
            ColorType::ColorTemp => "color_temp",
            ColorType::ColorName => "color_name",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Device types to include, from `--types`.
    pub types: Vec<String>,
    pub color: ColorType,
}

impl OutputOptions {
    fn includes(&self, device_type: &str) -> bool {
        self.types.iter().any(|t| t == device_type)
    }
}

/// Render the scene block for one state record.
///
/// Returns an empty string for device types that are unrecognized or
/// excluded via `--types`. A missing `type.name` separator in the entity ID
/// and non-numeric values for the rounded light attributes are data errors.
pub fn format_entity(state: &StateRecord, opts: &OutputOptions) -> Result<String> {
    let (device_type, _name) = state.entity_id.split_once('.').ok_or_else(|| {
        anyhow!(
            "malformed entity_id (expected type.name): {}",
            state.entity_id
        )
    })?;

    let mut block = String::new();
    match device_type {
        "light" if opts.includes("light") => {
            block.push_str(&format!("  {}:\n", state.entity_id));
            block.push_str(&format!("    state: {}\n", state.state));
            for attr in LIGHT_ATTRS {
                if let Some(value) = state.attributes.get(attr) {
                    block.push_str(&format!("    {attr}: {}\n", rounded(attr, value)?));
                }
            }
            let color_attr = opts.color.attr_name();
            if let Some(value) = state.attributes.get(color_attr) {
                block.push_str(&format!("    {color_attr}: {}\n", display_value(value)));
            }
        }
        "switch" if opts.includes("switch") => {
            block.push_str(&format!("  {}:\n", state.entity_id));
            block.push_str(&format!("    state: {}\n", state.state));
        }
        _ => {}
    }

    Ok(block)
}

/// Round a numeric attribute to the nearest integer, half away from zero
/// (`f64::round`).
fn rounded(attr: &str, value: &Value) -> Result<i64> {
    let number = value
        .as_f64()
        .ok_or_else(|| anyhow!("light attribute `{attr}` is not numeric: {value}"))?;
    Ok(number.round() as i64)
}

/// Color values are passed through untouched: strings bare, everything else
/// in its JSON rendering.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
