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

use crate::config::DeviceMap;

/// How many times a record is forwarded to the formatter.
///
/// - no device map: once, unconditionally;
/// - explicit filters: once per requested group that exists and lists the
///   entity (a record in N requested groups is emitted N times);
/// - map without filters: once per group listing the entity. An entity in
///   several groups is emitted once per group; the duplication is part of
///   the contract and is deliberately not collapsed here.
pub fn match_count(devices: Option<&DeviceMap>, filters: &[String], entity_id: &str) -> usize {
    let Some(devices) = devices else {
        return 1;
    };

    if filters.is_empty() {
        devices
            .values()
            .filter(|group| group.contains_key(entity_id))
            .count()
    } else {
        filters
            .iter()
            .filter(|name| {
                devices
                    .get(name.as_str())
                    .is_some_and(|group| group.contains_key(entity_id))
            })
            .count()
    }
}
