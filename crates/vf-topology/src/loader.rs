//! JSON persistence of the event document.
//!
//! # Format
//!
//! ```json
//! {
//!   "capacity": 1000,
//!   "areas":         [{ "id": 1, "name": "Main Stage", "capacity": 500 }],
//!   "entrances":     [{ "id": 1, "name": "Main Entrance" }],
//!   "controlPoints": [{ "id": 1, "name": "Security Checkpoint 1" }],
//!   "routes":        [{ "id": 1, "entrance": 1, "controlPoint": 1, "area": 1 }]
//! }
//! ```
//!
//! Documents written by the admin screens are loosely typed: ids are
//! timestamps, route references are the string values of `<select>` inputs,
//! and capacities are whatever was typed.  Decoding therefore accepts:
//!
//! | Field                     | Accepted                          | Otherwise   |
//! |---------------------------|-----------------------------------|-------------|
//! | `id`                      | integer or numeric string         | error       |
//! | route references          | integer or numeric string         | `None`      |
//! | `capacity` (event / area) | non-negative number or its string | `None`      |
//! | any top-level list        | array (`null` or missing → empty) | error       |
//!
//! Saving always writes the canonical numeric form.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use vf_core::EntityKey;

use crate::{Area, ControlPoint, EntityKind, Entrance, Route, Topology, TopologyError, TopologyResult};

// ── Wire records ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct EventDocument {
    #[serde(default)]
    capacity:       Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    areas:          Vec<AreaRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    entrances:      Vec<NamedRecord>,
    #[serde(default, rename = "controlPoints", deserialize_with = "null_as_empty")]
    control_points: Vec<NamedRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    routes:         Vec<RouteRecord>,
}

#[derive(Deserialize)]
struct AreaRecord {
    id:       Value,
    #[serde(default)]
    name:     Value,
    #[serde(default)]
    capacity: Value,
}

#[derive(Deserialize)]
struct NamedRecord {
    id:   Value,
    #[serde(default)]
    name: Value,
}

#[derive(Deserialize)]
struct RouteRecord {
    id:            Value,
    #[serde(default)]
    entrance:      Value,
    #[serde(default, rename = "controlPoint")]
    control_point: Value,
    #[serde(default)]
    area:          Value,
}

#[derive(Serialize)]
struct EventDocumentOut<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    capacity:       Option<u64>,
    areas:          Vec<AreaOut<'a>>,
    entrances:      Vec<NamedOut<'a>>,
    #[serde(rename = "controlPoints")]
    control_points: Vec<NamedOut<'a>>,
    routes:         Vec<RouteOut>,
}

#[derive(Serialize)]
struct AreaOut<'a> {
    id:       u64,
    name:     &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    capacity: Option<u64>,
}

#[derive(Serialize)]
struct NamedOut<'a> {
    id:   u64,
    name: &'a str,
}

#[derive(Serialize)]
struct RouteOut {
    id:            u64,
    entrance:      Option<u64>,
    #[serde(rename = "controlPoint")]
    control_point: Option<u64>,
    area:          Option<u64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a topology from a JSON file.
pub fn load_topology_json(path: &Path) -> TopologyResult<Topology> {
    let file = std::fs::File::open(path)?;
    load_topology_reader(std::io::BufReader::new(file))
}

/// Like [`load_topology_json`] but accepts any `Read` source.
pub fn load_topology_reader<R: Read>(reader: R) -> TopologyResult<Topology> {
    let doc: EventDocument = serde_json::from_reader(reader)?;
    from_document(doc)
}

/// Parse a topology from an in-memory JSON string.
pub fn load_topology_str(json: &str) -> TopologyResult<Topology> {
    let doc: EventDocument = serde_json::from_str(json)?;
    from_document(doc)
}

/// Serialise `topology` as a pretty-printed JSON document.
pub fn topology_to_json(topology: &Topology) -> TopologyResult<String> {
    Ok(serde_json::to_string_pretty(&to_document(topology))?)
}

/// Write `topology` to `path`, replacing any existing file.
pub fn save_topology_json(path: &Path, topology: &Topology) -> TopologyResult<()> {
    std::fs::write(path, topology_to_json(topology)?)?;
    Ok(())
}

// ── Conversion ────────────────────────────────────────────────────────────────

fn from_document(doc: EventDocument) -> TopologyResult<Topology> {
    let areas = doc
        .areas
        .into_iter()
        .map(|r| {
            Ok(Area {
                key:      parse_key(&r.id, EntityKind::Area)?,
                name:     name_of(r.name),
                capacity: lenient_count(&r.capacity),
            })
        })
        .collect::<TopologyResult<_>>()?;

    let entrances = doc
        .entrances
        .into_iter()
        .map(|r| Ok(Entrance { key: parse_key(&r.id, EntityKind::Entrance)?, name: name_of(r.name) }))
        .collect::<TopologyResult<_>>()?;

    let control_points = doc
        .control_points
        .into_iter()
        .map(|r| {
            Ok(ControlPoint { key: parse_key(&r.id, EntityKind::ControlPoint)?, name: name_of(r.name) })
        })
        .collect::<TopologyResult<_>>()?;

    let routes = doc
        .routes
        .into_iter()
        .map(|r| {
            Ok(Route {
                key:           parse_key(&r.id, EntityKind::Route)?,
                entrance:      lenient_key(&r.entrance),
                control_point: lenient_key(&r.control_point),
                area:          lenient_key(&r.area),
            })
        })
        .collect::<TopologyResult<_>>()?;

    Ok(Topology {
        event_capacity: lenient_count(&doc.capacity),
        areas,
        entrances,
        control_points,
        routes,
    })
}

fn to_document(t: &Topology) -> EventDocumentOut<'_> {
    EventDocumentOut {
        capacity:       t.event_capacity,
        areas:          t
            .areas
            .iter()
            .map(|a| AreaOut { id: a.key.0, name: &a.name, capacity: a.capacity })
            .collect(),
        entrances:      t.entrances.iter().map(|e| NamedOut { id: e.key.0, name: &e.name }).collect(),
        control_points: t.control_points.iter().map(|c| NamedOut { id: c.key.0, name: &c.name }).collect(),
        routes:         t
            .routes
            .iter()
            .map(|r| RouteOut {
                id:            r.key.0,
                entrance:      r.entrance.map(|k| k.0),
                control_point: r.control_point.map(|k| k.0),
                area:          r.area.map(|k| k.0),
            })
            .collect(),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A list that may be written as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn parse_key(v: &Value, kind: EntityKind) -> TopologyResult<EntityKey> {
    lenient_key(v).ok_or_else(|| TopologyError::InvalidKey { kind, raw: v.to_string() })
}

/// Integer id from a JSON number or numeric string.
fn lenient_key(v: &Value) -> Option<EntityKey> {
    match v {
        Value::Number(n) => n.as_u64().map(EntityKey),
        Value::String(s) => s.trim().parse::<u64>().ok().map(EntityKey),
        _ => None,
    }
}

/// Non-negative count from a number or numeric string; fractions truncate.
fn lenient_count(v: &Value) -> Option<u64> {
    let f = match v {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                return Some(u);
            }
            n.as_f64()?
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(u) = s.parse::<u64>() {
                return Some(u);
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    (f.is_finite() && f >= 0.0).then(|| f.trunc() as u64)
}

fn name_of(v: Value) -> String {
    match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
