//! The parameter update payload handed to sinks.
//!
//! On the wire an update is one JSON object:
//!
//! ```json
//! {"version":3,"generation":17,"parameters":{"attack":0.1,"decay":null,...}}
//! ```
//!
//! `parameters` always lists every parameter in [`Param::ALL`] order.
//! Undefined values are `null`, never `0`.

use std::collections::BTreeMap;
use std::fmt;

use patchbay_core::{Param, ParamValue, Snapshot};
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

/// Dispatch sequence number. Strictly increasing per dispatcher.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SnapshotVersion(pub u64);

impl SnapshotVersion {
    /// The version after this one.
    pub fn next(self) -> Self {
        SnapshotVersion(self.0 + 1)
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One snapshot, tagged with its dispatch version and the graph generation
/// it was computed from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "WireUpdate")]
pub struct ParameterUpdate {
    /// Dispatch version.
    pub version: SnapshotVersion,
    /// Graph generation the snapshot reflects.
    pub generation: u64,
    /// The resolved parameters.
    pub snapshot: Snapshot,
}

impl ParameterUpdate {
    /// Tags a snapshot.
    pub fn new(version: SnapshotVersion, generation: u64, snapshot: Snapshot) -> Self {
        Self {
            version,
            generation,
            snapshot,
        }
    }

    /// Compact JSON, one line.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parses one JSON object.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

struct Parameters<'a>(&'a Snapshot);

impl Serialize for Parameters<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Param::COUNT))?;
        for (param, value) in self.0.iter() {
            map.serialize_entry(param.name(), &value.value())?;
        }
        map.end()
    }
}

impl Serialize for ParameterUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ParameterUpdate", 3)?;
        state.serialize_field("version", &self.version)?;
        state.serialize_field("generation", &self.generation)?;
        state.serialize_field("parameters", &Parameters(&self.snapshot))?;
        state.end()
    }
}

#[derive(Deserialize)]
struct WireUpdate {
    version: SnapshotVersion,
    generation: u64,
    parameters: BTreeMap<String, Option<f32>>,
}

impl TryFrom<WireUpdate> for ParameterUpdate {
    type Error = String;

    fn try_from(wire: WireUpdate) -> Result<Self, Self::Error> {
        let mut snapshot = Snapshot::undefined();
        for (name, value) in wire.parameters {
            let param =
                Param::from_name(&name).ok_or_else(|| format!("unknown parameter '{name}'"))?;
            snapshot.set(param, ParamValue::from(value));
        }
        Ok(Self::new(wire.version, wire.generation, snapshot))
    }
}
