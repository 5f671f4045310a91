//! The document model for run streams
//!
//! A run is narrated by a strictly ordered stream of immutable records:
//! - [`RunStart`]: opens a run and carries its metadata
//! - [`Descriptor`]: declares an event stream within the run
//! - [`Resource`]: declares an externally stored asset within the run
//! - [`Event`] / [`BulkEvent`]: measurements, grouped under a descriptor
//! - [`Datum`] / [`BulkDatum`]: pointers into a resource
//! - [`RunStop`]: closes the run
//!
//! [`Document`] is the tagged union over all eight; [`DocumentKind`] is the
//! bare tag. Every kind except `start` carries a reference back to the run,
//! either directly (`run_start`) or through a descriptor/resource uid.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, RouterError};
use crate::uid::Uid;

/// The eight document kinds, in stream order for a typical run
///
/// The set is closed: routing logic matches exhaustively on it, so adding a
/// kind is a breaking change to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Opens a run; all later documents trace back to its uid
    Start,
    /// Declares an event stream; events reference it by uid
    Descriptor,
    /// Declares an external asset; datums reference it by uid
    Resource,
    /// One measurement row under a descriptor
    Event,
    /// A batch of events sharing one descriptor
    BulkEvent,
    /// One pointer into a resource
    Datum,
    /// A batch of datums sharing one resource
    BulkDatum,
    /// Closes a run; after it, the run is unknown to the router
    Stop,
}

impl DocumentKind {
    /// All document kinds (for iteration)
    pub const ALL: [DocumentKind; 8] = [
        DocumentKind::Start,
        DocumentKind::Descriptor,
        DocumentKind::Resource,
        DocumentKind::Event,
        DocumentKind::BulkEvent,
        DocumentKind::Datum,
        DocumentKind::BulkDatum,
        DocumentKind::Stop,
    ];

    /// Get all document kinds as a slice
    pub fn all() -> &'static [DocumentKind] {
        &Self::ALL
    }

    /// Wire name of the kind, as document sources spell it
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Start => "start",
            DocumentKind::Descriptor => "descriptor",
            DocumentKind::Resource => "resource",
            DocumentKind::Event => "event",
            DocumentKind::BulkEvent => "bulk_event",
            DocumentKind::Datum => "datum",
            DocumentKind::BulkDatum => "bulk_datum",
            DocumentKind::Stop => "stop",
        }
    }

    /// Parse from the wire name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(DocumentKind::Start),
            "descriptor" => Some(DocumentKind::Descriptor),
            "resource" => Some(DocumentKind::Resource),
            "event" => Some(DocumentKind::Event),
            "bulk_event" => Some(DocumentKind::BulkEvent),
            "datum" => Some(DocumentKind::Datum),
            "bulk_datum" => Some(DocumentKind::BulkDatum),
            "stop" => Some(DocumentKind::Stop),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opens a run.
///
/// The uid names the run everywhere else in the stream. Factories inspect
/// the remaining fields (plan name, detector list, anything in `extra`) to
/// decide whether the run interests them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStart {
    /// Run identifier; every later document of this run traces back to it
    pub uid: Uid,
    /// Epoch seconds when the run started
    #[serde(default)]
    pub time: f64,
    /// Name of the plan or procedure producing this run
    #[serde(default)]
    pub plan_name: String,
    /// Detectors participating in the run
    #[serde(default)]
    pub detectors: Vec<String>,
    /// Remaining source-supplied metadata, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunStart {
    /// Create a start document for the given run uid
    pub fn new(uid: impl Into<Uid>) -> Self {
        RunStart {
            uid: uid.into(),
            time: unix_time(),
            plan_name: String::new(),
            detectors: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Declares an event stream within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Descriptor identifier; events reference it
    pub uid: Uid,
    /// Uid of the owning run's start document
    pub run_start: Uid,
    /// Epoch seconds when the stream was declared
    #[serde(default)]
    pub time: f64,
    /// Stream name, e.g. "primary" or "baseline"
    #[serde(default)]
    pub name: String,
    /// Data-key declarations and other source metadata
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Descriptor {
    /// Create a descriptor for the given run
    pub fn new(uid: impl Into<Uid>, run_start: impl Into<Uid>) -> Self {
        Descriptor {
            uid: uid.into(),
            run_start: run_start.into(),
            time: unix_time(),
            name: String::new(),
            extra: Map::new(),
        }
    }
}

/// Declares an externally stored asset within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource identifier; datums reference it
    pub uid: Uid,
    /// Uid of the owning run's start document
    pub run_start: Uid,
    /// Format spec of the asset, e.g. "AD_HDF5"
    #[serde(default)]
    pub spec: String,
    /// Root path or prefix under which the asset lives
    #[serde(default)]
    pub root: String,
    /// Remaining source-supplied fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    /// Create a resource for the given run
    pub fn new(uid: impl Into<Uid>, run_start: impl Into<Uid>) -> Self {
        Resource {
            uid: uid.into(),
            run_start: run_start.into(),
            spec: String::new(),
            root: String::new(),
            extra: Map::new(),
        }
    }
}

/// One measurement row, grouped under a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier (not referenced by other documents)
    #[serde(default)]
    pub uid: Uid,
    /// Uid of the descriptor this event belongs to
    pub descriptor: Uid,
    /// Epoch seconds of the measurement
    #[serde(default)]
    pub time: f64,
    /// 1-based sequence number within the stream
    #[serde(default)]
    pub seq_num: u64,
    /// Field name → measured value
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Per-field timestamps and other source metadata
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Create an event under the given descriptor, with a fresh uid
    pub fn new(descriptor: impl Into<Uid>, seq_num: u64) -> Self {
        Event {
            uid: Uid::random(),
            descriptor: descriptor.into(),
            time: unix_time(),
            seq_num,
            data: Map::new(),
            extra: Map::new(),
        }
    }
}

/// A batch of events delivered as one document.
///
/// The batch-level `descriptor` is the routing key; each contained event
/// still carries its own descriptor reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkEvent {
    /// Uid of the descriptor the batch belongs to
    pub descriptor: Uid,
    /// The contained events, in stream order
    #[serde(default)]
    pub events: Vec<Event>,
    /// Remaining source-supplied fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BulkEvent {
    /// Create an empty batch under the given descriptor
    pub fn new(descriptor: impl Into<Uid>) -> Self {
        BulkEvent {
            descriptor: descriptor.into(),
            events: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// One pointer into a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datum {
    /// Datum identifier (not referenced by other documents)
    #[serde(default)]
    pub datum_id: Uid,
    /// Uid of the resource this datum points into
    pub resource: Uid,
    /// Arguments a retrieval handler needs to locate the slice
    #[serde(default)]
    pub datum_kwargs: Map<String, Value>,
    /// Remaining source-supplied fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Datum {
    /// Create a datum under the given resource, with a fresh datum_id
    pub fn new(resource: impl Into<Uid>) -> Self {
        Datum {
            datum_id: Uid::random(),
            resource: resource.into(),
            datum_kwargs: Map::new(),
            extra: Map::new(),
        }
    }
}

/// A batch of datums delivered as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkDatum {
    /// Uid of the resource the batch points into
    pub resource: Uid,
    /// The contained datums, in stream order
    #[serde(default)]
    pub datums: Vec<Datum>,
    /// Remaining source-supplied fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BulkDatum {
    /// Create an empty batch under the given resource
    pub fn new(resource: impl Into<Uid>) -> Self {
        BulkDatum {
            resource: resource.into(),
            datums: Vec::new(),
            extra: Map::new(),
        }
    }
}

/// Closes a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStop {
    /// Stop document identifier (not referenced by other documents)
    #[serde(default)]
    pub uid: Uid,
    /// Uid of the run being closed
    pub run_start: Uid,
    /// Epoch seconds when the run ended
    #[serde(default)]
    pub time: f64,
    /// How the run ended: "success", "abort", or "fail"
    #[serde(default)]
    pub exit_status: String,
    /// Remaining source-supplied fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunStop {
    /// Create a stop document for the given run, with a fresh uid
    pub fn new(run_start: impl Into<Uid>) -> Self {
        RunStop {
            uid: Uid::random(),
            run_start: run_start.into(),
            time: unix_time(),
            exit_status: String::from("success"),
            extra: Map::new(),
        }
    }
}

/// Tagged union over the eight document kinds.
///
/// The tag is authoritative: routing dispatches on it, never on field
/// sniffing. When serialized standalone, the tag rides in a `doc_type` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "doc_type", rename_all = "snake_case")]
pub enum Document {
    /// A run-start record
    Start(RunStart),
    /// An event-stream declaration
    Descriptor(Descriptor),
    /// An external-asset declaration
    Resource(Resource),
    /// A single event
    Event(Event),
    /// A batch of events
    BulkEvent(BulkEvent),
    /// A single datum
    Datum(Datum),
    /// A batch of datums
    BulkDatum(BulkDatum),
    /// A run-stop record
    Stop(RunStop),
}

impl Document {
    /// The kind tag of this document
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Start(_) => DocumentKind::Start,
            Document::Descriptor(_) => DocumentKind::Descriptor,
            Document::Resource(_) => DocumentKind::Resource,
            Document::Event(_) => DocumentKind::Event,
            Document::BulkEvent(_) => DocumentKind::BulkEvent,
            Document::Datum(_) => DocumentKind::Datum,
            Document::BulkDatum(_) => DocumentKind::BulkDatum,
            Document::Stop(_) => DocumentKind::Stop,
        }
    }

    /// The document's own identifier, where its kind has one
    ///
    /// Batch documents have no identity of their own; their contained
    /// events/datums do.
    pub fn uid(&self) -> Option<&Uid> {
        match self {
            Document::Start(d) => Some(&d.uid),
            Document::Descriptor(d) => Some(&d.uid),
            Document::Resource(d) => Some(&d.uid),
            Document::Event(d) => Some(&d.uid),
            Document::BulkEvent(_) => None,
            Document::Datum(d) => Some(&d.datum_id),
            Document::BulkDatum(_) => None,
            Document::Stop(d) => Some(&d.uid),
        }
    }

    /// Check the required-field contract for this document's kind.
    ///
    /// | kind       | required fields                  |
    /// |------------|----------------------------------|
    /// | start      | uid                              |
    /// | descriptor | uid, run_start                   |
    /// | resource   | uid, run_start                   |
    /// | event      | descriptor                       |
    /// | bulk_event | descriptor (per contained event) |
    /// | datum      | resource                         |
    /// | bulk_datum | resource (per contained datum)   |
    /// | stop       | run_start                        |
    ///
    /// "Required" means present and non-empty.
    ///
    /// ## Errors
    ///
    /// [`RouterError::MalformedDocument`] naming the kind and the first
    /// missing field.
    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        match self {
            Document::Start(d) => require(kind, "uid", &d.uid),
            Document::Descriptor(d) => {
                require(kind, "uid", &d.uid)?;
                require(kind, "run_start", &d.run_start)
            }
            Document::Resource(d) => {
                require(kind, "uid", &d.uid)?;
                require(kind, "run_start", &d.run_start)
            }
            Document::Event(d) => require(kind, "descriptor", &d.descriptor),
            Document::BulkEvent(d) => {
                require(kind, "descriptor", &d.descriptor)?;
                for event in &d.events {
                    require(kind, "descriptor", &event.descriptor)?;
                }
                Ok(())
            }
            Document::Datum(d) => require(kind, "resource", &d.resource),
            Document::BulkDatum(d) => {
                require(kind, "resource", &d.resource)?;
                for datum in &d.datums {
                    require(kind, "resource", &datum.resource)?;
                }
                Ok(())
            }
            Document::Stop(d) => require(kind, "run_start", &d.run_start),
        }
    }

    /// Decode a document of a known kind from untyped JSON.
    ///
    /// This is the ingestion boundary for sources that deliver
    /// `(name, json)` pairs. The decoded document is validated before it is
    /// returned, so a success here is a document `submit` will not reject.
    ///
    /// ## Errors
    ///
    /// [`RouterError::MalformedDocument`] if the JSON cannot decode into the
    /// kind's record shape or a required field is missing or empty.
    pub fn from_json(kind: DocumentKind, value: Value) -> Result<Document> {
        fn decode<T: serde::de::DeserializeOwned>(
            kind: DocumentKind,
            value: Value,
        ) -> Result<T> {
            serde_json::from_value(value).map_err(|e| RouterError::MalformedDocument {
                kind,
                reason: e.to_string(),
            })
        }

        let doc = match kind {
            DocumentKind::Start => Document::Start(decode(kind, value)?),
            DocumentKind::Descriptor => Document::Descriptor(decode(kind, value)?),
            DocumentKind::Resource => Document::Resource(decode(kind, value)?),
            DocumentKind::Event => Document::Event(decode(kind, value)?),
            DocumentKind::BulkEvent => Document::BulkEvent(decode(kind, value)?),
            DocumentKind::Datum => Document::Datum(decode(kind, value)?),
            DocumentKind::BulkDatum => Document::BulkDatum(decode(kind, value)?),
            DocumentKind::Stop => Document::Stop(decode(kind, value)?),
        };
        doc.validate()?;
        Ok(doc)
    }
}

fn require(kind: DocumentKind, field: &'static str, value: &Uid) -> Result<()> {
    if value.is_empty() {
        return Err(RouterError::missing_field(kind, field));
    }
    Ok(())
}

fn unix_time() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
