//! # ssc-codec
//!
//! Message codec for the Sennheiser Sound Control protocol spoken by EW-DX
//! receivers and chargers. No I/O happens here; the crate only turns values
//! into wire documents and wire documents back into values.
//!
//! ## Generation 1 (UDP)
//!
//! ```rust
//! use serde_json::json;
//! use ssc_codec::{encode_str, to_wire};
//!
//! let doc = encode_str("/rx1/mute", json!(true)).unwrap();
//! assert_eq!(to_wire(&doc), br#"{"rx1":{"mute":true}}"#.to_vec());
//! ```
//!
//! ## Generation 2 (HTTPS + event stream)
//!
//! ```rust
//! use ssc_codec::resource::{ChannelResource, Resource};
//!
//! let routed = Resource::parse("/api/channel/1/warnings").unwrap();
//! assert_eq!(routed, Resource::Channel { index: 1, sub: ChannelResource::Warnings });
//! ```

pub mod error;
pub mod path;
pub mod resource;
pub mod sse;
pub mod subscribe;

pub use error::{CodecError, CodecResult};
pub use path::{decode_payload, decode_str, encode, encode_str, leaves, lookup, to_wire, CommandPath};
pub use resource::Resource;
pub use sse::{LeaseAnnouncement, SseDecoder, SseEvent};
pub use subscribe::{merge, subscribe_document, template, SubscriptionEntry};
