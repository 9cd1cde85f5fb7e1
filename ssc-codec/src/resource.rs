//! Generation-2 REST resource paths.
//!
//! Every state push on the subscription stream is keyed by the resource path
//! it belongs to (`/api/channel/0`, `/api/transmitters/1/battery`, ...).
//! [`Resource::parse`] routes such a key to a typed variant carrying the
//! zero-based channel index; [`Resource::path`] is its inverse and is used to
//! build request URLs and the subscription list.

use std::fmt;

use crate::error::{CodecError, CodecResult};

/// Event-stream endpoint that issues a new session lease.
pub const SUBSCRIPTIONS_ENDPOINT: &str = "/api/ssc/state/subscriptions";

/// Path of a session lease (PUT replaces the list, GET reads it, DELETE releases it).
pub fn lease_path(session_uuid: &str) -> String {
    format!("{}/{}", SUBSCRIPTIONS_ENDPOINT, session_uuid)
}

/// Path that appends resources to a lease.
pub fn lease_add_path(session_uuid: &str) -> String {
    format!("{}/{}/add", SUBSCRIPTIONS_ENDPOINT, session_uuid)
}

/// Path that removes resources from a lease.
pub fn lease_remove_path(session_uuid: &str) -> String {
    format!("{}/{}/remove", SUBSCRIPTIONS_ENDPOINT, session_uuid)
}

/// Sub-resources below `/api/channel/{i}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelResource {
    Main,
    Warnings,
    Identify,
    SignalQuality,
    SignalStrength,
    Diversity,
    Level,
    Restore,
    ChannelSorting,
}

/// Sub-resources below `/api/transmitters/{i}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransmitterResource {
    Main,
    Battery,
    Warnings,
}

/// Sub-resources below `/api/rf/channels/{i}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RfChannelResource {
    Main,
    Frequency,
    Preset,
}

/// Resources below `/api/device`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceResource {
    Site,
    Identity,
    Identification,
    State,
}

/// Device-wide RF resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RfResource {
    Root,
    Encryption,
    Transmission,
}

/// A routed generation-2 resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Channel { index: usize, sub: ChannelResource },
    Transmitter { index: usize, sub: TransmitterResource },
    RfChannel { index: usize, sub: RfChannelResource },
    SyncSettings { index: usize, ignore: bool },
    Device(DeviceResource),
    Rf(RfResource),
    FirmwareUpdateState,
    LegacyMode,
}

impl Resource {
    /// Route a resource path.
    ///
    /// Trailing slashes are tolerated; anything not listed in [`Resource`]
    /// is rejected with [`CodecError::UnroutablePath`].
    pub fn parse(path: &str) -> CodecResult<Self> {
        let unroutable = || CodecError::UnroutablePath(path.to_string());

        let rest = path
            .trim_end_matches('/')
            .strip_prefix("/api/")
            .ok_or_else(unroutable)?;
        let segments: Vec<&str> = rest.split('/').collect();

        let resource = match segments.as_slice() {
            ["channel", index, tail @ ..] => {
                let index = parse_index(index).ok_or_else(unroutable)?;
                let sub = match tail {
                    [] => ChannelResource::Main,
                    ["warnings"] => ChannelResource::Warnings,
                    ["identify"] => ChannelResource::Identify,
                    ["signalQualityIndicator"] => ChannelResource::SignalQuality,
                    ["signalStrengthIndicator"] => ChannelResource::SignalStrength,
                    ["diversityIndicator"] => ChannelResource::Diversity,
                    ["level"] => ChannelResource::Level,
                    ["restore"] => ChannelResource::Restore,
                    ["channelSorting"] => ChannelResource::ChannelSorting,
                    _ => return Err(unroutable()),
                };
                Resource::Channel { index, sub }
            }
            ["transmitters", index, tail @ ..] => {
                let index = parse_index(index).ok_or_else(unroutable)?;
                let sub = match tail {
                    [] => TransmitterResource::Main,
                    ["battery"] => TransmitterResource::Battery,
                    ["warnings"] => TransmitterResource::Warnings,
                    _ => return Err(unroutable()),
                };
                Resource::Transmitter { index, sub }
            }
            ["rf", "channels", index, tail @ ..] => {
                let index = parse_index(index).ok_or_else(unroutable)?;
                let sub = match tail {
                    [] => RfChannelResource::Main,
                    ["frequency"] => RfChannelResource::Frequency,
                    ["preset"] => RfChannelResource::Preset,
                    _ => return Err(unroutable()),
                };
                Resource::RfChannel { index, sub }
            }
            ["syncSettings", index] => Resource::SyncSettings {
                index: parse_index(index).ok_or_else(unroutable)?,
                ignore: false,
            },
            ["syncSettings", index, "ignore"] => Resource::SyncSettings {
                index: parse_index(index).ok_or_else(unroutable)?,
                ignore: true,
            },
            ["device", "site"] => Resource::Device(DeviceResource::Site),
            ["device", "identity"] => Resource::Device(DeviceResource::Identity),
            ["device", "identification"] => Resource::Device(DeviceResource::Identification),
            ["device", "state"] => Resource::Device(DeviceResource::State),
            ["rf"] => Resource::Rf(RfResource::Root),
            ["rf", "encryption"] => Resource::Rf(RfResource::Encryption),
            ["rf", "transmission"] => Resource::Rf(RfResource::Transmission),
            ["firmware", "update", "state"] => Resource::FirmwareUpdateState,
            ["ssc", "legacyMode"] => Resource::LegacyMode,
            _ => return Err(unroutable()),
        };

        Ok(resource)
    }

    /// The canonical path of this resource.
    pub fn path(&self) -> String {
        match self {
            Resource::Channel { index, sub } => {
                let tail = match sub {
                    ChannelResource::Main => "",
                    ChannelResource::Warnings => "/warnings",
                    ChannelResource::Identify => "/identify",
                    ChannelResource::SignalQuality => "/signalQualityIndicator",
                    ChannelResource::SignalStrength => "/signalStrengthIndicator",
                    ChannelResource::Diversity => "/diversityIndicator",
                    ChannelResource::Level => "/level",
                    ChannelResource::Restore => "/restore",
                    ChannelResource::ChannelSorting => "/channelSorting",
                };
                format!("/api/channel/{}{}", index, tail)
            }
            Resource::Transmitter { index, sub } => {
                let tail = match sub {
                    TransmitterResource::Main => "",
                    TransmitterResource::Battery => "/battery",
                    TransmitterResource::Warnings => "/warnings",
                };
                format!("/api/transmitters/{}{}", index, tail)
            }
            Resource::RfChannel { index, sub } => {
                let tail = match sub {
                    RfChannelResource::Main => "",
                    RfChannelResource::Frequency => "/frequency",
                    RfChannelResource::Preset => "/preset",
                };
                format!("/api/rf/channels/{}{}", index, tail)
            }
            Resource::SyncSettings { index, ignore } => {
                if *ignore {
                    format!("/api/syncSettings/{}/ignore", index)
                } else {
                    format!("/api/syncSettings/{}", index)
                }
            }
            Resource::Device(device) => match device {
                DeviceResource::Site => "/api/device/site",
                DeviceResource::Identity => "/api/device/identity",
                DeviceResource::Identification => "/api/device/identification",
                DeviceResource::State => "/api/device/state",
            }
            .to_string(),
            Resource::Rf(rf) => match rf {
                RfResource::Root => "/api/rf",
                RfResource::Encryption => "/api/rf/encryption",
                RfResource::Transmission => "/api/rf/transmission",
            }
            .to_string(),
            Resource::FirmwareUpdateState => "/api/firmware/update/state".to_string(),
            Resource::LegacyMode => "/api/ssc/legacyMode".to_string(),
        }
    }

    /// Zero-based channel index, for per-channel resources.
    pub fn channel_index(&self) -> Option<usize> {
        match self {
            Resource::Channel { index, .. }
            | Resource::Transmitter { index, .. }
            | Resource::RfChannel { index, .. }
            | Resource::SyncSettings { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Remove duplicate paths, keeping the first occurrence of each.
pub fn dedup_paths<I>(paths: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("/api/channel/0", Resource::Channel { index: 0, sub: ChannelResource::Main })]
    #[case("/api/channel/3/warnings", Resource::Channel { index: 3, sub: ChannelResource::Warnings })]
    #[case("/api/channel/1/signalQualityIndicator", Resource::Channel { index: 1, sub: ChannelResource::SignalQuality })]
    #[case("/api/transmitters/2/battery", Resource::Transmitter { index: 2, sub: TransmitterResource::Battery })]
    #[case("/api/rf/channels/1", Resource::RfChannel { index: 1, sub: RfChannelResource::Main })]
    #[case("/api/syncSettings/0/ignore", Resource::SyncSettings { index: 0, ignore: true })]
    #[case("/api/device/site/", Resource::Device(DeviceResource::Site))]
    #[case("/api/rf", Resource::Rf(RfResource::Root))]
    #[case("/api/rf/transmission", Resource::Rf(RfResource::Transmission))]
    #[case("/api/ssc/legacyMode", Resource::LegacyMode)]
    fn test_parse_routes(#[case] path: &str, #[case] expected: Resource) {
        assert_eq!(Resource::parse(path).unwrap(), expected);
    }

    #[rstest]
    #[case("/api/channel/x")]
    #[case("/api/channel/-1")]
    #[case("/api/channel/0/unknown")]
    #[case("/api/unknown")]
    #[case("channel/0")]
    #[case("/api/syncSettings/0/other")]
    fn test_parse_rejects(#[case] path: &str) {
        assert!(matches!(Resource::parse(path), Err(CodecError::UnroutablePath(_))));
    }

    #[test]
    fn test_rf_channel_not_confused_with_channel() {
        let routed = Resource::parse("/api/rf/channels/0").unwrap();
        assert!(matches!(routed, Resource::RfChannel { .. }));
        assert_eq!(routed.channel_index(), Some(0));
    }

    #[test]
    fn test_lease_paths() {
        assert_eq!(lease_path("abc"), "/api/ssc/state/subscriptions/abc");
        assert_eq!(lease_add_path("abc"), "/api/ssc/state/subscriptions/abc/add");
        assert_eq!(lease_remove_path("abc"), "/api/ssc/state/subscriptions/abc/remove");
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let paths = ["/api/rf", "/api/device/site", "/api/rf", "/api/rf/encryption"]
            .into_iter()
            .map(String::from);
        assert_eq!(
            dedup_paths(paths),
            vec!["/api/rf", "/api/device/site", "/api/rf/encryption"]
        );
    }

    fn resource_strategy() -> impl Strategy<Value = Resource> {
        let index = 0usize..8;
        prop_oneof![
            (index.clone(), prop::sample::select(vec![
                ChannelResource::Main,
                ChannelResource::Warnings,
                ChannelResource::Identify,
                ChannelResource::SignalQuality,
                ChannelResource::SignalStrength,
                ChannelResource::Diversity,
                ChannelResource::Level,
                ChannelResource::Restore,
                ChannelResource::ChannelSorting,
            ]))
                .prop_map(|(index, sub)| Resource::Channel { index, sub }),
            (index.clone(), prop::sample::select(vec![
                TransmitterResource::Main,
                TransmitterResource::Battery,
                TransmitterResource::Warnings,
            ]))
                .prop_map(|(index, sub)| Resource::Transmitter { index, sub }),
            (index.clone(), prop::sample::select(vec![
                RfChannelResource::Main,
                RfChannelResource::Frequency,
                RfChannelResource::Preset,
            ]))
                .prop_map(|(index, sub)| Resource::RfChannel { index, sub }),
            (index, any::<bool>()).prop_map(|(index, ignore)| Resource::SyncSettings { index, ignore }),
            Just(Resource::Device(DeviceResource::State)),
            Just(Resource::Rf(RfResource::Encryption)),
            Just(Resource::FirmwareUpdateState),
        ]
    }

    proptest! {
        #[test]
        fn prop_path_routes_back_to_itself(resource in resource_strategy()) {
            prop_assert_eq!(Resource::parse(&resource.path()).unwrap(), resource);
        }
    }
}
