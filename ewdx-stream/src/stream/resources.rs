//! Resource list a stream session subscribes to

use ewdx_state::DeviceModel;
use ssc_codec::resource::{
    dedup_paths, ChannelResource, DeviceResource, RfChannelResource, RfResource,
    TransmitterResource,
};
use ssc_codec::Resource;

/// Every resource pushed for a receiver of the given model, deduplicated
pub fn subscription_resources(model: DeviceModel) -> Vec<String> {
    let mut resources = vec![
        Resource::Device(DeviceResource::Site),
        Resource::Device(DeviceResource::Identification),
        Resource::Device(DeviceResource::State),
        Resource::Device(DeviceResource::Identity),
        Resource::FirmwareUpdateState,
        Resource::Rf(RfResource::Root),
        Resource::Rf(RfResource::Encryption),
        Resource::Rf(RfResource::Transmission),
    ];

    for index in 0..model.channel_count() {
        resources.extend([
            Resource::Channel { index, sub: ChannelResource::Main },
            Resource::Channel { index, sub: ChannelResource::Warnings },
            Resource::Channel { index, sub: ChannelResource::Identify },
            Resource::RfChannel { index, sub: RfChannelResource::Main },
            Resource::SyncSettings { index, ignore: false },
            Resource::Transmitter { index, sub: TransmitterResource::Main },
            Resource::Transmitter { index, sub: TransmitterResource::Battery },
            Resource::Transmitter { index, sub: TransmitterResource::Warnings },
        ]);
    }

    resources.push(Resource::LegacyMode);
    dedup_paths(resources.iter().map(Resource::path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_channel_list() {
        let resources = subscription_resources(DeviceModel::Em2);
        assert_eq!(resources.len(), 8 + 2 * 8 + 1);
        assert_eq!(resources[0], "/api/device/site");
        assert_eq!(resources.iter().filter(|r| *r == "/api/rf").count(), 1);
        assert!(resources.contains(&"/api/transmitters/1/battery".to_string()));
        assert!(!resources.contains(&"/api/channel/2".to_string()));
        assert_eq!(resources.last().map(String::as_str), Some("/api/ssc/legacyMode"));
    }

    #[test]
    fn test_four_channel_list() {
        let resources = subscription_resources(DeviceModel::Em4);
        assert!(resources.contains(&"/api/syncSettings/3".to_string()));
        assert!(resources.contains(&"/api/rf/channels/3".to_string()));
    }
}
