//! Message decoders for each protocol generation and device family
//!
//! Each decoder turns one inbound message into field updates on the
//! [`DeviceState`](crate::model::DeviceState).

mod charger;
mod receiver;
mod resource;

pub use charger::ChargerDecoder;
pub use receiver::ReceiverDecoder;
pub use resource::ResourceDecoder;

use crate::decoder::MessageDecoder;
use crate::model::{DeviceModel, Protocol};

/// Pick the decoder for a device model speaking a protocol generation
pub fn decoder_for(model: DeviceModel, protocol: Protocol) -> Box<dyn MessageDecoder> {
    match (protocol, model.is_charger()) {
        (Protocol::Scp2, _) => Box::new(ResourceDecoder),
        (Protocol::Scp1, true) => Box::new(ChargerDecoder),
        (Protocol::Scp1, false) => Box::new(ReceiverDecoder),
    }
}
