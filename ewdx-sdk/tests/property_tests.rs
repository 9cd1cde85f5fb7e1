//! Property-based tests for command encoding
//!
//! Whatever the host asks for, a generation-1 controller either sends a value
//! inside the device's accepted domain or refuses before touching the wire.

use std::sync::Arc;

use async_trait::async_trait;
use ewdx_sdk::{CommandSink, DeviceControl, DeviceModel, GainDirection, Scp1Receiver};
use ewdx_state::domain::{BRIGHTNESS_RANGE, FREQUENCY_RANGE_KHZ, GAIN_STEPS_DB};
use ewdx_state::DeviceStore;
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::Value;

#[derive(Default)]
struct Captured(Mutex<Vec<Value>>);

#[async_trait]
impl CommandSink for Captured {
    async fn send(&self, document: Value) -> ewdx_sdk::Result<()> {
        self.0.lock().push(document);
        Ok(())
    }
}

fn receiver(model: DeviceModel) -> (Scp1Receiver, Arc<Captured>) {
    let sink = Arc::new(Captured::default());
    let store = DeviceStore::new(model);
    (Scp1Receiver::new(sink.clone(), store.reader()), sink)
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn model_strategy() -> impl Strategy<Value = DeviceModel> {
    prop_oneof![
        Just(DeviceModel::Em2),
        Just(DeviceModel::Em2Dante),
        Just(DeviceModel::Em4),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn gain_always_lands_on_a_table_step(model in model_strategy(), channel in 0usize..6, db in -200i64..200) {
        let (control, sink) = receiver(model);
        let result = block_on(control.set_gain(channel, db));

        if channel < model.channel_count() {
            prop_assert!(result.is_ok());
            let sent = sink.0.lock().clone();
            prop_assert_eq!(sent.len(), 1);
            let gain = sent[0][format!("rx{}", channel + 1)]["gain"].as_i64().unwrap();
            prop_assert!(GAIN_STEPS_DB.iter().any(|step| i64::from(*step) == gain));
        } else {
            prop_assert!(result.is_err());
            prop_assert!(sink.0.lock().is_empty());
        }
    }

    #[test]
    fn gain_steps_saturate(steps in 0u32..40, up in proptest::bool::ANY) {
        let (control, sink) = receiver(DeviceModel::Em2);
        let direction = if up { GainDirection::Up } else { GainDirection::Down };
        block_on(control.adjust_gain(0, direction, steps)).unwrap();

        let gain = sink.0.lock()[0]["rx1"]["gain"].as_i64().unwrap();
        prop_assert!(gain >= i64::from(GAIN_STEPS_DB[0]));
        prop_assert!(gain <= i64::from(GAIN_STEPS_DB[GAIN_STEPS_DB.len() - 1]));
    }

    #[test]
    fn frequency_and_brightness_stay_in_range(khz in 0i64..3_000_000, level in -10i64..20) {
        let (control, sink) = receiver(DeviceModel::Em4);
        block_on(control.set_frequency(3, khz)).unwrap();
        block_on(control.set_brightness(level)).unwrap();

        let sent = sink.0.lock().clone();
        let frequency = sent[0]["rx4"]["frequency"].as_u64().unwrap();
        let brightness = sent[1]["device"]["brightness"].as_i64().unwrap();
        prop_assert!(FREQUENCY_RANGE_KHZ.contains(&(frequency as u32)));
        prop_assert!(BRIGHTNESS_RANGE.contains(&brightness));
    }

    #[test]
    fn channel_names_fit_the_display(name in "[A-Za-z0-9 ]{0,24}") {
        let (control, sink) = receiver(DeviceModel::Em2);
        block_on(control.set_channel_name(1, &name)).unwrap();

        let sent = sink.0.lock()[0]["rx2"]["name"].as_str().unwrap().to_string();
        prop_assert!(sent.chars().count() <= 8);
        prop_assert!(name.starts_with(&sent));
    }
}
