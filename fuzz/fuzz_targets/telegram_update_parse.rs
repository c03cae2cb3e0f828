#![no_main]

use invitebot_telegram::parse_inbound_message;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(update) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Some(message) = parse_inbound_message(&update) {
        assert_eq!(
            update.get("update_id").and_then(serde_json::Value::as_i64),
            Some(message.update_id)
        );
        assert!(!message.requester_name.is_empty());
    }
});
