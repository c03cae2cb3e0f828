#![no_main]

use invitebot_runtime::{parse_bot_command, parse_confirmation_answer, BotCommand, LinkLabel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);

    match parse_bot_command(&raw) {
        BotCommand::NewLink { label: Some(label) } => {
            assert!(!label.trim().is_empty());
            let parsed = LinkLabel::parse(&label).expect("inline label is non-empty");
            assert_eq!(parsed.as_str(), label.trim());
        }
        BotCommand::Text { text } => {
            assert!(!text.starts_with('/'));
            assert_eq!(text, text.trim());
        }
        BotCommand::Unknown { name } => {
            assert!(!name.contains('@'));
            assert!(!name.chars().any(char::is_whitespace));
        }
        _ => {}
    }

    if let Some(answer) = parse_confirmation_answer(&raw) {
        let normalized = raw.trim().to_lowercase();
        assert_eq!(answer, matches!(normalized.as_str(), "yes" | "y" | "confirm"));
    }
});
