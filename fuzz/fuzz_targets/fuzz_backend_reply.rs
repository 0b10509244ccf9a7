#![no_main]

use autodeploy::application::interpret::ingest_reply;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(reply) = std::str::from_utf8(data) {
        if let Ok(requirements) = ingest_reply(reply, "fuzzed description") {
            let scaling = requirements.scaling();
            assert!(scaling.min() >= 1 && scaling.max() >= scaling.min());
            if requirements.custom_domain().is_some() {
                assert!(requirements.ssl_required());
            }
        }
    }
});
