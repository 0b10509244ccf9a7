#![no_main]

use autodeploy::DeploymentId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(id) = raw.parse::<DeploymentId>() {
            assert_eq!(id.as_str(), raw);
            let name = id.resource_name(raw);
            assert!(name.len() <= 28);
        }
    }
});
