#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Config and journal parsing must reject garbage without panicking.
    if let Ok(cfg) = potstat_config::load_toml(data) {
        let _ = cfg.validate();
    }
    let _ = toml::from_str::<potstat_config::Journal>(data);
});
