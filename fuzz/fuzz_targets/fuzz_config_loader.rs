#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    let parsed = toml::from_str::<bcss_config::Config>(data);
    match parsed {
        Ok(cfg) => {
            if cfg.validate().is_ok() {
                // Anything that validates must also map onto a usable model.
                let core: bcss_core::BcssConfig = (&cfg).into();
                let model = bcss_core::RpmModel::new(&core);
                let _ = model.compute_s_for_theta(model.quantize_theta(core.theta_ref_deg));
            }
        }
        Err(_e) => {
            // parse error is acceptable
        }
    }
});
