#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let _ = bcss_core::parse_line(&text);

    // Whole-program pass: output minus inserted lines must equal the input.
    let cfg = bcss_core::BcssConfig::default();
    if let Ok((out, stats)) = bcss_core::transform_bytes(data, &cfg) {
        assert!(out.len() >= data.len());
        if stats.changes.inserted_s_lines == 0 {
            assert_eq!(out, data);
        }
    }
});
