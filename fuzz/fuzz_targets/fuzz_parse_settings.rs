#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    if let Ok(mut settings) = acgctl::parse_settings(&s) {
        let _ =
            acgctl::validate_work_instruction(&mut settings.work_instruction, &settings.limits);
    }
});
