#![no_main]

use libfuzzer_sys::fuzz_target;
use tickprof::report::{self, ReportOptions};
use tickprof::SessionState;

fuzz_target!(|data: &[u8]| {
    // Any decodable state document must render without panicking
    if let Ok(mut state) = serde_json::from_slice::<SessionState>(data) {
        let cycle = state.disable_tick.unwrap_or(state.enabled_tick);
        let options = ReportOptions {
            max_lines: 20,
            max_chars: Some(1000),
        };
        let table = report::table::render(Some(&mut state), cycle, &options);
        assert!(table.len() <= 1000);
        let _ = report::callgrind::render(Some(&state), cycle);
        let _ = report::json::render(Some(&state), cycle);
    }
});
