#![no_main]

use libfuzzer_sys::fuzz_target;
use xml_object_stream_core::{AssemblerConfig, Event, Lifecycle, ObjectStream};

fuzz_target!(|data: &[u8]| {
    let Ok(stream) = ObjectStream::from_reader(data, AssemblerConfig::default()) else {
        return;
    };

    let mut closed = false;
    for event in stream {
        assert!(!closed, "event after close");
        if event == Event::Lifecycle(Lifecycle::Close) {
            closed = true;
        }
    }
    assert!(closed);
});
