#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use groupxml::groupxml::{GroupXmlEngine, XmlTokenSource};
use groupxml::sink::MemorySink;

fuzz_target!(|data: &[u8]| {
    // Any input must either be ingested or rejected with an error, never panic
    let mut engine = GroupXmlEngine::new();
    let mut sink = MemorySink::new();
    let _ = engine.process(XmlTokenSource::new(Cursor::new(data)), &mut sink);

    // The engine must stay usable after whatever the previous input did
    let _ = engine.process(XmlTokenSource::new(Cursor::new(data)), &mut sink);
});
