#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xml_object_stream_core::{
    AssemblerConfig, Event, MismatchPolicy, SourceEvent, TreeAssembler,
};

#[derive(Debug, Arbitrary)]
struct Input {
    element_depth: u8,
    max_children: u8,
    emit: Vec<String>,
    halt: bool,
    events: Vec<SourceEvent>,
}

fuzz_target!(|input: Input| {
    let policy = if input.halt {
        MismatchPolicy::Halt
    } else {
        MismatchPolicy::Continue
    };
    let config = AssemblerConfig::new()
        .with_element_depth(usize::from(input.element_depth % 8))
        .with_max_children(usize::from(input.max_children))
        .with_emit_elements(input.emit)
        .with_mismatch_policy(policy);

    let Ok(mut assembler) = TreeAssembler::new(config) else {
        return;
    };

    let mut out = Vec::new();
    for event in input.events {
        assembler.process(event, &mut out);
        assert!(assembler.open_nodes() <= assembler.depth());
    }

    for event in &out {
        if let Event::Element(node) = event {
            assert!(node.path().ends_with(node.name()));
            assert!(node.text().is_none_or(|text| !text.is_empty()));
        }
    }
});
