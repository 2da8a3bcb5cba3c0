#![no_main]

use libfuzzer_sys::fuzz_target;
use groupscope::{analysis::analyze_class, classfile::ClassUnit, AnalysisConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(class) = ClassUnit::parse(data) {
        let _ = analyze_class(&class, &AnalysisConfig::default());
    }
});
