#![no_main]

use libfuzzer_sys::fuzz_target;

use bruker2mrd::parameters::ParameterFile;

fuzz_target!(|data: &[u8]| {
    // Parameter files are ASCII in practice; anything else must fail cleanly
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing may fail but must NEVER panic
    if let Ok(document) = ParameterFile::parse(text) {
        // Anything that parsed must render, and re-parsing the rendering must not panic
        let rendered = document.to_string();
        let _ = ParameterFile::parse(&rendered);
    }
});
