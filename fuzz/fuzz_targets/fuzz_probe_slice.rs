#![no_main]

use jpeg_probe::ProbeOptions;
use jpeg_probe::probe::{try_probe_reader, try_probe_slice};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = ProbeOptions::default();
    let from_slice = try_probe_slice(data, &options).ok();
    let from_reader = try_probe_reader(data, &options).ok();
    assert_eq!(from_slice, from_reader);
});
