#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(xml) = std::str::from_utf8(data) {
        if let Ok(tree) = mzdb::param_tree::ParamTree::parse(xml) {
            let _ = tree.cv_param("MS:1000511");
            let _ = tree.user_param_value::<f64>("ms1_bb_mz_width");
        }
    }
});
