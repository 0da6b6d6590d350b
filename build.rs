// build.rs
//
// Stamps the KeyMonS banner constants into OUT_DIR/build_info.rs, which
// main.rs include!s: build date, cargo profile and the target triple the
// preview runner was built for.

use chrono::Utc;
use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("build_info.rs");

    let build_date = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());

    fs::write(
        &dest_path,
        format!(
            "pub const BUILD_DATE: &str = {:?};\npub const BUILD_PROFILE: &str = {:?};\npub const BUILD_TARGET: &str = {:?};\n",
            build_date, profile, target
        ),
    ).unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}
