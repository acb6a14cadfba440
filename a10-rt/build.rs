use std::{env, fs, path::PathBuf};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Put the linker scripts somewhere the linker can find them
    fs::write(out_dir.join("core0.x"), &include_bytes!("core0.x")[..]).unwrap();
    fs::write(out_dir.join("core1.x"), &include_bytes!("core1.x")[..]).unwrap();
    fs::write(out_dir.join("exceptions.x"), &include_bytes!("exceptions.x")[..]).unwrap();
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=core0.x");
    println!("cargo:rerun-if-changed=core1.x");
    println!("cargo:rerun-if-changed=exceptions.x");
}
