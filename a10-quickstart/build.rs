use std::env;

fn main() {
    // each image has its own memory layout
    if env::var_os("CARGO_FEATURE_RT").is_some() {
        println!("cargo:rustc-link-arg-bin=core0=-Tcore0.x");
        println!("cargo:rustc-link-arg-bin=core1=-Tcore1.x");
    }

    println!("cargo:rerun-if-changed=build.rs");
}
