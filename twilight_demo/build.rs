//! Compile the demo's GLSL shaders to SPIR-V with glslc (Vulkan SDK)
//!
//! Output goes to `$OUT_DIR/shaders`, exported to the crate as
//! `TWILIGHT_SHADER_DIR`. Without glslc the build still succeeds and the demo
//! reports the missing .spv files at startup.

use std::path::{Path, PathBuf};
use std::process::Command;

const SHADERS: &[&str] = &["default.vert", "default.frag"];

fn main() {
    println!("cargo:rerun-if-changed=shaders/");

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap()).join("shaders");
    std::fs::create_dir_all(&out_dir).unwrap();
    println!("cargo:rustc-env=TWILIGHT_SHADER_DIR={}", out_dir.display());

    for shader in SHADERS {
        compile(Path::new("shaders").join(shader), out_dir.join(format!("{shader}.spv")));
    }
}

fn compile(source: PathBuf, output: PathBuf) {
    let result = Command::new("glslc")
        .args(["--target-env=vulkan1.3", "-o"])
        .arg(&output)
        .arg(&source)
        .output();

    match result {
        Ok(out) if out.status.success() => {}
        Ok(out) => panic!(
            "failed to compile shader {}:\n{}",
            source.display(),
            String::from_utf8_lossy(&out.stderr)
        ),
        Err(e) => println!("cargo:warning=glslc not available ({e}), {} not compiled", source.display()),
    }
}
