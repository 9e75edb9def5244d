// build.rs
// Compiles the GLSL sources in resources/shaders to SPIR-V with glslc
//
// A missing compiler only produces a warning; the viewer then reports the
// missing .spv files at startup.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

const SHADER_EXTENSIONS: [&str; 6] = ["vert", "frag", "comp", "geom", "tesc", "tese"];

fn warn(message: impl AsRef<str>) {
    println!("cargo:warning={}", message.as_ref());
}

/// glslc from the Vulkan SDK, or from PATH when the SDK is not set
fn find_glslc() -> Option<PathBuf> {
    println!("cargo:rerun-if-env-changed=VULKAN_SDK");

    if let Ok(sdk) = env::var("VULKAN_SDK") {
        let candidate = if cfg!(target_os = "windows") {
            Path::new(&sdk).join("Bin").join("glslc.exe")
        } else {
            Path::new(&sdk).join("bin").join("glslc")
        };
        if candidate.exists() {
            return Some(candidate);
        }
        warn(format!("glslc not found at {}", candidate.display()));
    }

    let on_path = PathBuf::from("glslc");
    match Command::new(&on_path).arg("--version").output() {
        Ok(output) if output.status.success() => Some(on_path),
        _ => None,
    }
}

fn is_up_to_date(source: &Path, output: &Path) -> bool {
    let modified = |path: &Path| std::fs::metadata(path).and_then(|m| m.modified()).ok();
    match (modified(source), modified(output)) {
        (Some(src), Some(dst)) => dst >= src,
        _ => false,
    }
}

fn main() {
    println!("cargo:rerun-if-changed=../../resources/shaders");
    println!("cargo:rerun-if-env-changed=SKIP_SHADERS");

    if env::var("SKIP_SHADERS").is_ok() {
        return;
    }

    let Some(glslc) = find_glslc() else {
        warn("glslc not found (set VULKAN_SDK or add glslc to PATH); shaders were not compiled");
        return;
    };

    let shader_dir = PathBuf::from("../../resources/shaders");
    let target_dir = PathBuf::from("../../target/shaders");

    if let Err(e) = std::fs::create_dir_all(&target_dir) {
        warn(format!("failed to create {}: {e}", target_dir.display()));
        return;
    }

    let entries = match std::fs::read_dir(&shader_dir) {
        Ok(entries) => entries,
        Err(_) => {
            warn(format!("no shader directory at {}", shader_dir.display()));
            return;
        }
    };

    let mut failures = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_shader = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SHADER_EXTENSIONS.contains(&ext));
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !is_shader {
            continue;
        }

        // default.vert -> default.vert.spv, so stages never collide
        let output = target_dir.join(format!("{file_name}.spv"));
        if is_up_to_date(&path, &output) {
            continue;
        }

        match Command::new(&glslc).arg(&path).arg("-o").arg(&output).status() {
            Ok(status) if status.success() => {}
            Ok(status) => {
                failures += 1;
                warn(format!("glslc failed for {file_name} (exit code {})", status.code().unwrap_or(-1)));
            }
            Err(e) => {
                failures += 1;
                warn(format!("failed to run glslc for {file_name}: {e}"));
            }
        }
    }

    if failures > 0 {
        warn(format!("{failures} shader(s) failed to compile"));
    }
}
