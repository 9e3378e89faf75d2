//! Build script for tracedump-core
//!
//! This script checks system requirements before compilation:
//! - Minimum Rust version (Edition 2021 = Rust 1.56.0+, `let`-`else` needs 1.65.0)
//! - Target architecture (live tracing only reaches the low 4 GiB)
//!
//! ## Requirements
//!
//! - **Rust**: 1.65.0 or newer
//! - **Target**: 32-bit x86 for live tracing; other targets build for
//!   snapshot tracing and tests

fn main()
{
    if let Ok(rustc_version) = rustc_version::version() {
        let min_rust_version = rustc_version::Version::new(1, 65, 0);

        if rustc_version < min_rust_version {
            panic!(
                "tracedump-core requires Rust {} or newer, found {}",
                min_rust_version, rustc_version
            );
        }
    } else {
        // If we can't get version (e.g., in some build environments), just warn
        println!("cargo:warning=could not verify Rust version");
    }

    check_target_arch();
}

fn check_target_arch()
{
    // Build scripts run on the host, so read the target from cargo's environment.
    let arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    let os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    if os == "linux" && arch != "x86" {
        println!(
            "cargo:warning=tracedump-core live tracing targets 32-bit x86 processes; on {arch} only mappings below 4 GiB are reachable"
        );
    }
}
