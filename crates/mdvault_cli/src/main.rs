//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `mdvault_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("mdvault_core ping={}", mdvault_core::ping());
    println!("mdvault_core version={}", mdvault_core::core_version());
}
