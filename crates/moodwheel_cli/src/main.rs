//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `moodwheel_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use moodwheel_core::{display_label, taxonomy};

fn main() {
    println!("moodwheel_core ping={}", moodwheel_core::ping());
    println!("moodwheel_core version={}", moodwheel_core::core_version());

    let cores = taxonomy().cores();
    println!("moodwheel_core taxonomy_cores={}", cores.len());
    for core in cores {
        println!(
            "  {} secondaries={} color={}",
            display_label(core.id),
            core.secondaries.len(),
            core.inner_color
        );
    }
}
