//! List checks command implementation.

use cstyle_checks::registry;

/// Runs the list-checks command.
pub fn run() {
    println!("Available checks:\n");
    println!("{:<8} {:<24} Description", "Code", "Name");
    println!("{}", "-".repeat(80));

    for (code, name, description) in registry::catalog() {
        println!("{:<8} {:<24} {}", code, name.as_str(), description);
    }

    println!("\nUse the severity flags to pick checks, e.g.:");
    println!("  cstyle check --not-permitted goto,global_variable file.c");
    println!("  cstyle check --warning indenting,integer_ascii_code file.c");
    println!("  cstyle check --do-not-check multiple_malloc file.c");
}
