use xshell::{cmd, Shell};

fn main() -> xshell::Result<()> {
    // When run locally, results may differ from actual CI runs triggered by
    // .github/workflows/ci.yml
    // - Official CI runs latest stable
    // - Local runs use whatever the default Rust is locally
    let sh = Shell::new()?;

    // See if any code needs to be formatted
    cmd!(sh, "cargo fmt --all -- --check")
        .run()
        .expect("Please run `cargo fmt --all` to format your code.");

    // See if clippy has any complaints.
    // - Type complexity must be ignored because systems take many resources
    cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings -A clippy::type_complexity")
        .run()
        .expect("Please fix `cargo clippy` errors.");

    // Check for errors with the default features
    cmd!(sh, "cargo check --workspace")
        .run()
        .expect("Please fix `cargo check` errors.");

    // Unit, integration and doc tests
    cmd!(sh, "cargo test --workspace")
        .run()
        .expect("Please fix failing tests.");

    // Make sure the benchmarks still build
    cmd!(sh, "cargo bench --no-run")
        .run()
        .expect("Please fix compile errors in the benchmarks.");

    Ok(())
}
