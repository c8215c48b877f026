// Build provenance shown by `limero version --extended`.
fn main() {
    for (var, exported) in [
        ("TARGET", "LIMERO_BUILD_TARGET"),
        ("PROFILE", "LIMERO_BUILD_PROFILE"),
    ] {
        let value = std::env::var(var).unwrap_or_else(|_| "unknown".to_string());
        println!("cargo:rustc-env={exported}={value}");
        println!("cargo:rerun-if-env-changed={var}");
    }
}
