pub fn app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Banner written at the top of generated step files.
pub fn generated_banner() -> String {
    format!(
        "// Generated by {} {}. Regenerated on every run; edits will be lost.",
        env!("CARGO_PKG_NAME"),
        app_version()
    )
}
