/// Executables a mux run needs on `PATH`.
pub const REQUIRED_TOOLS: &[&str] = &["java", "mkvmerge"];

/// Returns the required tools that cannot be found on `PATH`.
pub fn missing_dependencies() -> Vec<&'static str> {
    missing_with(REQUIRED_TOOLS, |tool| which::which(tool).is_ok())
}

fn missing_with(tools: &[&'static str], found: impl Fn(&str) -> bool) -> Vec<&'static str> {
    tools
        .iter()
        .copied()
        .filter(|tool| {
            let present = found(tool);
            if !present {
                log::warn!("'{}' was not found on PATH", tool);
            }
            !present
        })
        .collect()
}
