use crate::catalog::FAILURE_SIGNATURES;
use crate::ir::{CapturedOutput, FailureLine};

/// Applies every failure signature to the full capture.
///
/// Lines come out in signature-table order, then match order within a
/// signature. Text matched by several signatures is reported once per
/// signature.
pub fn scan_failures(output: &CapturedOutput) -> Vec<FailureLine> {
    let text = output.as_str();
    let mut lines = Vec::new();
    for signature in FAILURE_SIGNATURES.iter() {
        for caps in signature.pattern.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                lines.push(FailureLine {
                    signature: signature.name.to_string(),
                    text: m.as_str().to_string(),
                });
            }
        }
    }
    lines
}
