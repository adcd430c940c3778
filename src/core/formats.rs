/// Provider id is the part of the target id before the first dot (`ionq.simulator` -> `ionq`).
pub fn provider_of(target_id: &str) -> &str {
    target_id.split('.').next().unwrap_or(target_id)
}

/// 各 provider 預設的輸入/輸出格式
pub fn default_formats(target_id: &str) -> Option<(&'static str, &'static str)> {
    if target_id.eq_ignore_ascii_case("microsoft.dft") {
        return Some(("microsoft.qc-schema.v1", "microsoft.dft-results.v1"));
    }

    match provider_of(target_id).to_ascii_lowercase().as_str() {
        "ionq" => Some(("ionq.circuit.v1", "ionq.quantum-results.v1")),
        "quantinuum" => Some(("honeywell.openqasm.v1", "honeywell.quantum-results.v1")),
        "rigetti" => Some(("rigetti.quil.v1", "rigetti.quil-results.v1")),
        "pasqal" => Some(("pasqal.pulser.v1", "pasqal.pulser-results.v1")),
        _ => None,
    }
}

pub fn content_type_for(input_format: &str) -> &'static str {
    let format = input_format.to_ascii_lowercase();
    if format.contains("qir") {
        "application/x-qir.v1"
    } else if format.contains("circuit")
        || format.contains("qc-schema")
        || format.contains("pulser")
        || format.contains("json")
    {
        "application/json"
    } else if format.contains("quil") || format.contains("qasm") {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}
