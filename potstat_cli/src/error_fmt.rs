//! Human-readable error descriptions and structured JSON error formatting.

use potstat_core::error::{InvariantError, ReduceError, SelectionError, StructureError};

fn selection_help(e: &SelectionError) -> String {
    format!(
        "What happened: The selection could not be understood ({e}).\nLikely causes: A typo in -c/-t/-d, a reversed range, or a negative bound.\nHow to fix: Pass a single bound like `-c 5` or an inclusive pair like `-c 2,5` (time in hours, e.g. `-t 0.5,12`)."
    )
}

fn structure_help(e: &StructureError) -> String {
    match e {
        StructureError::RestStep { .. } => format!(
            "What happened: {e}.\nLikely causes: The test protocol contains rest steps between charge and discharge.\nHow to fix: Rest cycles not supported; re-run the converter with rest steps removed."
        ),
        StructureError::NotZeroBased { .. } => format!(
            "What happened: {e}.\nLikely causes: The tables were already renumbered by an earlier run or were edited by hand.\nHow to fix: Reduce the original converter output instead of exported tables."
        ),
        StructureError::Empty => "What happened: The sample table has no rows.\nLikely causes: The converter wrote an empty file or the wrong file was configured.\nHow to fix: Check [source] in the config and the run directory contents.".to_string(),
        _ => format!(
            "What happened: The cycle tables are inconsistent ({e}).\nLikely causes: The run directory mixes tables of different runs, or a table was truncated.\nHow to fix: Re-run the converter on the raw instrument file and reduce the fresh output."
        ),
    }
}

fn invariant_help(e: &InvariantError) -> String {
    format!(
        "What happened: Internal consistency check failed ({e}).\nLikely causes: A bug in potstat; the input passed validation but broke a later assumption.\nHow to fix: Re-run with --log-level=debug and report the output together with the run directory."
    )
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(re) = err.downcast_ref::<ReduceError>() {
        return match re {
            ReduceError::Selection(e) => selection_help(e),
            ReduceError::Structure(e) => structure_help(e),
            ReduceError::Invariant(e) => invariant_help(e),
        };
    }
    if let Some(e) = err.downcast_ref::<SelectionError>() {
        return selection_help(e);
    }
    if let Some(e) = err.downcast_ref::<StructureError>() {
        return structure_help(e);
    }

    // String-based heuristics for errors coming from config or loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("missing required headers") {
        return format!(
            "What happened: A converter table lacks required columns.\nLikely causes: The file is not converter output, or [source] points at the wrong file.\nHow to fix: Check the header line of the file. Details: {msg}"
        );
    }

    if lower.contains("run directory") && lower.contains("does not exist") {
        return format!(
            "What happened: The run directory was not found.\nLikely causes: A typo in the path or the converter has not been run yet.\nHow to fix: Pass the directory holding the converter tables. Details: {msg}"
        );
    }

    if lower.contains("csv row") || (lower.contains("open ") && lower.contains("csv")) {
        return format!(
            "What happened: A converter table could not be read.\nLikely causes: A missing file or a non-numeric cell.\nHow to fix: Inspect the named file and line. Details: {msg}"
        );
    }

    if lower.contains("journal") {
        return format!(
            "What happened: The property journal could not be used.\nLikely causes: The journal file is corrupt or not writable.\nHow to fix: Fix or remove the file named in [journal] path, or pass --no-journal. Details: {msg}"
        );
    }

    if lower.contains("invalid configuration") || lower.contains("must be") {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: A negative or non-numeric electrode property, or an unknown option value.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

fn find_reduce_error(err: &eyre::Report) -> Option<ReduceError> {
    if let Some(re) = err.downcast_ref::<ReduceError>() {
        return Some(re.clone());
    }
    if let Some(e) = err.downcast_ref::<SelectionError>() {
        return Some(ReduceError::Selection(e.clone()));
    }
    err.downcast_ref::<StructureError>()
        .map(|e| ReduceError::Structure(e.clone()))
}

/// Stable exit codes: 2 input, 3 structure, 4 internal invariant, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match find_reduce_error(err) {
        Some(ReduceError::Selection(_)) => 2,
        Some(ReduceError::Structure(_)) => 3,
        Some(ReduceError::Invariant(_)) => 4,
        None => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = match find_reduce_error(err) {
        Some(ReduceError::Selection(_)) => "Selection",
        Some(ReduceError::Structure(_)) => "Structure",
        Some(ReduceError::Invariant(_)) => "Invariant",
        None => "Error",
    };
    json!({
        "reason": reason,
        "error": err.to_string(),
        "message": humanize(err),
        "exit_code": exit_code_for_error(err),
    })
    .to_string()
}
