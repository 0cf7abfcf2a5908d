use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const ROWS_PER_HALF: usize = 4;

// Converter output for `cycles` cycles: charge 10 As, discharge 9 As
fn write_run(root: &Path, cycles: usize, rest_at_half: Option<usize>) -> PathBuf {
    let dir = root.join("cell01");
    fs::create_dir_all(&dir).unwrap();

    let mut samples = String::from(
        "Data_Point,Full_Cycle,Step_Index,Test_Time,Step_Time,DateTime,Current,Voltage,Capacity,Energy,dQdV\n",
    );
    let mut half = String::from("Half_Cycle,Cycle_Start,Cycle_End,Step_Index\n");
    let mut full = String::from(
        "Full_Cycle,Cycle_Start,Cycle_End,Charge_Time,Discharge_Time,Charge_Capacity,Discharge_Capacity,Charge_Energy,Discharge_Energy,Charge_Voltage,Discharge_Voltage\n",
    );
    let mut row = 0usize;
    for c in 0..cycles {
        let cycle_start = row;
        for (leg, (step, q_end)) in [(1i32, 10.0f64), (-1, -9.0)].into_iter().enumerate() {
            let h = 2 * c + leg;
            let step = if rest_at_half == Some(h) { 0 } else { step };
            let start = row;
            for k in 0..ROWS_PER_HALF {
                let frac = (k + 1) as f64 / ROWS_PER_HALF as f64;
                writeln!(
                    samples,
                    "{},{},{},{},{},{},{},{},{},{},{}",
                    row + 1,
                    c,
                    step,
                    row * 100,
                    k * 100,
                    1_700_000_000 + row * 100,
                    0.025 * f64::from(step),
                    3.5 + 0.1 * frac * f64::from(step),
                    q_end * frac,
                    q_end * frac * 3.5,
                    1.0
                )
                .unwrap();
                row += 1;
            }
            writeln!(half, "{h},{start},{row},{step}").unwrap();
        }
        writeln!(full, "{c},{cycle_start},{row},400,400,10,-9,35,-31.5,3.5,3.4").unwrap();
    }
    fs::write(dir.join("samples.csv"), samples).unwrap();
    fs::write(dir.join("half_cycles.csv"), half).unwrap();
    fs::write(dir.join("full_cycles.csv"), full).unwrap();
    dir
}

fn write_config(root: &Path) -> PathBuf {
    let journal = root.join("journal.toml");
    let toml = format!(
        r#"
[working]
capacity_mah_g = 372

[export]
precision = 4

[journal]
path = "{}"
"#,
        journal.display().to_string().replace('\\', "/")
    );
    let path = root.join("potstat.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn potstat(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("potstat").unwrap();
    cmd.current_dir(root).env_remove("RUST_LOG");
    cmd.arg("--config").arg(write_config(root));
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["reduce", "cell01", "--mass", "2"], 0, "1250.000", "stdout")]
#[case(&["reduce", "cell01", "-c", "2,2", "--mass", "2"], 0, "half cell, 1 cycles", "stdout")]
#[case(&["reduce", "cell01", "-c", "1", "-t", "1"], 2, "cannot be used with", "stderr")]
#[case(&["reduce", "cell01", "-c", "5,2"], 2, "selection", "stderr")]
#[case(&["reduce", "cell01", "-d", "abc"], 2, "not a number", "stderr")]
#[case(&["reduce", "cell01", "--mass", "-1"], 2, "error", "stderr")]
#[case(&["reduce", "nowhere"], 1, "run directory", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 3, None);

    let mut cmd = potstat(dir.path());
    cmd.arg("--log-level").arg("warn");
    for a in args {
        cmd.arg(a);
    }
    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn rest_step_aborts_with_structural_exit_code() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 2, Some(2));

    potstat(dir.path())
        .args(["reduce", "cell01", "--no-journal"])
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Rest cycles not supported"));
}

#[rstest]
fn aborted_run_leaves_the_journal_untouched() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 2, Some(2));

    potstat(dir.path())
        .args(["reduce", "cell01", "--mass", "2"])
        .assert()
        .code(3);
    assert!(!dir.path().join("journal.toml").exists());
}

// Biologic runs keep the counter electrode potential in the aux channel
fn add_aux_column(run: &Path, value: f64) {
    let path = run.join("samples.csv");
    let text = fs::read_to_string(&path).unwrap();
    let mut out = String::new();
    for (i, line) in text.lines().enumerate() {
        if i == 0 {
            writeln!(out, "{line},Aux_Channel").unwrap();
        } else {
            writeln!(out, "{line},{value}").unwrap();
        }
    }
    fs::write(path, out).unwrap();
}

#[rstest]
#[case(&[], "half cell")]
#[case(&["-b"], "full cell")]
#[case(&["--biologic-ce"], "full cell")]
fn biologic_flag_reads_counter_potential_from_aux(#[case] extra: &[&str], #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let run = write_run(dir.path(), 2, None);
    add_aux_column(&run, 3.2);

    potstat(dir.path())
        .args(["reduce", "cell01", "--no-journal"])
        .args(extra)
        .assert()
        .success()
        .stdout(predicate::str::contains(needle));
}

#[rstest]
fn export_writes_tables_and_profiles() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 2, None);
    let out = dir.path().join("out");

    potstat(dir.path())
        .args(["reduce", "cell01", "--mass", "2", "-q", "--export"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let stats = fs::read_to_string(out.join("cell01_statistics.csv")).unwrap();
    let lines: Vec<&str> = stats.lines().collect();
    assert!(lines[0].starts_with("electrode,Mass,Capacity"));
    assert_eq!(lines[2], "WE,2.00,372.00,0.00,0.00,0.00");
    assert!(lines[3].starts_with("cycle_index,start,end,time(c),time(d),efficiency"));
    // 3 property lines + 2 header lines + 2 cycles
    assert_eq!(lines.len(), 3 + 2 + 2);
    assert!(lines[5].starts_with("1,0,8,400.0000,400.0000,90.0000,1388.8889,1250.0000"));

    let data = fs::read_to_string(out.join("cell01_data.csv")).unwrap();
    assert_eq!(data.lines().count(), 2 + 16);

    let profile = fs::read_to_string(out.join("cell01_002_discharge.txt")).unwrap();
    assert!(profile.starts_with("# cycle 2\n# discharge\n# mass 2.00 mg\n"));
    assert_eq!(profile.lines().filter(|l| !l.starts_with('#')).count(), 3);
    assert!(out.join("cell01_001_charge.txt").exists());
}

#[rstest]
fn journal_remembers_properties_between_runs() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 2, None);

    potstat(dir.path())
        .args(["reduce", "cell01", "--mass", "2", "-q"])
        .assert()
        .success();
    assert!(dir.path().join("journal.toml").exists());

    // no --mass this time: the journal supplies it
    potstat(dir.path())
        .args(["reduce", "cell01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1250.000"));

    potstat(dir.path())
        .args(["journal", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cell01").and(predicate::str::contains("working")));

    potstat(dir.path())
        .args(["journal", "delete", "--id", "1"])
        .assert()
        .success();
    potstat(dir.path())
        .args(["journal", "delete", "--id", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no journal entry with id 1"));
}

#[rstest]
fn json_mode_prints_one_object_per_cycle() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 3, None);

    let output = potstat(dir.path())
        .args(["--json", "reduce", "cell01", "--mass", "2", "--no-journal"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let cycles: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(cycles.len(), 3);
    assert_eq!(cycles[0]["cycle"], 1);
    let qd = cycles[0]["capacity_mah_g"]["discharge"].as_f64().unwrap();
    assert!((qd - 1250.0).abs() < 1e-6);
}

#[rstest]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 1, None);

    let output = potstat(dir.path())
        .args(["--json", "--log-level", "off", "reduce", "cell01", "-c", "3,1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    let last = stderr.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "Selection");
}
