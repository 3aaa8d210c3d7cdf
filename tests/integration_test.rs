use dramatic::sim::{Journal, ManualClock, Tty};
use dramatic::{COOLDOWN, Drama, Line, Outputs, Pacing, Typist};
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use std::rc::Rc;
use std::time::Duration;

const BIN: &str = env!("CARGO_BIN_EXE_dramatic");

fn sim_outputs(journal: &Journal) -> (Rc<ManualClock>, Outputs) {
    let clock = Rc::new(ManualClock::new(journal));
    let outputs = Outputs::new(Tty::terminal("out", journal), Tty::terminal("err", journal))
        .with_pacing(Pacing::steady().with_clock(clock.clone()));
    (clock, outputs)
}

#[test]
fn test_scene_paces_each_character() {
    let journal = Journal::new();
    let (_, mut outputs) = sim_outputs(&journal);

    Drama::new()
        .run(&mut outputs, |out| out.stdout().write_str("Dramatic?\n"))
        .unwrap();

    assert_eq!(journal.written("out"), b"Dramatic?\n");
    assert_eq!(journal.trace(), ["out", "sleep"].repeat(10));
    assert_eq!(
        journal.sleeps(),
        vec![Duration::from_secs_f64(1.0 / 75.0); 10]
    );
}

#[test]
fn test_round_trip_restores_plain_behaviour() {
    let journal = Journal::new();
    let (_, mut outputs) = sim_outputs(&journal);

    outputs.stdout().write_str("before\n").unwrap();
    let before = journal.trace();
    journal.clear();

    Drama::new().run(&mut outputs, |out| out.stdout().write_str("during\n").unwrap());
    journal.clear();

    outputs.stdout().write_str("before\n").unwrap();
    assert_eq!(journal.trace(), before);
    assert_eq!(format!("{:?}", outputs.stdout()), "Plain(Tty(out))");
}

#[test]
fn test_ctrl_c_fast_forwards_then_recovers() {
    let journal = Journal::new();
    let (clock, mut outputs) = sim_outputs(&journal);
    let mut scene = Drama::new().enter(&mut outputs);

    clock.interrupt_on(5);
    scene.stdout().write_str("Dramatic?\n").unwrap();
    scene.stdout().write_str("Hello!\n").unwrap();
    assert_eq!(
        journal.trace(),
        [["out", "sleep"].repeat(5), vec!["out"; 5 + 7]].concat()
    );
    assert_eq!(journal.written("out"), b"Dramatic?\nHello!\n");

    journal.clear();
    clock.advance(COOLDOWN);
    scene.stdout().write_str("ok").unwrap();
    assert_eq!(journal.sleeps().len(), 2);
}

#[test]
fn test_natural_typing_never_faster_than_floor() {
    let journal = Journal::new();
    let clock = Rc::new(ManualClock::new(&journal));
    let mut outputs = Outputs::new(Tty::terminal("out", &journal), Tty::terminal("err", &journal))
        .with_pacing(Pacing::natural().with_clock(clock).with_model(|| Box::new(Typist::new())));

    let text = "fn main() {\n    println!(\"Hello, 2024!\");\n}\n";
    Drama::new()
        .run(&mut outputs, |out| out.stdout().write_str(text))
        .unwrap();

    let floor = Duration::from_secs_f64(0.7 / 75.0);
    let sleeps = journal.sleeps();
    assert_eq!(sleeps.len(), text.chars().count());
    assert!(sleeps.iter().all(|s| *s >= floor));
    assert_eq!(journal.written("out"), text.as_bytes());
}

#[test]
fn test_line_to_plain_target_is_not_paced() {
    let mut file = Vec::new();
    Line::of(["Hello,", "file!"]).write_to(&mut file).unwrap();
    assert_eq!(file, b"Hello, file!\n");
}

#[test]
fn test_cli_replays_file_without_delay_when_piped() {
    let path = std::env::temp_dir().join(format!("dramatic-test-{}.txt", std::process::id()));
    let content = "Dramatic?\n  indented, 3.14159\nünïcödé ☃\n";
    fs::write(&path, content).expect("Failed to write test file");

    let output = Command::new(BIN)
        .arg(&path)
        .output()
        .expect("Failed to execute dramatic");
    let _ = fs::remove_file(&path);

    assert!(
        output.status.success(),
        "dramatic failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), content);
}

#[test]
fn test_cli_replays_standard_input() {
    let mut child = Command::new(BIN)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to execute dramatic");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"from a pipe\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, b"from a pipe\n");
}

#[test]
fn test_cli_rejects_bad_speed() {
    let output = Command::new(BIN)
        .args(["--speed", "0"])
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute dramatic");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("speed"), "got: {stderr}");
}

#[test]
fn test_cli_missing_file() {
    let output = Command::new(BIN)
        .arg("/definitely/not/here.txt")
        .output()
        .expect("Failed to execute dramatic");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to open"), "got: {stderr}");
}
