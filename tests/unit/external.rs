use super::*;

#[test]
fn expand_args_substitutes_every_placeholder() {
    let cmd = ExternalCommand::new(
        "gen",
        vec![
            "--prompt={prompt}".to_string(),
            "{out}".to_string(),
            "{prompt}/{prompt}".to_string(),
            "{unknown}".to_string(),
        ],
    );
    let args = cmd.expand_args(&[("prompt", "cat"), ("out", "/tmp/x.png")]);
    assert_eq!(args, ["--prompt=cat", "/tmp/x.png", "cat/cat", "{unknown}"]);
}

#[test]
fn tail_keeps_the_last_chars() {
    assert_eq!(tail("abcdef", 3), "def");
    assert_eq!(tail("abc", 10), "abc");
    assert_eq!(tail("ééé", 2), "éé");
}

#[test]
fn missing_program_is_an_error() {
    let cmd = ExternalCommand::new("comicraft-definitely-not-a-real-program", vec![]);
    assert!(cmd.run(&[], None).is_err());
}

#[cfg(unix)]
#[test]
fn captures_stdout_and_feeds_stdin() {
    let cmd = ExternalCommand::new("cat", vec![]);
    let out = cmd.run(&[], Some("1. Introduction: hi\n")).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1. Introduction: hi\n");
}

#[cfg(unix)]
#[test]
fn non_zero_exit_is_an_error() {
    let cmd = ExternalCommand::new(
        "sh",
        vec!["-c".to_string(), "echo nope >&2; exit 3".to_string()],
    );
    let err = cmd.run(&[], None).unwrap_err();
    assert!(format!("{err:#}").contains("nope"));
}

#[cfg(unix)]
#[test]
fn timeout_kills_the_child() {
    let cmd = ExternalCommand::new("sleep", vec!["5".to_string()])
        .with_timeout(Duration::from_millis(100));
    let started = Instant::now();
    let err = cmd.run(&[], None).unwrap_err();
    assert!(err.to_string().contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(4));
}
