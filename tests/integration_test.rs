use std::io::Write;

use assert_cmd::Command;
use predicates as pred;
use tempfile::NamedTempFile;

#[test]
fn end_to_end_outputs_expected_balances() {
    // member 1 walks an order through lock, partial fill, cancel and withdrawal
    // member 2 only has locked funds and overdraws them once
    let mut file = NamedTempFile::new().expect("create temp file");
    writeln!(
        file,
        "op, member, currency, amount\n\
    add, 1, usd, 100\n\
    lock, 1, usd, 30\n\
    unlock_and_sub, 1, usd, 10\n\
    unlock, 1, usd, 20\n\
    sub, 1, usd, 89.5\n\
    sub, 1, usd, 1\n\
    add, 1, usd, 0\n\
    transfer, 1, usd, 5\n\
    add_locked, 2, btc, 0.0000000000000001\n\
    unlock_and_sub, 2, btc, 1"
    )
    .unwrap();

    let exe = env!("CARGO_BIN_EXE_account_ledger");
    let mut cmd = Command::new(exe);
    cmd.arg(file.path()).env("RUST_LOG", "warn");

    cmd.assert()
        .success()
        .stdout(pred::str::contains("member,currency,balance,locked,amount"))
        .stdout(pred::str::contains("1,usd,0.5,0,0.5"))
        .stdout(pred::str::contains("2,btc,0,0.0000000000000001,0.0000000000000001"))
        .stderr(pred::str::contains("insufficient funds"))
        .stderr(pred::str::contains("invalid amount"))
        .stderr(pred::str::contains("Invalid funds operation: transfer"));
}

#[test]
fn missing_input_file_fails() {
    let exe = env!("CARGO_BIN_EXE_account_ledger");
    Command::new(exe)
        .arg("/nonexistent/commands.csv")
        .assert()
        .failure();
}

#[test]
fn invalid_lock_timeout_is_rejected() {
    let mut file = NamedTempFile::new().expect("create temp file");
    writeln!(file, "op,member,currency,amount\nadd,1,usd,1").unwrap();

    let exe = env!("CARGO_BIN_EXE_account_ledger");
    Command::new(exe)
        .arg(file.path())
        .env("LEDGER_LOCK_TIMEOUT_MS", "never")
        .assert()
        .failure()
        .stderr(pred::str::contains("LEDGER_LOCK_TIMEOUT_MS"));
}
