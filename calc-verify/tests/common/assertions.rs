use std::process::Output;

pub fn assert_contains(haystack: &str, needle: &str) {
    assert!(
        haystack.contains(needle),
        "Expected to find '{needle}' in output, got: {haystack}"
    );
}

pub fn assert_exit_success(output: &Output) {
    assert!(
        output.status.success(),
        "Expected success, got {:?}\nstdout: {}\nstderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn assert_exit_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "Expected failure, got success\nstdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );
}
