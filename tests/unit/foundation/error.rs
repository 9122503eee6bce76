use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        EmoteError::lex(3, "x")
            .to_string()
            .contains("lex error at byte 3:")
    );
    assert!(
        EmoteError::malformed("x")
            .to_string()
            .contains("malformed expression:")
    );
    assert!(
        EmoteError::codec("abc", "x")
            .to_string()
            .contains("codec error for 'abc':")
    );
    assert!(
        EmoteError::format("abc", "x")
            .to_string()
            .contains("format error for 'abc':")
    );
    assert!(
        EmoteError::animation("x")
            .to_string()
            .contains("invalid animation:")
    );
}

#[test]
fn root_cause_strips_step_wrappers() {
    let err = EmoteError::EmptyTimeSeries
        .at_step("a,b>over")
        .at_step("outer");
    assert!(err.to_string().contains("a,b>over"));
    assert!(matches!(err.root_cause(), EmoteError::EmptyTimeSeries));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = EmoteError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn io_keeps_key_and_source() {
    let err = EmoteError::io("artifacts/x", std::io::Error::other("disk full"));
    let msg = err.to_string();
    assert!(msg.contains("artifacts/x"));
    assert!(msg.contains("disk full"));
    assert!(std::error::Error::source(&err).is_some());
}
